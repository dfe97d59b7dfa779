//! Input device enumeration.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use serde::Serialize;

/// One input-capable device, in host enumeration order.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
}

/// Lists input-capable devices. The index is positional within this listing
/// and is what `capture` accepts as `device_index`.
pub fn list_input_devices() -> Result<Vec<DeviceInfo>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .context("failed to enumerate input devices")?;

    Ok(devices
        .enumerate()
        .map(|(index, device)| DeviceInfo {
            index,
            name: device.name().unwrap_or_else(|_| "Unknown".to_string()),
        })
        .collect())
}
