//! Resume extraction — uploaded document bytes to plain text.

use crate::errors::AppError;

/// Extracts the full text of an uploaded resume.
///
/// The format gate is the file extension, not content sniffing; anything
/// that is not named `*.pdf` is rejected before the reader runs. On success
/// the extractor's page-ordered concatenation is returned verbatim, with no
/// separator normalization. Extraction works entirely on the in-memory
/// buffer, so no document handle outlives the call.
pub fn extract(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::UnsupportedFormat);
    }

    pdf_extract::extract_text_from_mem(bytes).map_err(|e| AppError::CorruptDocument(e.to_string()))
}

/// Builds a minimal single-page PDF with a correct xref table.
/// Shared fixture for extractor and pipeline tests.
#[cfg(test)]
pub(crate) fn minimal_pdf() -> Vec<u8> {
    let objects = [
        "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n",
        "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n",
        "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>\nendobj\n",
    ];

    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for body in objects {
        offsets.push(out.len());
        out.extend_from_slice(body.as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(b"xref\n0 4\n0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(b"trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{xref_at}\n").as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_pdf_extension_is_rejected() {
        let result = extract("resume.docx", b"not a pdf");
        assert!(matches!(result, Err(AppError::UnsupportedFormat)));
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        // Garbage bytes with a .PDF name must get past the format gate
        // and fail in the reader instead.
        let result = extract("resume.PDF", b"garbage");
        assert!(matches!(result, Err(AppError::CorruptDocument(_))));
    }

    #[test]
    fn test_garbage_bytes_surface_as_corrupt_document() {
        let result = extract("resume.pdf", &[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(result, Err(AppError::CorruptDocument(_))));
    }

    #[test]
    fn test_minimal_pdf_extracts() {
        let result = extract("resume.pdf", &minimal_pdf());
        assert!(result.is_ok());
    }
}
