// Interview practice pipeline.
// Implements: resume extraction, JD analysis, prompt composition, session orchestration.
// All generation calls go through llm_client — no direct API calls here.

pub mod handlers;
pub mod jd_analyzer;
pub mod pipeline;
pub mod prompts;
pub mod resume;
pub mod session;
