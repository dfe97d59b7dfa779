//! Prompt Composer — deterministic prompt templates for the interview stages.
//!
//! Pure string assembly, no I/O. Identical inputs must produce byte-identical
//! prompts so generation calls stay testable via snapshot comparison.

use crate::interview::jd_analyzer::JobSummary;

/// Introduction prompt template. Replace `{resume_text}` and
/// `{job_description}` before sending.
const INTRODUCTION_PROMPT_TEMPLATE: &str = r#"You are a job candidate preparing for an interview. Based on the following resume and job description, craft a professional and confident introduction for yourself as if you were speaking to the interviewer. Highlight your most relevant skills, experiences, and achievements that align with the job description.

Resume: {resume_text}
Job Description: {job_description}

Your introduction should:
1. Start with a greeting and a thank you.
2. Briefly mention your background and key skills.
3. Highlight 1-2 achievements or experiences that are most relevant to the job.
4. Conclude with enthusiasm for the role and the company.

Write the introduction in the first person (e.g., "I have experience in...")."#;

/// Answer prompt template. Kept short on purpose: only the data the model
/// needs for a single question.
const ANSWER_PROMPT_TEMPLATE: &str = r#"Respond to the following interview question in the first person, as the candidate:
Question: {question}
Skills: {resume_text}
Job: {job_description}"#;

/// Builds the session-opening introduction prompt.
pub fn compose_introduction_prompt(resume_text: &str, summary: &JobSummary) -> String {
    INTRODUCTION_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{job_description}", &render_job_summary(summary))
}

/// Builds the per-question answer prompt.
pub fn compose_answer_prompt(resume_text: &str, summary: &JobSummary, question: &str) -> String {
    ANSWER_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{resume_text}", resume_text)
        .replace("{job_description}", &render_job_summary(summary))
}

/// Renders a `JobSummary` into a stable text block. Keywords come from an
/// ordered set, so the rendering is deterministic by construction.
fn render_job_summary(summary: &JobSummary) -> String {
    let mut block = String::from("Requirements:\n");
    for line in &summary.requirements {
        block.push_str("- ");
        block.push_str(line);
        block.push('\n');
    }
    block.push_str("Responsibilities:\n");
    for line in &summary.responsibilities {
        block.push_str("- ");
        block.push_str(line);
        block.push('\n');
    }
    block.push_str("Keywords: ");
    let keywords: Vec<&str> = summary.keywords.iter().map(String::as_str).collect();
    block.push_str(&keywords.join(", "));
    block
}
