//! JD Analyzer — extracts requirement and responsibility lines plus a keyword
//! set from a raw job description.
//!
//! Deliberately naive: substring matching per line and whitespace
//! tokenization, no stemming and no stop-word list. Golden-output tests
//! depend on this exact behavior — do not "improve" it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Structured summary of a job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    /// Verbatim (trimmed) lines containing "requirement", case-insensitive.
    pub requirements: Vec<String>,
    /// Verbatim (trimmed) lines containing "responsibility" but not "requirement".
    pub responsibilities: Vec<String>,
    /// Lower-cased tokens longer than 3 characters, deduplicated.
    /// Ordered set so downstream prompt rendering is deterministic.
    pub keywords: BTreeSet<String>,
}

/// Builds a `JobSummary` from raw job-description text.
/// Never fails: empty input yields an empty summary.
pub fn analyze(text: &str) -> JobSummary {
    let mut summary = JobSummary::default();

    for line in text.lines() {
        let lowered = line.to_lowercase();
        // A line matching both substrings is a requirement.
        if lowered.contains("requirement") {
            summary.requirements.push(line.trim().to_string());
        } else if lowered.contains("responsibility") {
            summary.responsibilities.push(line.trim().to_string());
        }
    }

    summary.keywords = extract_keywords(text);
    summary
}

/// Extracts matching keywords: whitespace tokens longer than 3 characters,
/// lower-cased, deduplicated.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .map(|word| word.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JD: &str =
        "Must have 5 years requirement: Python\nResponsibility: lead team\nOther line";

    #[test]
    fn test_requirement_and_responsibility_lines_classified_verbatim() {
        let summary = analyze(SAMPLE_JD);
        assert_eq!(
            summary.requirements,
            vec!["Must have 5 years requirement: Python"]
        );
        assert_eq!(summary.responsibilities, vec!["Responsibility: lead team"]);
    }

    #[test]
    fn test_unmatched_lines_appear_in_neither() {
        let summary = analyze(SAMPLE_JD);
        assert!(!summary.requirements.iter().any(|l| l == "Other line"));
        assert!(!summary.responsibilities.iter().any(|l| l == "Other line"));
    }

    #[test]
    fn test_requirement_takes_precedence_over_responsibility() {
        let summary = analyze("This requirement is also a responsibility");
        assert_eq!(summary.requirements.len(), 1);
        assert!(summary.responsibilities.is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive_but_lines_kept_verbatim() {
        let summary = analyze("  KEY REQUIREMENTS: Rust  ");
        assert_eq!(summary.requirements, vec!["KEY REQUIREMENTS: Rust"]);
    }

    #[test]
    fn test_empty_input_yields_empty_summary() {
        let summary = analyze("");
        assert!(summary.requirements.is_empty());
        assert!(summary.responsibilities.is_empty());
        assert!(summary.keywords.is_empty());
    }

    #[test]
    fn test_keywords_drop_short_tokens_and_lowercase() {
        let keywords = extract_keywords("We use Rust and Go in our API");
        assert!(keywords.contains("rust"));
        assert!(!keywords.contains("go"));
        assert!(!keywords.contains("api")); // 3 chars, not > 3
        assert!(!keywords.contains("and"));
    }

    #[test]
    fn test_keyword_extraction_is_idempotent_under_repetition() {
        let text = "Senior Rust engineer with distributed systems experience";
        let once = extract_keywords(text);
        let doubled = extract_keywords(&format!("{text} {text}"));
        assert_eq!(once, doubled);
    }
}
