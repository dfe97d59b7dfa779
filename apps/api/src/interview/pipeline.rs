//! Interview Session Pipeline — the one orchestration path from uploaded
//! resume to conversational turns.
//!
//! Sequencing contract: `start` runs extractor → analyzer → introduction
//! generation; `respond` composes and generates an answer; `transcribe`
//! delegates to the speech adapter. Failure policy is asymmetric on purpose:
//! a generation failure during `start` falls back to a neutral introduction,
//! while the same failure during `respond` surfaces to the caller.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::jd_analyzer;
use crate::interview::prompts;
use crate::interview::resume;
use crate::interview::session::{SessionState, Speaker};
use crate::llm_client::TextGenerator;
use crate::speech::{SpeechCapture, TranscriptionResult};

/// Neutral introduction used when the generation service fails at session
/// start. Generation failure is non-fatal there by contract.
pub const FALLBACK_INTRODUCTION: &str = "Thank you for the opportunity to interview for this \
    role. I'm excited to discuss how my skills and experiences align with the position.";

/// Outcome of a successful `start`: the new session plus the introduction
/// already recorded as its first Candidate turn.
pub struct StartOutcome {
    pub session: SessionState,
    pub introduction: String,
}

pub struct InterviewPipeline {
    generator: Arc<dyn TextGenerator>,
    speech: SpeechCapture,
    max_turns: usize,
}

impl InterviewPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, speech: SpeechCapture, max_turns: usize) -> Self {
        Self {
            generator,
            speech,
            max_turns,
        }
    }

    /// Creates a new session from an uploaded resume and a job description.
    ///
    /// Both inputs must be present. Document errors surface before the
    /// analyzer or the generator run; a generator failure is swallowed and
    /// replaced by `FALLBACK_INTRODUCTION`.
    pub async fn start(
        &self,
        filename: &str,
        document: &[u8],
        job_description: &str,
    ) -> Result<StartOutcome, AppError> {
        if document.is_empty() || job_description.trim().is_empty() {
            return Err(AppError::MissingInput(
                "Both resume and job description are required.".to_string(),
            ));
        }

        let resume_text = resume::extract(filename, document)?;
        let job_summary = jd_analyzer::analyze(job_description);

        let prompt = prompts::compose_introduction_prompt(&resume_text, &job_summary);
        let introduction = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Introduction generation failed, using fallback: {e}");
                FALLBACK_INTRODUCTION.to_string()
            }
        };

        let mut session = SessionState::new(resume_text, job_summary, self.max_turns);
        session.push_turn(Speaker::Candidate, introduction.clone());
        info!(
            "Interview started: {} requirement line(s), {} keyword(s)",
            session.job_summary.requirements.len(),
            session.job_summary.keywords.len()
        );

        Ok(StartOutcome {
            session,
            introduction,
        })
    }

    /// Answers one interviewer question.
    ///
    /// A blank question never reaches the generator; a generator failure
    /// surfaces as `GenerationFailed` (no fallback here — contrast `start`).
    /// Success appends the Interviewer and Candidate turns.
    pub async fn respond(
        &self,
        session: &mut SessionState,
        question: &str,
    ) -> Result<String, AppError> {
        if question.trim().is_empty() {
            return Err(AppError::MissingInput("Question is required.".to_string()));
        }
        if !session.active {
            return Err(AppError::MissingInput(
                "No active interview session.".to_string(),
            ));
        }

        let prompt =
            prompts::compose_answer_prompt(&session.resume_text, &session.job_summary, question);
        let answer = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| AppError::GenerationFailed(e.to_string()))?;

        session.push_turn(Speaker::Interviewer, question.to_string());
        session.push_turn(Speaker::Candidate, answer.clone());

        Ok(answer)
    }

    /// Captures one spoken question. No pipeline-level retry; the caller
    /// decides whether to re-invoke. A successful capture is recorded as an
    /// Interviewer turn when a session is present.
    pub async fn transcribe(
        &self,
        session: Option<&mut SessionState>,
        device_index: Option<usize>,
    ) -> TranscriptionResult {
        let result = self.speech.capture(device_index).await;

        if let (Some(session), TranscriptionResult::Success { text }) = (session, &result) {
            session.push_turn(Speaker::Interviewer, text.clone());
        }

        result
    }

    /// Marks the session stopped; further `respond` calls are rejected.
    pub fn stop(&self, session: &mut SessionState) {
        session.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::interview::resume::minimal_pdf;
    use crate::llm_client::GenerationError;
    use crate::speech::recognizer::{Recognizer, RecognizerError};
    use crate::speech::{capture::Recording, ListenConfig};

    /// Call-counting generator double.
    struct StubGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubGenerator {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(GenerationError::EmptyContent)
            } else {
                Ok(format!("generated for {} chars", prompt.len()))
            }
        }
    }

    struct StubRecognizer;

    #[async_trait]
    impl Recognizer for StubRecognizer {
        async fn recognize(&self, _: &Recording) -> Result<Option<String>, RecognizerError> {
            Ok(None)
        }
    }

    fn pipeline(generator: Arc<StubGenerator>) -> InterviewPipeline {
        let speech = SpeechCapture::new(Arc::new(StubRecognizer), ListenConfig::default());
        InterviewPipeline::new(generator, speech, 10)
    }

    #[tokio::test]
    async fn test_start_requires_document_and_job_description() {
        let generator = StubGenerator::succeeding();
        let pipeline = pipeline(Arc::clone(&generator));

        let empty_doc = pipeline.start("resume.pdf", b"", "some description").await;
        assert!(matches!(empty_doc, Err(AppError::MissingInput(_))));

        let blank_jd = pipeline.start("resume.pdf", b"%PDF", "   ").await;
        assert!(matches!(blank_jd, Err(AppError::MissingInput(_))));

        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_start_rejects_non_pdf_before_generation() {
        let generator = StubGenerator::succeeding();
        let pipeline = pipeline(Arc::clone(&generator));

        let result = pipeline
            .start("resume.txt", b"plain text resume", "Requirement: Rust")
            .await;

        assert!(matches!(result, Err(AppError::UnsupportedFormat)));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_start_swallows_generation_failure_with_fallback() {
        let generator = StubGenerator::failing();
        let pipeline = pipeline(Arc::clone(&generator));

        let outcome = pipeline
            .start("resume.pdf", &minimal_pdf(), "Requirement: Rust")
            .await
            .unwrap();

        assert_eq!(outcome.introduction, FALLBACK_INTRODUCTION);
        assert_eq!(generator.call_count(), 1);
        assert!(outcome.session.active);
    }

    #[tokio::test]
    async fn test_start_records_introduction_as_candidate_turn() {
        let generator = StubGenerator::succeeding();
        let pipeline = pipeline(generator);

        let outcome = pipeline
            .start("resume.pdf", &minimal_pdf(), "Requirement: Rust")
            .await
            .unwrap();

        let turns = outcome.session.turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].speaker, Speaker::Candidate);
        assert_eq!(turns[0].text, outcome.introduction);
    }

    #[tokio::test]
    async fn test_respond_blank_question_never_calls_generator() {
        let generator = StubGenerator::succeeding();
        let pipeline = pipeline(Arc::clone(&generator));
        let mut session = SessionState::new("resume".to_string(), Default::default(), 10);

        let result = pipeline.respond(&mut session, "   ").await;

        assert!(matches!(result, Err(AppError::MissingInput(_))));
        assert_eq!(generator.call_count(), 0);
        assert!(session.turns().is_empty());
    }

    #[tokio::test]
    async fn test_respond_propagates_generation_failure() {
        let generator = StubGenerator::failing();
        let pipeline = pipeline(Arc::clone(&generator));
        let mut session = SessionState::new("resume".to_string(), Default::default(), 10);

        let result = pipeline.respond(&mut session, "Why this role?").await;

        assert!(matches!(result, Err(AppError::GenerationFailed(_))));
        assert_eq!(generator.call_count(), 1);
        // Failed cycles leave the turn history unchanged.
        assert!(session.turns().is_empty());
    }

    #[tokio::test]
    async fn test_respond_appends_interviewer_and_candidate_turns() {
        let generator = StubGenerator::succeeding();
        let pipeline = pipeline(generator);
        let mut session = SessionState::new("resume".to_string(), Default::default(), 10);

        let answer = pipeline.respond(&mut session, "Why this role?").await.unwrap();

        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::Interviewer);
        assert_eq!(turns[0].text, "Why this role?");
        assert_eq!(turns[1].speaker, Speaker::Candidate);
        assert_eq!(turns[1].text, answer);
    }

    #[tokio::test]
    async fn test_stopped_session_rejects_respond() {
        let generator = StubGenerator::succeeding();
        let pipeline = pipeline(Arc::clone(&generator));
        let mut session = SessionState::new("resume".to_string(), Default::default(), 10);

        pipeline.stop(&mut session);
        let result = pipeline.respond(&mut session, "Still there?").await;

        assert!(matches!(result, Err(AppError::MissingInput(_))));
        assert_eq!(generator.call_count(), 0);
    }
}
