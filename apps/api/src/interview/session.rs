//! Interview session state: extracted artifacts plus a bounded turn history.

use std::collections::VecDeque;

use serde::Serialize;

use crate::interview::jd_analyzer::JobSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Speaker {
    Interviewer,
    Candidate,
}

/// One utterance by either party.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Per-session state. Created by `start`, mutated by `respond`/`transcribe`,
/// discarded on stop. Never persisted across sessions.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub resume_text: String,
    pub job_summary: JobSummary,
    turns: VecDeque<InterviewTurn>,
    max_turns: usize,
    pub active: bool,
}

impl SessionState {
    pub fn new(resume_text: String, job_summary: JobSummary, max_turns: usize) -> Self {
        Self {
            resume_text,
            job_summary,
            turns: VecDeque::with_capacity(max_turns),
            max_turns,
            active: true,
        }
    }

    /// Appends a turn, evicting the oldest when the ring is full.
    pub fn push_turn(&mut self, speaker: Speaker, text: String) {
        if self.max_turns == 0 {
            return;
        }
        if self.turns.len() == self.max_turns {
            self.turns.pop_front();
        }
        self.turns.push_back(InterviewTurn { speaker, text });
    }

    /// Turns in chronological order, oldest first.
    pub fn turns(&self) -> &VecDeque<InterviewTurn> {
        &self.turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(max_turns: usize) -> SessionState {
        SessionState::new("resume".to_string(), JobSummary::default(), max_turns)
    }

    #[test]
    fn test_new_session_is_active_and_empty() {
        let session = session(10);
        assert!(session.active);
        assert!(session.turns().is_empty());
    }

    #[test]
    fn test_turn_history_never_exceeds_capacity() {
        let mut session = session(10);
        // 6 respond cycles: 12 turns total.
        for i in 0..6 {
            session.push_turn(Speaker::Interviewer, format!("question {i}"));
            session.push_turn(Speaker::Candidate, format!("answer {i}"));
        }
        assert_eq!(session.turns().len(), 10);
    }

    #[test]
    fn test_oldest_turns_evicted_order_preserved() {
        let mut session = session(10);
        for i in 0..6 {
            session.push_turn(Speaker::Interviewer, format!("question {i}"));
            session.push_turn(Speaker::Candidate, format!("answer {i}"));
        }
        // The first cycle (question 0 / answer 0) fell off the front.
        assert_eq!(session.turns()[0].text, "question 1");
        assert_eq!(session.turns()[9].text, "answer 5");
    }

    #[test]
    fn test_zero_capacity_records_nothing() {
        let mut session = session(0);
        session.push_turn(Speaker::Interviewer, "question".to_string());
        assert!(session.turns().is_empty());
    }
}
