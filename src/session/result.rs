use serde::{Deserialize, Serialize};

use crate::session::drill::TypingSession;

pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub elapsed_ms: u64,
    pub errors: usize,
    pub words: usize,
    pub chars: usize,
    pub cpm: u32,
    pub wpm: u32,
    /// Percentage rounded to one decimal.
    pub accuracy: f64,
}

impl SessionResult {
    pub fn from_session(session: &TypingSession) -> Self {
        Self::compute(
            session.lesson.len(),
            session.lesson.word_boundaries() + 1,
            session.typo_count(),
            session.elapsed_ms(),
        )
    }

    pub fn compute(chars: usize, words: usize, errors: usize, elapsed_ms: u64) -> Self {
        let elapsed_min = elapsed_ms as f64 / 60_000.0;
        let cpm = if elapsed_ms == 0 {
            0
        } else {
            (chars as f64 / elapsed_min).round() as u32
        };
        let wpm = (cpm as f64 / CHARS_PER_WORD).round() as u32;
        let accuracy = if chars == 0 {
            100.0
        } else {
            100.0 - (1000.0 * errors as f64 / chars as f64).round() / 10.0
        };

        Self {
            elapsed_ms,
            errors,
            words,
            chars,
            cpm,
            wpm,
            accuracy,
        }
    }
}
