use std::collections::HashSet;
use std::time::Instant;

use crate::session::lesson::LessonText;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharMark {
    Pending,
    Correct,
    /// Typed correctly after at least one miss.
    Fixed,
    Error,
}

/// Typing progress through one lesson.
pub struct TypingSession {
    pub lesson: LessonText,
    pub marks: Vec<CharMark>,
    pub cursor: usize,
    pub pending_error: bool,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    /// Positions ever marked as errors. Never cleared by a later fix.
    pub typo_flags: HashSet<usize>,
}

impl TypingSession {
    pub fn new(lesson: LessonText) -> Self {
        Self {
            marks: vec![CharMark::Pending; lesson.len()],
            lesson,
            cursor: 0,
            pending_error: false,
            started_at: None,
            finished_at: None,
            typo_flags: HashSet::new(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.lesson.len()
    }

    pub fn elapsed_ms(&self) -> u64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start).as_millis() as u64,
            _ => 0,
        }
    }

    pub fn typo_count(&self) -> usize {
        self.typo_flags.len()
    }
}
