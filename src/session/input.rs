use std::time::Instant;

use crate::session::drill::{CharMark, TypingSession};
use crate::session::result::SessionResult;

#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Nothing changed: a miss before the first correct key, or a finished session.
    Ignored,
    Accepted,
    Rejected,
    Completed(SessionResult),
}

pub fn process_key(session: &mut TypingSession, value: char, now: Instant) -> KeyOutcome {
    if session.is_complete() {
        return KeyOutcome::Ignored;
    }

    let expected = session.lesson.tokens()[session.cursor].expected();
    let is_match = value == expected;

    // misses before the first correct key don't count
    if !is_match && !session.is_started() {
        return KeyOutcome::Ignored;
    }

    if session.started_at.is_none() {
        session.started_at = Some(now);
    }

    if !is_match {
        session.marks[session.cursor] = CharMark::Error;
        session.typo_flags.insert(session.cursor);
        session.pending_error = true;
        return KeyOutcome::Rejected;
    }

    session.marks[session.cursor] = if session.pending_error {
        CharMark::Fixed
    } else {
        CharMark::Correct
    };
    session.pending_error = false;
    session.cursor += 1;

    if session.is_complete() {
        session.finished_at = Some(now);
        return KeyOutcome::Completed(SessionResult::from_session(session));
    }
    KeyOutcome::Accepted
}
