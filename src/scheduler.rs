use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Show a fresh lesson at the current level.
    NextLesson,
    /// Rebuild the key set for a new level, then show a lesson.
    ApplyLevel,
}

/// Ties actions due at the same instant to the order they were scheduled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ScheduleToken(u64);

#[derive(Clone, Debug)]
struct Pending {
    token: ScheduleToken,
    due: Instant,
    action: Deferred,
}

/// One-shot delayed actions, polled from the event loop. Invalidating drops
/// every pending action so a manual change cannot race a stale follow-up.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    next_token: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: Deferred) {
        let token = ScheduleToken(self.next_token);
        self.next_token += 1;
        self.pending.push(Pending {
            token,
            due: now + delay,
            action,
        });
    }

    pub fn invalidate(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Remove and return the actions due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Deferred> {
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.due, p.token));
        due.into_iter().map(|p| p.action).collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }
}
