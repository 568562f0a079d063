use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::streak::Transition;
use crate::session::result::SessionResult;

/// Everything the trainer reports to whoever renders it.
#[derive(Clone, Debug, PartialEq)]
pub enum TrainerEvent {
    LevelChanged {
        level: usize,
        streak: u32,
    },
    LessonReady {
        level: usize,
        chars: usize,
    },
    /// No dictionary entry fits the current letters; the lesson is empty.
    NoCandidates {
        level: usize,
    },
    KeyRejected {
        position: usize,
        expected: char,
        actual: char,
    },
    LessonFinished {
        result: SessionResult,
        passed: bool,
        streak: u32,
        transition: Transition,
    },
}

pub trait Notifier {
    fn notify(&mut self, event: &TrainerEvent);
}

impl Notifier for mpsc::Sender<TrainerEvent> {
    fn notify(&mut self, event: &TrainerEvent) {
        // a dropped receiver just means nobody is listening anymore
        let _ = self.send(event.clone());
    }
}

/// Reports events through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, event: &TrainerEvent) {
        match event {
            TrainerEvent::NoCandidates { level } => {
                tracing::warn!(level = *level, "no practice candidates for this level");
            }
            TrainerEvent::LessonFinished {
                result,
                passed,
                streak,
                ..
            } => {
                tracing::info!(
                    cpm = result.cpm,
                    wpm = result.wpm,
                    accuracy = result.accuracy,
                    passed = *passed,
                    streak = *streak,
                    "lesson finished"
                );
            }
            other => tracing::debug!(event = ?other, "trainer event"),
        }
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub enum HostEvent {
    /// A typed line and the moment Enter was pressed.
    Line(String, Instant),
    Tick,
    Eof,
}

/// Reads stdin on a background thread and interleaves lines with ticks.
pub struct EventHandler {
    rx: mpsc::Receiver<HostEvent>,
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let event = match line {
                    Ok(line) => HostEvent::Line(line, Instant::now()),
                    Err(_) => break,
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
            let _ = tx.send(HostEvent::Eof);
        });

        Self { rx, tick_rate }
    }

    pub fn next(&self) -> anyhow::Result<HostEvent> {
        match self.rx.recv_timeout(self.tick_rate) {
            Ok(event) => Ok(event),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(HostEvent::Tick),
            Err(e @ mpsc::RecvTimeoutError::Disconnected) => Err(e.into()),
        }
    }
}
