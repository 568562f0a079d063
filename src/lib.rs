//! Adaptive typing lessons: unlock keys in a fixed order, build lessons from
//! dictionary words that exercise the newest keys, and move on after a
//! streak of fast, accurate sessions.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod keyboard;
pub mod scheduler;
pub mod session;
pub mod store;

mod assets;

pub use app::{Resources, Trainer};
pub use error::{QuackError, Result};
