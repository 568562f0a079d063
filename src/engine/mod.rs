pub mod filter;
pub mod letter_unlock;
pub mod scoring;
pub mod streak;

pub use letter_unlock::KeySet;
pub use streak::{LevelState, StreakController, Transition};
