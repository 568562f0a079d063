use anyhow::Result;

use crate::store::PersistenceStore;

pub const MIN_WIN_STREAK: u32 = 5;

/// Next even level strictly above `level`.
pub fn next_level(level: usize) -> usize {
    2 * (level / 2 + 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelState {
    pub level: usize,
    pub streak: u32,
}

impl LevelState {
    pub fn new(level: usize) -> Self {
        Self { level, streak: 1 }
    }

    pub fn level_key(layout_id: &str) -> String {
        format!("{layout_id}.level")
    }

    pub fn streak_key(layout_id: &str) -> String {
        format!("{layout_id}.quacks")
    }

    /// Missing or unparsable values fall back to the starting level and a
    /// streak of one.
    pub fn load(store: &dyn PersistenceStore, layout_id: &str, starting_level: usize) -> Self {
        let level = store
            .get(&Self::level_key(layout_id))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&l| l > 0)
            .unwrap_or(starting_level);
        let streak = store
            .get(&Self::streak_key(layout_id))
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);
        Self { level, streak }
    }

    pub fn save(&self, store: &mut dyn PersistenceStore, layout_id: &str) -> Result<()> {
        store.set(&Self::level_key(layout_id), &self.level.to_string())?;
        store.set(&Self::streak_key(layout_id), &self.streak.to_string())?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Same level, fresh lesson.
    LessonAdvance,
    LevelUp { from: usize, to: usize },
}

/// Turns pass/fail outcomes into level changes: `win_streak` consecutive
/// passes unlock the next keys, a failure only costs one step of streak.
#[derive(Clone, Debug)]
pub struct StreakController {
    state: LevelState,
    win_streak: u32,
    max_level: usize,
}

impl StreakController {
    /// A saved streak is brought back into `1..win_streak`; it resets on
    /// every level-up, so a larger value can only come from a damaged store.
    pub fn new(state: LevelState, win_streak: u32, max_level: usize) -> Self {
        let streak = state.streak.clamp(1, win_streak.saturating_sub(1).max(1));
        Self {
            state: LevelState { streak, ..state },
            win_streak,
            max_level: max_level.max(1),
        }
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn level(&self) -> usize {
        self.state.level
    }

    pub fn streak(&self) -> u32 {
        self.state.streak
    }

    pub fn record(&mut self, passed: bool) -> Transition {
        if !passed {
            self.state.streak = self.state.streak.saturating_sub(1).max(1);
            return Transition::LessonAdvance;
        }

        self.state.streak = self.state.streak.saturating_add(1);
        if self.state.streak < self.win_streak {
            return Transition::LessonAdvance;
        }

        let from = self.state.level;
        let to = next_level(from).min(self.max_level).max(from);
        self.state.level = to;
        self.state.streak = 1;
        if to == from {
            Transition::LessonAdvance
        } else {
            Transition::LevelUp { from, to }
        }
    }

    /// Manual level selection; clamped, and the streak is left alone.
    pub fn set_level(&mut self, level: usize) {
        self.state.level = level.clamp(1, self.max_level);
    }

    pub fn reset(&mut self, starting_level: usize) {
        self.state = LevelState::new(starting_level.clamp(1, self.max_level));
    }
}
