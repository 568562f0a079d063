use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::filter::MIN_WORD_COUNT;
use crate::engine::letter_unlock::{INCLUDE_NEW_LETTERS, STARTING_LEVEL};
use crate::engine::scoring::{MIN_CPM_SPEED, MIN_PRECISION, Thresholds};
use crate::engine::streak::MIN_WIN_STREAK;
use crate::generator::lesson::{LESSON_MIN_CHARS, SamplingStrategy};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default = "default_dictionary")]
    pub dictionary: String,
    #[serde(default = "default_geometry")]
    pub geometry: String,
    #[serde(default = "default_starting_level")]
    pub starting_level: usize,
    #[serde(default = "default_min_word_count")]
    pub min_word_count: usize,
    #[serde(default = "default_include_new_letters")]
    pub include_new_letters: usize,
    #[serde(default = "default_lesson_min_chars")]
    pub lesson_min_chars: usize,
    #[serde(default = "default_min_cpm")]
    pub min_cpm: u32,
    #[serde(default = "default_min_precision")]
    pub min_precision: f64,
    #[serde(default = "default_win_streak")]
    pub win_streak: u32,
    #[serde(default = "default_feedback_delay_ms")]
    pub feedback_delay_ms: u64,
    #[serde(default)]
    pub sampling: SamplingStrategy,
}

fn default_layout() -> String {
    "qwerty".to_string()
}
fn default_dictionary() -> String {
    "en".to_string()
}
fn default_geometry() -> String {
    "ansi".to_string()
}
fn default_starting_level() -> usize {
    STARTING_LEVEL
}
fn default_min_word_count() -> usize {
    MIN_WORD_COUNT
}
fn default_include_new_letters() -> usize {
    INCLUDE_NEW_LETTERS
}
fn default_lesson_min_chars() -> usize {
    LESSON_MIN_CHARS
}
fn default_min_cpm() -> u32 {
    MIN_CPM_SPEED
}
fn default_min_precision() -> f64 {
    MIN_PRECISION
}
fn default_win_streak() -> u32 {
    MIN_WIN_STREAK
}
fn default_feedback_delay_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            dictionary: default_dictionary(),
            geometry: default_geometry(),
            starting_level: default_starting_level(),
            min_word_count: default_min_word_count(),
            include_new_letters: default_include_new_letters(),
            lesson_min_chars: default_lesson_min_chars(),
            min_cpm: default_min_cpm(),
            min_precision: default_min_precision(),
            win_streak: default_win_streak(),
            feedback_delay_ms: default_feedback_delay_ms(),
            sampling: SamplingStrategy::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quackr")
            .join("config.toml")
    }

    /// Clamp values that would make lessons impossible or meaningless.
    pub fn validate(&mut self) {
        self.starting_level = self.starting_level.clamp(1, 30);
        self.min_word_count = self.min_word_count.clamp(1, 1000);
        self.include_new_letters = self.include_new_letters.clamp(1, 30);
        self.lesson_min_chars = self.lesson_min_chars.clamp(10, 1000);
        self.min_precision = self.min_precision.clamp(0.0, 100.0);
        self.win_streak = self.win_streak.clamp(2, 50);
        self.feedback_delay_ms = self.feedback_delay_ms.min(10_000);
        if self.layout.trim().is_empty() {
            self.layout = default_layout();
        }
        if self.dictionary.trim().is_empty() {
            self.dictionary = default_dictionary();
        }
        if self.geometry.trim().is_empty() {
            self.geometry = default_geometry();
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_cpm: self.min_cpm,
            min_precision: self.min_precision,
        }
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}
