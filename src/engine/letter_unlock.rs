use std::collections::BTreeSet;

use crate::error::{QuackError, Result};
use crate::keyboard::catalogue::{Key, KeyCatalogue, composed_letters};

pub const STARTING_LEVEL: usize = 4;
pub const INCLUDE_NEW_LETTERS: usize = 2;

/// Letters a learner may type at a given level, and the newest of them that
/// every lesson has to exercise.
#[derive(Clone, Debug)]
pub struct KeySet {
    pub level: usize,
    raw_letters: Vec<char>,
    unlocked: BTreeSet<char>,
    new_letters: BTreeSet<char>,
}

impl KeySet {
    pub fn new(
        catalogue: &KeyCatalogue,
        level: usize,
        starting_level: usize,
        include_new_letters: usize,
    ) -> Result<Self> {
        if catalogue.is_empty() {
            return Err(QuackError::Configuration(format!(
                "layout '{}' has no practice keys",
                catalogue.name
            )));
        }
        let level = catalogue.clamp_level(level);
        let keys = &catalogue.keys()[..level];

        if let Some(key) = keys.iter().find(|k| k.glyphs.is_empty()) {
            return Err(QuackError::Configuration(format!(
                "key {} has no glyphs",
                key.id
            )));
        }

        let raw_letters: Vec<char> = keys.iter().filter_map(Key::primary_letter).collect();

        let mut unlocked: BTreeSet<char> = keys
            .iter()
            .flat_map(|k| k.glyphs.iter().filter_map(|g| g.letter()))
            .collect();
        unlocked.extend(composed_letters(keys, catalogue.deadkeys()));

        let new_count = if level == starting_level {
            starting_level
        } else {
            include_new_letters
        }
        .min(level);
        let new_letters = keys[level - new_count..]
            .iter()
            .filter_map(Key::primary_letter)
            .collect();

        Ok(Self {
            level,
            raw_letters,
            unlocked,
            new_letters,
        })
    }

    /// Primary letters of the unlocked keys, in unlock order.
    pub fn raw_letters(&self) -> &[char] {
        &self.raw_letters
    }

    pub fn unlocked(&self) -> &BTreeSet<char> {
        &self.unlocked
    }

    pub fn new_letters(&self) -> &BTreeSet<char> {
        &self.new_letters
    }

    pub fn is_unlocked(&self, ch: char) -> bool {
        self.unlocked.contains(&ch) || self.new_letters.contains(&ch)
    }

    /// Typable with the unlocked letters and containing at least one new one.
    pub fn is_eligible(&self, candidate: &str) -> bool {
        let mut has_new = false;
        for ch in candidate.chars() {
            if self.new_letters.contains(&ch) {
                has_new = true;
            } else if !self.unlocked.contains(&ch) {
                return false;
            }
        }
        has_new
    }

    pub fn progress(&self, total_keys: usize) -> f64 {
        if total_keys == 0 {
            return 0.0;
        }
        self.level as f64 / total_keys as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::streak::next_level;
    use crate::keyboard::catalogue::tests::test_layout;

    fn catalogue() -> KeyCatalogue {
        KeyCatalogue::from_layout(test_layout()).unwrap()
    }

    fn key_set(level: usize) -> KeySet {
        KeySet::new(&catalogue(), level, STARTING_LEVEL, INCLUDE_NEW_LETTERS).unwrap()
    }

    #[test]
    fn starting_level_treats_every_letter_as_new() {
        let keys = key_set(4);
        assert_eq!(keys.raw_letters(), &['f', 'j', 'd', 'k']);
        let new: Vec<char> = keys.new_letters().iter().copied().collect();
        assert_eq!(new, vec!['d', 'f', 'j', 'k']);
        assert!(keys.is_eligible("fjdk"));
        assert!(keys.is_eligible("dd"));
    }

    #[test]
    fn rejects_words_with_locked_letters() {
        let keys = key_set(4);
        assert!(!keys.is_eligible("fjord"));
        assert!(!keys.is_eligible("desk"));
        assert!(!keys.is_eligible(""));
    }

    #[test]
    fn later_levels_require_one_of_the_two_newest_letters() {
        let keys = key_set(6);
        let new: Vec<char> = keys.new_letters().iter().copied().collect();
        assert_eq!(new, vec!['l', 's']);
        assert!(keys.is_eligible("sdf"));
        assert!(keys.is_eligible("kl"));
        assert!(!keys.is_eligible("fjdk"));
    }

    #[test]
    fn alternate_glyphs_are_unlocked() {
        let keys = key_set(6);
        assert!(keys.unlocked().contains(&'F'));
        assert!(keys.is_eligible("Sl"));
        assert!(!keys.is_eligible("Sd"));
        assert!(!keys.unlocked().contains(&'A'));
    }

    #[test]
    fn composed_letters_join_once_the_dead_key_is_unlocked() {
        assert!(!key_set(14).unlocked().contains(&'é'));
        let keys = key_set(16);
        assert!(keys.unlocked().contains(&'é'));
        assert!(keys.unlocked().contains(&'à'));
        assert!(keys.is_eligible("éh"));
    }

    #[test]
    fn level_one_caps_new_letter_count() {
        let keys = key_set(1);
        assert_eq!(keys.new_letters().len(), 1);
        assert!(keys.is_eligible("fff"));
    }

    #[test]
    fn out_of_range_level_is_clamped() {
        assert_eq!(key_set(0).level, 1);
        assert_eq!(key_set(64).level, 30);
    }

    #[test]
    fn reachable_levels_grow_monotonically() {
        let mut previous: Option<KeySet> = None;
        let mut level = STARTING_LEVEL;
        while level <= 30 {
            let keys = key_set(level);
            let primaries: BTreeSet<char> = keys.raw_letters().iter().copied().collect();
            assert!(primaries.len() >= level);
            assert!(!keys.new_letters().is_empty());
            assert!(keys.new_letters().is_subset(keys.unlocked()));
            if let Some(prev) = &previous {
                assert!(prev.unlocked().is_subset(keys.unlocked()));
            }
            previous = Some(keys);
            level = next_level(level);
        }
    }

    #[test]
    fn progress_ratio() {
        let keys = key_set(6);
        assert!((keys.progress(30) - 0.2).abs() < 0.001);
    }
}
