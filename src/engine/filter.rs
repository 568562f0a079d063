use crate::engine::letter_unlock::KeySet;
use crate::generator::dictionary::Dictionary;

pub const MIN_WORD_COUNT: usize = 42;

/// Collect practice candidates for `keys`, preferring real words and falling
/// back to trigrams, bigrams and finally the bare unlocked letters. Scanning
/// stops after the first pool that brings the total above `min_count`.
pub fn select_candidates(dictionary: &Dictionary, keys: &KeySet, min_count: usize) -> Vec<String> {
    let letters: Vec<String> = keys.raw_letters().iter().map(char::to_string).collect();
    let pools: [&[String]; 4] = [
        &dictionary.words,
        &dictionary.trigrams,
        &dictionary.bigrams,
        &letters,
    ];

    let mut candidates: Vec<String> = Vec::new();
    for pool in pools {
        candidates.extend(pool.iter().filter(|s| keys.is_eligible(s)).cloned());
        if candidates.len() > min_count {
            break;
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::letter_unlock::{INCLUDE_NEW_LETTERS, STARTING_LEVEL};
    use crate::keyboard::catalogue::KeyCatalogue;
    use crate::keyboard::catalogue::tests::test_layout;

    fn key_set(level: usize) -> KeySet {
        let catalogue = KeyCatalogue::from_layout(test_layout()).unwrap();
        KeySet::new(&catalogue, level, STARTING_LEVEL, INCLUDE_NEW_LETTERS).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn words_with_locked_letters_are_rejected() {
        let dictionary = Dictionary {
            words: strings(&["fjord", "desk"]),
            ..Dictionary::default()
        };
        let candidates = select_candidates(&dictionary, &key_set(4), MIN_WORD_COUNT);
        assert!(!candidates.iter().any(|c| c == "fjord" || c == "desk"));
        // only the single-letter fallback pool remains
        assert_eq!(candidates, strings(&["f", "j", "d", "k"]));
    }

    #[test]
    fn stops_once_real_words_are_enough() {
        let words: Vec<String> = (0..50).map(|i| "fdjk".repeat(1 + i % 3)).collect();
        let dictionary = Dictionary {
            words,
            trigrams: strings(&["fjd"]),
            bigrams: strings(&["fj"]),
        };
        let candidates = select_candidates(&dictionary, &key_set(4), MIN_WORD_COUNT);
        assert_eq!(candidates.len(), 50);
        assert!(!candidates.contains(&"fjd".to_string()));
    }

    #[test]
    fn keeps_scanning_while_at_or_below_threshold() {
        let dictionary = Dictionary {
            words: vec!["jdk".to_string(); 42],
            trigrams: strings(&["fjd", "ras"]),
            bigrams: strings(&["fj"]),
        };
        let candidates = select_candidates(&dictionary, &key_set(4), MIN_WORD_COUNT);
        // 42 words is not more than 42, so trigrams are scanned too
        assert_eq!(candidates.len(), 43);
        assert_eq!(candidates.last().map(String::as_str), Some("fjd"));
    }

    #[test]
    fn later_level_keeps_only_strings_with_new_letters() {
        let dictionary = Dictionary {
            words: strings(&["flask", "skid", "jade", "lads", "fads"]),
            trigrams: strings(&["fjk", "sdl"]),
            bigrams: strings(&["ds", "fj"]),
        };
        let candidates = select_candidates(&dictionary, &key_set(6), MIN_WORD_COUNT);
        for c in &candidates {
            assert!(c.contains('s') || c.contains('l'), "{c}");
        }
        assert!(!candidates.contains(&"fjk".to_string()));
        assert!(candidates.contains(&"sdl".to_string()));
        assert!(candidates.contains(&"l".to_string()));
    }

    #[test]
    fn empty_when_nothing_qualifies() {
        let catalogue = KeyCatalogue::from_layout(test_layout()).unwrap();
        // no new letters at all, so even the single-letter pool is rejected
        let keys = KeySet::new(&catalogue, 2, STARTING_LEVEL, 0).unwrap();
        assert!(keys.new_letters().is_empty());
        let candidates = select_candidates(&Dictionary::default(), &keys, MIN_WORD_COUNT);
        assert!(candidates.is_empty());
    }
}
