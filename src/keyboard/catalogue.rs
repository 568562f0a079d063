use std::collections::{BTreeMap, BTreeSet};

use crate::error::{QuackError, Result};

/// Physical keys in the order they are unlocked, home row outwards.
pub const PRACTICE_ORDER: &[&str] = &[
    "KeyF", "KeyJ", //
    "KeyD", "KeyK", //
    "KeyS", "KeyL", //
    "KeyA", "Semicolon", //
    "KeyE", "KeyI", //
    "KeyW", "KeyO", //
    "KeyV", "KeyM", //
    "KeyG", "KeyH", //
    "KeyQ", "KeyP", //
    "KeyR", "KeyU", //
    "KeyT", "KeyY", //
    "KeyB", "KeyN", //
    "KeyC", "Comma", //
    "KeyX", "Period", //
    "KeyZ", "Slash",
];

/// Marker of the single dead key most layouts put on the home row.
pub const ONE_DEAD_KEY: &str = "**";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Glyph {
    Letter(char),
    DeadKey(String),
}

impl Glyph {
    /// Single characters are letters; anything longer is a dead-key marker.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(ch), None) => Some(Glyph::Letter(ch)),
            _ => Some(Glyph::DeadKey(raw.to_string())),
        }
    }

    pub fn letter(&self) -> Option<char> {
        match self {
            Glyph::Letter(ch) => Some(*ch),
            Glyph::DeadKey(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDescriptor {
    pub id: String,
    pub glyphs: Vec<Glyph>,
}

/// Composition table: dead-key marker, then base letter, to composed letter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeadKeyTable {
    pub compositions: BTreeMap<String, BTreeMap<char, char>>,
}

impl DeadKeyTable {
    pub fn compose(&self, marker: &str, base: char) -> Option<char> {
        self.compositions.get(marker)?.get(&base).copied()
    }
}

/// What a `KeyProvider` hands back for one layout.
#[derive(Clone, Debug, Default)]
pub struct LayoutData {
    pub name: String,
    pub keys: Vec<KeyDescriptor>,
    pub deadkeys: DeadKeyTable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Key {
    pub id: String,
    pub glyphs: Vec<Glyph>,
    pub position: usize,
}

impl Key {
    pub fn primary(&self) -> Option<&Glyph> {
        self.glyphs.first()
    }

    pub fn primary_letter(&self) -> Option<char> {
        self.primary().and_then(Glyph::letter)
    }

    pub fn dead_key_markers(&self) -> impl Iterator<Item = &str> {
        self.glyphs.iter().filter_map(|g| match g {
            Glyph::DeadKey(marker) => Some(marker.as_str()),
            Glyph::Letter(_) => None,
        })
    }

    /// Label shown in key lists: the primary letter, a star for a dead key.
    pub fn label(&self) -> char {
        match self.primary() {
            Some(Glyph::Letter(ch)) => *ch,
            Some(Glyph::DeadKey(_)) => '★',
            None => '?',
        }
    }
}

/// The fixed, ordered set of learnable keys for one layout.
#[derive(Clone, Debug)]
pub struct KeyCatalogue {
    pub name: String,
    keys: Vec<Key>,
    deadkeys: DeadKeyTable,
}

impl KeyCatalogue {
    /// Orders the layout's keys by `PRACTICE_ORDER`. Keys outside the practice
    /// order are ignored; a practice key that is missing or has no glyphs is a
    /// configuration error.
    pub fn from_layout(layout: LayoutData) -> Result<Self> {
        Self::with_order(layout, PRACTICE_ORDER)
    }

    pub fn with_order(layout: LayoutData, order: &[&str]) -> Result<Self> {
        let mut by_id: BTreeMap<String, Vec<Glyph>> = layout
            .keys
            .into_iter()
            .map(|key| (key.id, key.glyphs))
            .collect();

        let mut keys = Vec::with_capacity(order.len());
        for (position, &id) in order.iter().enumerate() {
            let glyphs = by_id.remove(id).ok_or_else(|| {
                QuackError::Configuration(format!(
                    "layout '{}' has no mapping for key {id}",
                    layout.name
                ))
            })?;
            if glyphs.is_empty() {
                return Err(QuackError::Configuration(format!(
                    "key {id} in layout '{}' has no glyphs",
                    layout.name
                )));
            }
            keys.push(Key {
                id: id.to_string(),
                glyphs,
                position,
            });
        }

        Ok(Self {
            name: layout.name,
            keys,
            deadkeys: layout.deadkeys,
        })
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn deadkeys(&self) -> &DeadKeyTable {
        &self.deadkeys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Clamp a requested level into the catalogue bounds.
    pub fn clamp_level(&self, level: usize) -> usize {
        level.clamp(1, self.keys.len().max(1))
    }
}

/// Letters reachable through dead keys bound on `keys`: every primary letter
/// of `keys` that the bound marker composes with.
pub fn composed_letters(keys: &[Key], table: &DeadKeyTable) -> BTreeSet<char> {
    let markers: BTreeSet<&str> = keys.iter().flat_map(Key::dead_key_markers).collect();

    markers
        .into_iter()
        .flat_map(|marker| {
            keys.iter()
                .filter_map(Key::primary_letter)
                .filter_map(move |base| table.compose(marker, base))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn descriptor(id: &str, glyphs: &[&str]) -> KeyDescriptor {
        KeyDescriptor {
            id: id.to_string(),
            glyphs: glyphs.iter().filter_map(|g| Glyph::parse(g)).collect(),
        }
    }

    /// QWERTY-like layout with a `**` dead key on `KeyG`'s second glyph.
    pub(crate) fn test_layout() -> LayoutData {
        let letters = [
            ("KeyF", 'f'),
            ("KeyJ", 'j'),
            ("KeyD", 'd'),
            ("KeyK", 'k'),
            ("KeyS", 's'),
            ("KeyL", 'l'),
            ("KeyA", 'a'),
            ("Semicolon", ';'),
            ("KeyE", 'e'),
            ("KeyI", 'i'),
            ("KeyW", 'w'),
            ("KeyO", 'o'),
            ("KeyV", 'v'),
            ("KeyM", 'm'),
            ("KeyG", 'g'),
            ("KeyH", 'h'),
            ("KeyQ", 'q'),
            ("KeyP", 'p'),
            ("KeyR", 'r'),
            ("KeyU", 'u'),
            ("KeyT", 't'),
            ("KeyY", 'y'),
            ("KeyB", 'b'),
            ("KeyN", 'n'),
            ("KeyC", 'c'),
            ("Comma", ','),
            ("KeyX", 'x'),
            ("Period", '.'),
            ("KeyZ", 'z'),
            ("Slash", '/'),
        ];
        let keys = letters
            .iter()
            .map(|&(id, ch)| {
                let lower = ch.to_string();
                let upper = ch.to_uppercase().to_string();
                if id == "KeyG" {
                    descriptor(id, &[&lower, "**"])
                } else if upper != lower {
                    descriptor(id, &[&lower, &upper])
                } else {
                    descriptor(id, &[&lower])
                }
            })
            .collect();

        let mut odk = BTreeMap::new();
        odk.insert('e', 'é');
        odk.insert('a', 'à');
        let mut compositions = BTreeMap::new();
        compositions.insert(ONE_DEAD_KEY.to_string(), odk);

        LayoutData {
            name: "test".to_string(),
            keys,
            deadkeys: DeadKeyTable { compositions },
        }
    }

    #[test]
    fn glyph_parse_splits_letters_and_markers() {
        assert_eq!(Glyph::parse("a"), Some(Glyph::Letter('a')));
        assert_eq!(Glyph::parse("é"), Some(Glyph::Letter('é')));
        assert_eq!(Glyph::parse("**"), Some(Glyph::DeadKey("**".into())));
        assert_eq!(Glyph::parse(""), None);
    }

    #[test]
    fn catalogue_follows_practice_order() {
        let catalogue = KeyCatalogue::from_layout(test_layout()).unwrap();
        assert_eq!(catalogue.len(), 30);
        let first: Vec<char> = catalogue.keys()[..4]
            .iter()
            .filter_map(Key::primary_letter)
            .collect();
        assert_eq!(first, vec!['f', 'j', 'd', 'k']);
        assert_eq!(catalogue.keys()[29].position, 29);
    }

    #[test]
    fn key_without_glyphs_fails_fast() {
        let mut layout = test_layout();
        layout.keys[3].glyphs.clear();
        let err = KeyCatalogue::from_layout(layout).unwrap_err();
        assert!(matches!(err, QuackError::Configuration(_)));
        assert!(err.to_string().contains("KeyK"));
    }

    #[test]
    fn key_without_glyphs_has_no_primary() {
        let key = Key {
            id: "KeyF".to_string(),
            glyphs: Vec::new(),
            position: 0,
        };
        assert_eq!(key.primary(), None);
        assert_eq!(key.primary_letter(), None);
        assert_eq!(key.label(), '?');

        let dead = Key {
            glyphs: vec![Glyph::DeadKey(ONE_DEAD_KEY.to_string())],
            ..key
        };
        assert_eq!(dead.primary_letter(), None);
        assert_eq!(dead.label(), '★');
    }

    #[test]
    fn missing_practice_key_fails_fast() {
        let mut layout = test_layout();
        layout.keys.retain(|k| k.id != "Slash");
        assert!(KeyCatalogue::from_layout(layout).is_err());
    }

    #[test]
    fn clamp_level_stays_in_bounds() {
        let catalogue = KeyCatalogue::from_layout(test_layout()).unwrap();
        assert_eq!(catalogue.clamp_level(0), 1);
        assert_eq!(catalogue.clamp_level(12), 12);
        assert_eq!(catalogue.clamp_level(99), 30);
    }

    #[test]
    fn composed_letters_need_a_bound_dead_key() {
        let catalogue = KeyCatalogue::from_layout(test_layout()).unwrap();
        // first 14 keys: no dead key yet, even though 'e' and 'a' compose
        assert!(composed_letters(&catalogue.keys()[..14], catalogue.deadkeys()).is_empty());
        // KeyG (position 14) carries the dead key
        let composed = composed_letters(&catalogue.keys()[..15], catalogue.deadkeys());
        assert_eq!(composed.into_iter().collect::<Vec<_>>(), vec!['à', 'é']);
    }
}
