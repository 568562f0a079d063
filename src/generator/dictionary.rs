use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

use crate::assets::Assets;
use crate::error::{QuackError, Result};

/// Ranked candidate pools, most frequent first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub trigrams: Vec<String>,
    #[serde(default)]
    pub bigrams: Vec<String>,
}

impl Dictionary {
    /// NFC-normalize every entry so precomposed dead-key letters compare
    /// equal to dictionary characters. Empty entries are dropped.
    pub fn normalized(self) -> Self {
        let nfc = ComposingNormalizerBorrowed::new_nfc();
        let normalize = |pool: Vec<String>| -> Vec<String> {
            pool.iter()
                .map(|s| nfc.normalize(s.trim()).to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            words: normalize(self.words),
            trigrams: normalize(self.trigrams),
            bigrams: normalize(self.bigrams),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len() + self.trigrams.len() + self.bigrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Supplies the candidate pools of a dictionary.
pub trait DictionarySource: Send + Sync {
    fn load_dictionary(&self, dictionary_id: &str) -> Result<Dictionary>;
}

/// Dictionaries bundled with the binary under `assets/dictionaries/`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedDictionaries;

impl EmbeddedDictionaries {
    pub fn available() -> Vec<String> {
        let mut ids: Vec<String> = Assets::iter()
            .filter_map(|path| {
                path.strip_prefix("dictionaries/")
                    .and_then(|name| name.strip_suffix(".json"))
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        ids
    }
}

impl DictionarySource for EmbeddedDictionaries {
    fn load_dictionary(&self, dictionary_id: &str) -> Result<Dictionary> {
        let file = Assets::get(&format!("dictionaries/{dictionary_id}.json")).ok_or_else(|| {
            QuackError::dictionary(dictionary_id, "no such built-in dictionary")
        })?;
        let dictionary: Dictionary = serde_json::from_slice(&file.data)
            .map_err(|e| QuackError::dictionary(dictionary_id, e))?;
        let dictionary = dictionary.normalized();
        tracing::debug!(
            dictionary = dictionary_id,
            words = dictionary.words.len(),
            trigrams = dictionary.trigrams.len(),
            bigrams = dictionary.bigrams.len(),
            "loaded dictionary"
        );
        Ok(dictionary)
    }
}
