use std::collections::BTreeMap;

use serde::Deserialize;

use crate::assets::Assets;
use crate::error::{QuackError, Result};
use crate::keyboard::catalogue::{DeadKeyTable, Glyph, KeyDescriptor, LayoutData};

/// Supplies the key descriptors and dead-key table of a layout.
pub trait KeyProvider: Send + Sync {
    fn load_layout(&self, layout_id: &str) -> Result<LayoutData>;
}

/// On-disk shape of a layout: key id to glyph strings, dead-key marker to
/// base/composed letter pairs.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LayoutFile {
    #[serde(default)]
    pub name: String,
    pub keymap: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub deadkeys: BTreeMap<String, BTreeMap<String, String>>,
}

impl LayoutFile {
    pub fn into_layout_data(self, fallback_name: &str) -> LayoutData {
        let keys = self
            .keymap
            .into_iter()
            .map(|(id, glyphs)| KeyDescriptor {
                id,
                glyphs: glyphs.iter().filter_map(|g| Glyph::parse(g)).collect(),
            })
            .collect();

        let compositions = self
            .deadkeys
            .into_iter()
            .map(|(marker, table)| {
                let table = table
                    .into_iter()
                    .filter_map(|(base, composed)| {
                        Some((single_char(&base)?, single_char(&composed)?))
                    })
                    .collect();
                (marker, table)
            })
            .collect();

        LayoutData {
            name: if self.name.is_empty() {
                fallback_name.to_string()
            } else {
                self.name
            },
            keys,
            deadkeys: DeadKeyTable { compositions },
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// Layouts bundled with the binary under `assets/layouts/`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedLayouts;

impl EmbeddedLayouts {
    pub fn available() -> Vec<String> {
        let mut ids: Vec<String> = Assets::iter()
            .filter_map(|path| {
                path.strip_prefix("layouts/")
                    .and_then(|name| name.strip_suffix(".json"))
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        ids
    }
}

impl KeyProvider for EmbeddedLayouts {
    fn load_layout(&self, layout_id: &str) -> Result<LayoutData> {
        let file = Assets::get(&format!("layouts/{layout_id}.json"))
            .ok_or_else(|| QuackError::layout(layout_id, "no such built-in layout"))?;
        let parsed: LayoutFile =
            serde_json::from_slice(&file.data).map_err(|e| QuackError::layout(layout_id, e))?;
        tracing::debug!(layout = layout_id, keys = parsed.keymap.len(), "loaded layout");
        Ok(parsed.into_layout_data(layout_id))
    }
}
