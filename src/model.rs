use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Locator text dockutil reports for a regular spacer tile.
pub const SPACER_SENTINEL: &str = "spacer-tile";
/// Locator text dockutil reports for a small spacer tile.
pub const SMALL_SPACER_SENTINEL: &str = "small-spacer-tile";
pub const SPACER_LABEL: &str = "Spacer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Path(String), // Absolute or "~"-abbreviated
    Spacer { small: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub label: String,
    pub locator: Locator,
    pub raw_options: Option<String>,
}

impl ParsedItem {
    pub fn new(label: impl Into<String>, locator: Locator, raw_options: Option<String>) -> Self {
        Self {
            label: label.into(),
            locator,
            raw_options,
        }
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self.locator, Locator::Spacer { .. }) || self.label == SPACER_LABEL
    }

    pub fn options(&self) -> TileOptions {
        self.raw_options
            .as_deref()
            .map(TileOptions::parse)
            .unwrap_or_default()
    }
}

/// Key/value pairs from the plist-style options column, e.g.
/// `tile-type = directory-tile; showas = 2; arrangement = 1;`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileOptions {
    pairs: Vec<(String, String)>,
}

impl TileOptions {
    pub fn parse(raw: &str) -> Self {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let body = raw.trim().trim_start_matches('{').trim_end_matches('}');

        for part in body.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let key = key.trim().trim_matches('"').to_string();
            let value = value.trim().trim_matches('"').to_string();
            if key.is_empty() || pairs.iter().any(|(k, _)| *k == key) {
                continue;
            }
            pairs.push((key, value));
        }

        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn tile_type(&self) -> Option<&str> {
        self.get("tile-type")
    }

    pub fn is_recents(&self) -> bool {
        self.tile_type() == Some("recents-tile")
    }

    pub fn is_folder(&self) -> bool {
        self.tile_type() == Some("directory-tile")
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self.tile_type(), Some(SPACER_SENTINEL) | Some(SMALL_SPACER_SENTINEL))
    }

    pub fn is_small_spacer(&self) -> bool {
        self.tile_type() == Some(SMALL_SPACER_SENTINEL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub fragments: Vec<String>,
}

impl Preset {
    pub fn new(name: impl Into<String>, fragments: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            fragments,
        }
    }
}
