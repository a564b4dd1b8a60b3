//! Static id → key reference data and localization lookups.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{ASSET_EXTENSION, GRIZZCO_WEAPON_MIN_ID, MAX_HAZARD_LEVEL};

const DEFAULT_ID_KEY_MAP: &str = include_str!("../assets/id_key_map.json");
const DEFAULT_CATALOG: &str = include_str!("../assets/i18n/en.json");

/// Reference-data table an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdCategory {
    Boss,
    Stage,
    Special,
    Event,
    WaterLevel,
    FailReason,
    Weapon,
}

impl IdCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            IdCategory::Boss => "boss",
            IdCategory::Stage => "stage",
            IdCategory::Special => "special",
            IdCategory::Event => "event",
            IdCategory::WaterLevel => "water_level",
            IdCategory::FailReason => "fail_reason",
            IdCategory::Weapon => "weapon",
        }
    }
}

impl fmt::Display for IdCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable id → key tables, one per [`IdCategory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdKeyMap {
    tables: BTreeMap<IdCategory, BTreeMap<String, String>>,
}

impl Default for IdKeyMap {
    fn default() -> Self {
        Self::from_json(DEFAULT_ID_KEY_MAP).unwrap_or_else(|_| Self::empty())
    }
}

impl IdKeyMap {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Load the tables from a JSON object keyed by category.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe category → id → key tables.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Raw key registered for `id`, if any.
    #[must_use]
    pub fn key(&self, category: IdCategory, id: impl fmt::Display) -> Option<&str> {
        self.tables
            .get(&category)
            .and_then(|table| table.get(&id.to_string()))
            .map(String::as_str)
    }

    /// Localization key `"{category}.{key}"` for an id.
    ///
    /// An unknown id yields `None` so the miss reaches the caller.
    #[must_use]
    pub fn translation_key(&self, category: IdCategory, id: impl fmt::Display) -> Option<String> {
        self.key(category, id).map(|key| format!("{category}.{key}"))
    }

    /// Localized label for an id, or `None` when the id is not in the table.
    #[must_use]
    pub fn translate(
        &self,
        catalog: &Catalog,
        category: IdCategory,
        id: impl fmt::Display,
    ) -> Option<String> {
        self.translation_key(category, id).map(|key| catalog.t(&key))
    }
}

/// Nested JSON message catalog with an optional fallback catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    translations: Value,
    fallback: Value,
}

impl Default for Catalog {
    fn default() -> Self {
        let english = serde_json::from_str(DEFAULT_CATALOG)
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self {
            translations: english.clone(),
            fallback: english,
        }
    }
}

impl Catalog {
    /// Build a catalog from JSON, falling back to the bundled English catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let translations = serde_json::from_str(json)?;
        Ok(Self {
            translations,
            fallback: Self::default().fallback,
        })
    }

    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        get_nested_value(&self.translations, key).or_else(|| get_nested_value(&self.fallback, key))
    }

    /// Translated text, or the key itself when no catalog has it.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }
}

fn get_nested_value(obj: &Value, key: &str) -> Option<String> {
    let mut current = obj;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    current.as_str().map(ToString::to_string)
}

/// `<base>/<category>/<id>.png`; no validation of the resulting URL.
#[must_use]
pub fn icon_url(base: &str, category: &str, id: impl fmt::Display) -> String {
    format!(
        "{}/{category}/{id}.{ASSET_EXTENSION}",
        base.trim_end_matches('/')
    )
}

#[must_use]
pub const fn is_grizzco_weapon(weapon_id: i32) -> bool {
    weapon_id >= GRIZZCO_WEAPON_MIN_ID
}

#[must_use]
pub const fn is_max_hazard(hazard_level: u32) -> bool {
    hazard_level == MAX_HAZARD_LEVEL
}
