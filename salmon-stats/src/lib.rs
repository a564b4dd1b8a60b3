//! Salmon Run statistics engine
//!
//! Turns raw match-result documents into typed, aggregated results and
//! provides the formatters every result view relies on. The crate does no
//! I/O beyond parsing the JSON it is handed.

pub mod config;
pub mod constants;
pub mod extended;
pub mod format;
pub mod ids;
pub mod normalize;
pub mod numbers;
pub mod result;

// Re-export commonly used types
pub use config::StatsConfig;
pub use extended::{
    ExtendedResult, Highest, PlayerResult, SpecialUsage, Stat, WaveResult, derive,
};
pub use format::{
    DateInput, FormatError, MetricCount, MetricPrefix, convert_epoch, format_date_in_local_tz,
    format_date_in_tz, format_date_to_mdhm, format_date_to_ymdhm, format_schedule_id,
    percentage, time_difference, to_fixed, use_metric_prefix,
};
pub use ids::{Catalog, IdCategory, IdKeyMap, icon_url, is_grizzco_weapon, is_max_hazard};
pub use normalize::{
    NormalizeError, RawSchedule, RawUser, Schedule, UserProfile, parse_raw_schedule,
    parse_raw_user, parse_schedule_id,
};
pub use result::{BossId, PlayerId, RawMatchResult, ResultError};

/// Errors raised while loading reference data.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("reference data {name} could not be read: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("reference data {name} is malformed: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no bundled reference data named {0}")]
    Unknown(String),
}

/// Trait for abstracting reference-data loading.
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the id → key tables
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be loaded.
    fn load_id_key_map(&self) -> Result<IdKeyMap, Self::Error>;

    /// Load configuration data by name
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Loader serving the assets compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLoader;

impl DataLoader for StaticLoader {
    type Error = ReferenceDataError;

    fn load_id_key_map(&self) -> Result<IdKeyMap, Self::Error> {
        Ok(IdKeyMap::default())
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let data = match config_name {
            "config" => include_str!("../assets/config.json"),
            "id_key_map" => include_str!("../assets/id_key_map.json"),
            other => return Err(ReferenceDataError::Unknown(other.to_string())),
        };
        serde_json::from_str(data).map_err(|source| ReferenceDataError::Parse {
            name: config_name.to_string(),
            source,
        })
    }
}

/// Derivation entry point bundling the reference data every view needs.
pub struct StatsEngine {
    config: StatsConfig,
    id_key_map: IdKeyMap,
}

impl StatsEngine {
    /// Load configuration and id tables through `loader`.
    ///
    /// # Errors
    ///
    /// Returns an error if either piece of reference data fails to load.
    pub fn load<L: DataLoader>(loader: &L) -> Result<Self, L::Error> {
        Ok(Self {
            config: loader.load_config("config")?,
            id_key_map: loader.load_id_key_map()?,
        })
    }

    #[must_use]
    pub const fn new(config: StatsConfig, id_key_map: IdKeyMap) -> Self {
        Self { config, id_key_map }
    }

    #[must_use]
    pub const fn config(&self) -> &StatsConfig {
        &self.config
    }

    #[must_use]
    pub const fn id_key_map(&self) -> &IdKeyMap {
        &self.id_key_map
    }

    /// Parse, validate and derive one match-result document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn derive_json(&self, json: &str) -> Result<ExtendedResult, ResultError> {
        RawMatchResult::from_json(json).map(derive)
    }

    /// Asset URL for an id under this engine's base URL.
    #[must_use]
    pub fn icon_url(&self, category: IdCategory, id: impl std::fmt::Display) -> String {
        icon_url(&self.config.asset_base_url, category.as_str(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_id_key_map(&self) -> Result<IdKeyMap, Self::Error> {
            Ok(IdKeyMap::empty())
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: serde::de::DeserializeOwned,
        {
            let parsed = serde_json::from_str(r#"{ "asset_base_url": "http://fixture" }"#).unwrap();
            Ok(parsed)
        }
    }

    #[test]
    fn engine_loads_through_any_loader() {
        let engine = StatsEngine::load(&FixtureLoader).unwrap();
        assert_eq!(engine.config().asset_base_url, "http://fixture");
        assert_eq!(engine.id_key_map(), &IdKeyMap::empty());
        assert_eq!(
            engine.icon_url(IdCategory::Boss, 3),
            "http://fixture/boss/3.png"
        );
    }

    #[test]
    fn static_loader_serves_bundled_assets() {
        let engine = StatsEngine::load(&StaticLoader).unwrap();
        assert_eq!(engine.config(), &StatsConfig::default());
        assert_eq!(
            engine.id_key_map().translation_key(IdCategory::Boss, 15).as_deref(),
            Some("boss.maws")
        );
        let tables: IdKeyMap = StaticLoader.load_config("id_key_map").unwrap();
        assert_eq!(&tables, engine.id_key_map());
    }

    #[test]
    fn static_loader_rejects_unbundled_names() {
        let err = StaticLoader.load_config::<StatsConfig>("confg").unwrap_err();
        assert!(matches!(err, ReferenceDataError::Unknown(name) if name == "confg"));
    }

    #[test]
    fn engine_derives_documents() {
        let engine = StatsEngine::new(StatsConfig::default(), IdKeyMap::default());
        let result = engine
            .derive_json(r#"{ "schedule_id": "2022050107", "player_results": [{ "player_id": "a", "golden_eggs": 3 }] }"#)
            .unwrap();
        assert!(result.has_most(Stat::GoldenEggs, 3));
        assert!(engine.derive_json("{}").is_err());
    }
}
