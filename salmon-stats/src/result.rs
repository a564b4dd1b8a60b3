//! Boundary types for raw match results and their validation.
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::constants::BOSS_IDS;
use crate::normalize::RawUser;
use crate::numbers::sum;

pub type PlayerId = String;

/// Boss category id as used by the results API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BossId(pub u16);

impl BossId {
    pub const GOLDIE: Self = Self(3);
    pub const STEELHEAD: Self = Self(6);
    pub const FLYFISH: Self = Self(9);
    pub const SCRAPPER: Self = Self(12);
    pub const STEEL_EEL: Self = Self(13);
    pub const STINGER: Self = Self(14);
    pub const MAWS: Self = Self(15);
    pub const GRILLER: Self = Self(16);
    pub const DRIZZLER: Self = Self(21);

    #[must_use]
    pub fn is_known(self) -> bool {
        BOSS_IDS.contains(&self)
    }
}

impl fmt::Display for BossId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while reading a match result at the system boundary.
#[derive(Debug, Error)]
pub enum ResultError {
    #[error("malformed match result: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("match result has no players")]
    EmptyRoster,
    #[error("player {0} appears more than once")]
    DuplicatePlayer(PlayerId),
    #[error("unknown boss category {0}")]
    UnknownBoss(BossId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSpecialUse {
    /// Special used this wave; absent when the API only reports the player's
    /// special once.
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBossEliminations {
    #[serde(default)]
    pub counts: BTreeMap<BossId, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlayerResult {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "main_weapon_id")]
    pub weapon_id: i32,
    #[serde(default)]
    pub special_id: u32,
    #[serde(default)]
    pub special_uses: Vec<RawSpecialUse>,
    #[serde(default)]
    pub boss_eliminations: RawBossEliminations,
    #[serde(default)]
    pub death: u32,
    #[serde(default)]
    pub golden_eggs: u32,
    #[serde(default)]
    pub power_eggs: u32,
    #[serde(default)]
    pub rescue: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWave {
    #[serde(default)]
    pub event_id: u32,
    #[serde(default)]
    pub water_id: u32,
    #[serde(default)]
    pub golden_egg_quota: u32,
    #[serde(default)]
    pub golden_egg_appearances: u32,
    #[serde(default)]
    pub golden_egg_delivered: u32,
    #[serde(default)]
    pub power_egg_collected: u32,
}

/// One match result as delivered by the API, before derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatchResult {
    #[serde(default)]
    pub id: Option<u64>,
    pub schedule_id: String,
    /// Epoch seconds.
    #[serde(default)]
    pub start_at: Option<i64>,
    /// Epoch seconds.
    #[serde(default)]
    pub end_at: Option<i64>,
    #[serde(default)]
    pub clear_waves: u8,
    #[serde(default, deserialize_with = "loose_f64")]
    pub danger_rate: Option<f64>,
    #[serde(default)]
    pub fail_reason_id: Option<u32>,
    pub player_results: Vec<RawPlayerResult>,
    #[serde(default)]
    pub boss_appearances: BTreeMap<BossId, u32>,
    #[serde(default)]
    pub waves: Vec<RawWave>,
    #[serde(default)]
    pub member_accounts: Vec<Option<RawUser>>,
}

impl RawMatchResult {
    /// Parse and validate a match result document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the raw shape or fails
    /// [`RawMatchResult::validate`].
    pub fn from_json(json: &str) -> Result<Self, ResultError> {
        let raw: Self = serde_json::from_str(json)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Structural checks the derivation engine relies on.
    ///
    /// Kill counts above the spawn count are suspicious but allowed; they are
    /// only logged.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty roster, repeated player ids or boss
    /// categories outside the known set.
    pub fn validate(&self) -> Result<(), ResultError> {
        if self.player_results.is_empty() {
            return Err(ResultError::EmptyRoster);
        }

        let mut seen = HashSet::new();
        for player in &self.player_results {
            if !seen.insert(player.player_id.as_str()) {
                return Err(ResultError::DuplicatePlayer(player.player_id.clone()));
            }
        }

        let boss_ids = self.boss_appearances.keys().chain(
            self.player_results
                .iter()
                .flat_map(|p| p.boss_eliminations.counts.keys()),
        );
        for &boss in boss_ids {
            if !boss.is_known() {
                return Err(ResultError::UnknownBoss(boss));
            }
        }

        for (&boss, &spawned) in &self.boss_appearances {
            let killed = sum(
                self.player_results
                    .iter()
                    .map(|p| p.boss_eliminations.counts.get(&boss).copied().unwrap_or(0)),
            );
            if killed > spawned {
                log::warn!(
                    "result {:?}: boss {boss} eliminated {killed} times but spawned {spawned}",
                    self.id
                );
            }
        }

        Ok(())
    }
}

/// Accept a number, a numeric string or null.
fn loose_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
    }

    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Number(value)) => Ok(Some(value)),
        Some(Loose::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
