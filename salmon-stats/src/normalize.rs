//! Raw schedule and user payloads normalized into typed records.
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::format::{DateInput, FormatError, format_schedule_id};
use crate::numbers::integral_f64_to_i64;

static SCHEDULE_ID_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})(\d{2})$").ok());

/// Errors raised while normalizing raw schedules and users.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid schedule timestamp: {0}")]
    Timestamp(#[from] FormatError),
    #[error("invalid schedule id {0:?}, expected YYYYMMDDHH")]
    ScheduleId(String),
}

/// Timestamp as the API sends it: epoch milliseconds or text in UTC.
///
/// Milliseconds may arrive as a whole-valued float. Text is any layout
/// [`DateInput::Text`] accepts, or a canonical `YYYYMMDDHH` schedule id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(#[serde(deserialize_with = "whole_millis")] i64),
    Text(String),
}

fn whole_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(millis) => Ok(millis),
        Number::Float(value) => integral_f64_to_i64(value).ok_or_else(|| {
            serde::de::Error::custom(format!("{value} is not a whole number of milliseconds"))
        }),
    }
}

impl RawTimestamp {
    /// # Errors
    ///
    /// Returns an error if the value does not describe a representable instant.
    pub fn to_utc(&self) -> Result<DateTime<Utc>, FormatError> {
        match self {
            RawTimestamp::Millis(millis) => DateInput::UnixMillis(*millis).to_utc(),
            RawTimestamp::Text(text) => DateInput::Text(text.clone())
                .to_utc()
                .or_else(|err| parse_schedule_id(text).map_err(|_| err)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSchedule {
    /// Rotation start; the API names it after the schedule id.
    pub schedule_id: RawTimestamp,
    #[serde(default)]
    pub end_at: Option<RawTimestamp>,
    #[serde(default)]
    pub weapons: Vec<i32>,
    #[serde(default)]
    pub stage_id: Option<u32>,
    #[serde(default)]
    pub rare_weapon_id: Option<i32>,
}

impl RawSchedule {
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the raw schedule shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A Salmon Run rotation keyed by its canonical `YYYYMMDDHH` id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub weapons: Vec<i32>,
    pub stage_id: Option<u32>,
    pub rare_weapon_id: Option<i32>,
}

/// Normalize a raw schedule, deriving the schedule id from the start instant.
///
/// # Errors
///
/// Returns an error if either timestamp cannot be resolved.
pub fn parse_raw_schedule(raw: RawSchedule) -> Result<Schedule, NormalizeError> {
    let start_at = raw.schedule_id.to_utc()?;
    let end_at = raw.end_at.as_ref().map(RawTimestamp::to_utc).transpose()?;
    Ok(Schedule {
        schedule_id: format_schedule_id(&start_at),
        start_at,
        end_at,
        weapons: raw.weapons,
        stage_id: raw.stage_id,
        rare_weapon_id: raw.rare_weapon_id,
    })
}

/// Start instant encoded by a canonical `YYYYMMDDHH` schedule id.
///
/// # Errors
///
/// Returns [`NormalizeError::ScheduleId`] for anything but ten digits naming a
/// valid UTC hour.
pub fn parse_schedule_id(schedule_id: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let invalid = || NormalizeError::ScheduleId(schedule_id.to_string());
    let caps = SCHEDULE_ID_RE
        .as_ref()
        .and_then(|re| re.captures(schedule_id))
        .ok_or_else(invalid)?;
    let field = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok());
    let (Some(year), Some(month), Some(day), Some(hour)) = (field(1), field(2), field(3), field(4))
    else {
        return Err(invalid());
    };
    let year = i32::try_from(year).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(invalid)
}

/// User profile as the API sends it. Flags are loosely typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    pub player_id: String,
    #[serde(default)]
    pub is_registered: Value,
    #[serde(default)]
    pub created_at: Value,
    #[serde(default)]
    pub is_custom_name: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub twitter_avatar: Option<String>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub results: Option<Value>,
}

impl RawUser {
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the raw user shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub is_registered: bool,
    pub is_custom_name: bool,
    pub player_id: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    /// Lifetime totals, passed through opaque.
    pub total: Option<Value>,
    /// Recent results, passed through opaque.
    pub results: Option<Value>,
}

/// Normalize a raw user. Either an explicit registration flag or a creation
/// timestamp marks the user as registered.
#[must_use]
pub fn parse_raw_user(raw: RawUser) -> UserProfile {
    UserProfile {
        is_registered: truthy(&raw.is_registered) || truthy(&raw.created_at),
        is_custom_name: truthy(&raw.is_custom_name),
        player_id: raw.player_id,
        name: raw.name,
        avatar: raw.twitter_avatar,
        total: raw.total,
        results: raw.results,
    }
}

/// Loose JSON truthiness: `null`, `false`, `0` and `""` are false.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
