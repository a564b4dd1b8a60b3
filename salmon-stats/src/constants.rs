//! Fixed values shared by the derivation engine and the formatters.
//!
//! Boss ordering, metric thresholds and date patterns are part of the display
//! contract, so they live in code rather than in the JSON assets.

use crate::result::BossId;

// Boss categories ----------------------------------------------------------
/// Canonical display order of every known boss category.
pub const BOSS_IDS: [BossId; 9] = [
    BossId::GOLDIE,
    BossId::STEELHEAD,
    BossId::FLYFISH,
    BossId::SCRAPPER,
    BossId::STEEL_EEL,
    BossId::STINGER,
    BossId::MAWS,
    BossId::GRILLER,
    BossId::DRIZZLER,
];

// Weapons and hazard -------------------------------------------------------
pub const GRIZZCO_WEAPON_MIN_ID: i32 = 20_000;
pub const MAX_HAZARD_LEVEL: u32 = 200;

// Formatting ---------------------------------------------------------------
pub const DEFAULT_PERCENTAGE_DIGITS: usize = 2;
pub const METRIC_MEGA_THRESHOLD: u64 = 10_000_000;
pub const METRIC_MEGA_BASE: f64 = 10_000_000.0;
pub const METRIC_KILO_THRESHOLD: u64 = 100_000;
pub const METRIC_KILO_BASE: f64 = 10_000.0;

pub const FULL_DATE_PATTERN: &str = "%Y-%m-%d %H:%M";
pub const COMPACT_DATE_PATTERN: &str = "%m-%d %H:%M";
pub const EPOCH_DATE_PATTERN: &str = "%Y-%m-%d %H:%M:%S";
pub const SCHEDULE_ID_PATTERN: &str = "%Y%m%d%H";

/// Naive text layouts accepted for UTC timestamps besides RFC 3339.
pub(crate) const NAIVE_TIMESTAMP_LAYOUTS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

// Assets -------------------------------------------------------------------
pub const ASSET_EXTENSION: &str = "png";
