//! Result derivation: raw match result → display-ready [`ExtendedResult`].
//!
//! The derived value is immutable. Highest markers are computed once at build
//! time; boss totals are reduced on demand from the player rows.
use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::BOSS_IDS;
use crate::format::{format_schedule_id, parse_utc_timestamp, time_difference};
use crate::ids::is_max_hazard;
use crate::normalize::{UserProfile, parse_raw_user, parse_schedule_id};
use crate::numbers::{ratio, sum, trunc_f64_to_i32};
use crate::result::{BossId, PlayerId, RawMatchResult, RawPlayerResult, RawWave};

/// Per-player statistics compared across the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    GoldenEggs,
    PowerEggs,
    Rescues,
    Deaths,
    BossEliminations,
}

impl Stat {
    pub const ALL: [Stat; 5] = [
        Stat::GoldenEggs,
        Stat::PowerEggs,
        Stat::Rescues,
        Stat::Deaths,
        Stat::BossEliminations,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Stat::GoldenEggs => "golden_eggs",
            Stat::PowerEggs => "power_eggs",
            Stat::Rescues => "rescues",
            Stat::Deaths => "deaths",
            Stat::BossEliminations => "boss_eliminations",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (special id, count) pair for one player in one wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialUsage {
    pub special_id: u32,
    pub count: u32,
}

/// One derived player row. Input order is seat order and is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player_id: PlayerId,
    pub name: Option<String>,
    pub weapon_id: i32,
    pub special_id: u32,
    pub special_uses: Vec<SpecialUsage>,
    pub boss_eliminations: BTreeMap<BossId, u32>,
    pub death: u32,
    pub golden_eggs: u32,
    pub power_eggs: u32,
    pub rescue: u32,
}

impl PlayerResult {
    fn from_raw(raw: RawPlayerResult) -> Self {
        let special_id = raw.special_id;
        Self {
            special_uses: raw
                .special_uses
                .into_iter()
                .map(|usage| SpecialUsage {
                    special_id: usage.id.unwrap_or(special_id),
                    count: usage.count,
                })
                .collect(),
            player_id: raw.player_id,
            name: raw.name,
            weapon_id: raw.weapon_id,
            special_id,
            boss_eliminations: raw.boss_eliminations.counts,
            death: raw.death,
            golden_eggs: raw.golden_eggs,
            power_eggs: raw.power_eggs,
            rescue: raw.rescue,
        }
    }

    /// Eliminations of one boss category; absent categories count as zero.
    #[must_use]
    pub fn eliminations_of(&self, boss: BossId) -> u32 {
        self.boss_eliminations.get(&boss).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn boss_elimination_count(&self) -> u32 {
        sum(self.boss_eliminations.values().copied())
    }

    #[must_use]
    pub fn stat(&self, stat: Stat) -> u32 {
        match stat {
            Stat::GoldenEggs => self.golden_eggs,
            Stat::PowerEggs => self.power_eggs,
            Stat::Rescues => self.rescue,
            Stat::Deaths => self.death,
            Stat::BossEliminations => self.boss_elimination_count(),
        }
    }

    /// Special usage for a 1-indexed wave; unrecorded waves read as zero.
    #[must_use]
    pub fn special_usage_in_wave(&self, wave: usize) -> SpecialUsage {
        wave.checked_sub(1)
            .and_then(|idx| self.special_uses.get(idx))
            .copied()
            .unwrap_or(SpecialUsage {
                special_id: self.special_id,
                count: 0,
            })
    }
}

/// Maximum of every statistic across the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highest {
    pub stats: BTreeMap<Stat, u32>,
    pub boss_eliminations: BTreeMap<BossId, u32>,
}

impl Highest {
    fn from_players(players: &[PlayerResult], boss_ids: impl IntoIterator<Item = BossId>) -> Self {
        let stats = Stat::ALL
            .iter()
            .map(|&stat| {
                let max = players.iter().map(|p| p.stat(stat)).max().unwrap_or(0);
                (stat, max)
            })
            .collect();
        let boss_eliminations = boss_ids
            .into_iter()
            .map(|boss| {
                let max = players
                    .iter()
                    .map(|p| p.eliminations_of(boss))
                    .max()
                    .unwrap_or(0);
                (boss, max)
            })
            .collect();
        Self {
            stats,
            boss_eliminations,
        }
    }

    #[must_use]
    pub fn of(&self, stat: Stat) -> u32 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    /// The maximum for `stat`, or `None` when nobody scored above zero.
    #[must_use]
    pub fn winner(&self, stat: Stat) -> Option<u32> {
        Some(self.of(stat)).filter(|max| *max > 0)
    }

    #[must_use]
    pub fn of_boss(&self, boss: BossId) -> u32 {
        self.boss_eliminations.get(&boss).copied().unwrap_or(0)
    }
}

/// Per-wave summary carried through from the raw result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveResult {
    pub event_id: u32,
    pub water_id: u32,
    pub golden_egg_quota: u32,
    pub golden_egg_appearances: u32,
    pub golden_egg_delivered: u32,
    pub power_egg_collected: u32,
}

impl From<RawWave> for WaveResult {
    fn from(raw: RawWave) -> Self {
        Self {
            event_id: raw.event_id,
            water_id: raw.water_id,
            golden_egg_quota: raw.golden_egg_quota,
            golden_egg_appearances: raw.golden_egg_appearances,
            golden_egg_delivered: raw.golden_egg_delivered,
            power_egg_collected: raw.power_egg_collected,
        }
    }
}

impl WaveResult {
    #[must_use]
    pub const fn quota_met(&self) -> bool {
        self.golden_egg_delivered >= self.golden_egg_quota
    }
}

/// Display-ready aggregate of one match result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedResult {
    id: Option<u64>,
    schedule_id: String,
    start_at: Option<i64>,
    end_at: Option<i64>,
    clear_waves: u8,
    danger_rate: Option<f64>,
    fail_reason_id: Option<u32>,
    player_results: Vec<PlayerResult>,
    boss_appearances: BTreeMap<BossId, u32>,
    waves: Vec<WaveResult>,
    highest: Highest,
    member_accounts: Vec<UserProfile>,
}

/// Build the extended result for one raw match result.
#[must_use]
pub fn derive(raw: RawMatchResult) -> ExtendedResult {
    let player_results: Vec<PlayerResult> = raw
        .player_results
        .into_iter()
        .map(PlayerResult::from_raw)
        .collect();

    let mut boss_ids: Vec<BossId> = raw.boss_appearances.keys().copied().collect();
    boss_ids.extend(
        player_results
            .iter()
            .flat_map(|p| p.boss_eliminations.keys().copied()),
    );
    boss_ids.sort_unstable();
    boss_ids.dedup();

    let highest = Highest::from_players(&player_results, boss_ids);
    let member_accounts: Vec<UserProfile> = raw
        .member_accounts
        .into_iter()
        .flatten()
        .map(parse_raw_user)
        .collect();

    log::debug!(
        "derived result {:?}: {} players, {} accounts, {} boss categories",
        raw.id,
        player_results.len(),
        member_accounts.len(),
        highest.boss_eliminations.len()
    );

    ExtendedResult {
        id: raw.id,
        schedule_id: raw.schedule_id,
        start_at: raw.start_at,
        end_at: raw.end_at,
        clear_waves: raw.clear_waves,
        danger_rate: raw.danger_rate,
        fail_reason_id: raw.fail_reason_id,
        player_results,
        boss_appearances: raw.boss_appearances,
        waves: raw.waves.into_iter().map(WaveResult::from).collect(),
        highest,
        member_accounts,
    }
}

impl ExtendedResult {
    #[must_use]
    pub const fn id(&self) -> Option<u64> {
        self.id
    }

    #[must_use]
    pub fn schedule_id(&self) -> &str {
        &self.schedule_id
    }

    /// The schedule id as a canonical `YYYYMMDDHH` key, whether the raw
    /// document carried the key itself or the rotation start timestamp.
    #[must_use]
    pub fn canonical_schedule_id(&self) -> Option<String> {
        if parse_schedule_id(&self.schedule_id).is_ok() {
            return Some(self.schedule_id.clone());
        }
        parse_utc_timestamp(&self.schedule_id)
            .ok()
            .map(|start| format_schedule_id(&start))
    }

    #[must_use]
    pub const fn clear_waves(&self) -> u8 {
        self.clear_waves
    }

    #[must_use]
    pub const fn danger_rate(&self) -> Option<f64> {
        self.danger_rate
    }

    /// Hazard level truncated to a whole percent equals the 200% cap.
    #[must_use]
    pub fn is_max_hazard(&self) -> bool {
        self.danger_rate
            .and_then(|rate| u32::try_from(trunc_f64_to_i32(rate)).ok())
            .is_some_and(is_max_hazard)
    }

    #[must_use]
    pub const fn fail_reason_id(&self) -> Option<u32> {
        self.fail_reason_id
    }

    /// Epoch seconds.
    #[must_use]
    pub const fn start_at(&self) -> Option<i64> {
        self.start_at
    }

    #[must_use]
    pub const fn end_at(&self) -> Option<i64> {
        self.end_at
    }

    #[must_use]
    pub fn player_results(&self) -> &[PlayerResult] {
        &self.player_results
    }

    #[must_use]
    pub const fn boss_appearances(&self) -> &BTreeMap<BossId, u32> {
        &self.boss_appearances
    }

    #[must_use]
    pub fn waves(&self) -> &[WaveResult] {
        &self.waves
    }

    #[must_use]
    pub const fn highest(&self) -> &Highest {
        &self.highest
    }

    #[must_use]
    pub fn member_accounts(&self) -> &[UserProfile] {
        &self.member_accounts
    }

    /// Whether `value` is the roster maximum for `stat`. Zero never is.
    #[must_use]
    pub fn has_most(&self, stat: Stat, value: u32) -> bool {
        self.highest.winner(stat) == Some(value)
    }

    /// Whether `value` is the roster maximum of eliminations for `boss`.
    #[must_use]
    pub fn has_most_boss_eliminations(&self, boss: BossId, value: u32) -> bool {
        value != 0 && self.highest.of_boss(boss) == value
    }

    #[must_use]
    pub fn least_deaths(&self) -> Option<u32> {
        self.player_results.iter().map(|p| p.death).min()
    }

    /// Every player tied for the fewest deaths qualifies.
    #[must_use]
    pub fn has_least_deaths(&self, value: u32) -> bool {
        self.least_deaths() == Some(value)
    }

    #[must_use]
    pub fn total_boss_elimination(&self, boss: BossId) -> u32 {
        sum(self.player_results.iter().map(|p| p.eliminations_of(boss)))
    }

    #[must_use]
    pub fn total_boss_spawn(&self, boss: BossId) -> u32 {
        self.boss_appearances.get(&boss).copied().unwrap_or(0)
    }

    /// Share of spawned bosses of a category that were eliminated; `None`
    /// when the category never spawned.
    #[must_use]
    pub fn boss_elimination_rate(&self, boss: BossId) -> Option<f64> {
        ratio(self.total_boss_elimination(boss), self.total_boss_spawn(boss))
    }

    /// Boss categories that spawned at least once, in canonical order.
    #[must_use]
    pub fn appeared_boss_ids(&self) -> Vec<BossId> {
        BOSS_IDS
            .into_iter()
            .filter(|&boss| self.total_boss_spawn(boss) > 0)
            .collect()
    }

    /// One entry per player, in seat order, for a 1-indexed wave.
    #[must_use]
    pub fn specials_used_in_wave(&self, wave: usize) -> SmallVec<[SpecialUsage; 4]> {
        self.player_results
            .iter()
            .map(|p| p.special_usage_in_wave(wave))
            .collect()
    }

    #[must_use]
    pub fn account(&self, player_id: &str) -> Option<&UserProfile> {
        self.member_accounts
            .iter()
            .find(|member| member.player_id == player_id)
    }

    #[must_use]
    pub fn is_registered(&self, player_id: &str) -> bool {
        self.account(player_id).is_some()
    }

    #[must_use]
    pub fn avatar(&self, player_id: &str) -> Option<&str> {
        self.account(player_id).and_then(|member| member.avatar.as_deref())
    }

    /// Match length as `HH:MM:SS` when both epoch bounds are known.
    #[must_use]
    pub fn duration(&self) -> Option<String> {
        let start = DateTime::from_timestamp(self.start_at?, 0)?;
        let end = DateTime::from_timestamp(self.end_at?, 0)?;
        Some(time_difference(&end, &start))
    }
}
