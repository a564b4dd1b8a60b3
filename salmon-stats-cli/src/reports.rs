use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

use salmon_stats::format::{DateInput, FormatError, convert_epoch_in_tz, format_date_in_tz};
use salmon_stats::{
    BossId, Catalog, ExtendedResult, IdCategory, PlayerResult, Schedule, Stat, StatsEngine,
    UserProfile, is_grizzco_weapon, percentage, use_metric_prefix,
};

/// Zone report timestamps are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Local,
    Utc,
}

impl Zone {
    fn format(self, input: &DateInput, pattern: &str) -> Result<String, FormatError> {
        match self {
            Self::Local => format_date_in_tz(input, pattern, &chrono::Local),
            Self::Utc => format_date_in_tz(input, pattern, &chrono::Utc),
        }
    }

    fn epoch(self, seconds: i64) -> Result<String, FormatError> {
        match self {
            Self::Local => convert_epoch_in_tz(seconds, &chrono::Local),
            Self::Utc => convert_epoch_in_tz(seconds, &chrono::Utc),
        }
    }
}

/// Reference data and display settings shared by every report builder.
pub struct ReportContext<'a> {
    pub engine: &'a StatsEngine,
    pub catalog: &'a Catalog,
    pub zone: Zone,
}

impl<'a> ReportContext<'a> {
    pub const fn new(engine: &'a StatsEngine, catalog: &'a Catalog, zone: Zone) -> Self {
        Self {
            engine,
            catalog,
            zone,
        }
    }

    /// Translated label for an id, or the id itself when it is not mapped.
    fn label(&self, category: IdCategory, id: impl std::fmt::Display + Copy) -> String {
        self.engine
            .id_key_map()
            .translate(self.catalog, category, id)
            .unwrap_or_else(|| id.to_string())
    }

    fn full_date(&self, input: &DateInput) -> Option<String> {
        self.date(input, &self.engine.config().full_date_pattern)
    }

    fn compact_date(&self, input: &DateInput) -> Option<String> {
        self.date(input, &self.engine.config().compact_date_pattern)
    }

    fn date(&self, input: &DateInput, pattern: &str) -> Option<String> {
        self.zone
            .format(input, pattern)
            .map_err(|err| log::warn!("date not rendered: {err}"))
            .ok()
    }
}

/// Report views renderable as console text, markdown or JSON.
pub trait Report: Serialize {
    fn write_console(&self, out: &mut dyn Write, catalog: &Catalog) -> io::Result<()>;
    fn write_markdown(&self, out: &mut dyn Write, catalog: &Catalog) -> io::Result<()>;
}

pub fn generate_json_report<R: Report>(out: &mut dyn Write, report: &R) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_console_report<R: Report>(
    out: &mut dyn Write,
    report: &R,
    catalog: &Catalog,
) -> Result<()> {
    report.write_console(out, catalog)?;
    Ok(())
}

pub fn generate_markdown_report<R: Report>(
    out: &mut dyn Write,
    report: &R,
    catalog: &Catalog,
) -> Result<()> {
    report.write_markdown(out, catalog)?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct StatCell {
    pub stat: Stat,
    pub value: u32,
    pub display: String,
    /// Roster best: the highest value, or the fewest deaths.
    pub highlight: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerRow {
    pub player_id: String,
    pub name: String,
    pub registered: bool,
    pub avatar: Option<String>,
    pub weapon: String,
    pub weapon_icon: String,
    pub special: String,
    pub stats: Vec<StatCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossRow {
    pub boss_id: BossId,
    pub name: String,
    pub icon: String,
    pub spawned: u32,
    pub eliminated: u32,
    pub rate: Option<String>,
    /// Players holding the per-boss highest.
    pub leaders: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecialCell {
    pub player: String,
    pub special: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaveRow {
    pub wave: usize,
    pub event: String,
    pub water_level: String,
    pub quota: u32,
    pub delivered: u32,
    pub appearances: u32,
    pub power_eggs: u32,
    pub quota_met: bool,
    pub specials: Vec<SpecialCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultReport {
    pub id: Option<u64>,
    pub schedule_id: String,
    pub started: Option<String>,
    pub duration: Option<String>,
    pub clear_waves: u8,
    pub hazard: Option<String>,
    pub max_hazard: bool,
    pub fail_reason: Option<String>,
    pub players: Vec<PlayerRow>,
    pub bosses: Vec<BossRow>,
    pub waves: Vec<WaveRow>,
}

/// Account name, then in-game name, then the raw player id.
pub fn display_name(result: &ExtendedResult, player: &PlayerResult) -> String {
    result
        .account(&player.player_id)
        .and_then(|member| member.name.clone())
        .or_else(|| player.name.clone())
        .unwrap_or_else(|| player.player_id.clone())
}

impl ResultReport {
    pub fn build(result: &ExtendedResult, ctx: &ReportContext<'_>) -> Self {
        let config = ctx.engine.config();
        let names: Vec<String> = result
            .player_results()
            .iter()
            .map(|player| display_name(result, player))
            .collect();

        let players = result
            .player_results()
            .iter()
            .zip(&names)
            .map(|(player, name)| PlayerRow {
                player_id: player.player_id.clone(),
                name: name.clone(),
                registered: result.is_registered(&player.player_id),
                avatar: result.avatar(&player.player_id).map(ToString::to_string),
                weapon: ctx.label(IdCategory::Weapon, player.weapon_id),
                weapon_icon: ctx.engine.icon_url(IdCategory::Weapon, player.weapon_id),
                special: ctx.label(IdCategory::Special, player.special_id),
                stats: Stat::ALL
                    .into_iter()
                    .map(|stat| {
                        let value = player.stat(stat);
                        let display = match stat {
                            Stat::PowerEggs => {
                                use_metric_prefix(u64::from(value), config.metric_digits)
                                    .to_string()
                            }
                            _ => value.to_string(),
                        };
                        let highlight = match stat {
                            Stat::Deaths => result.has_least_deaths(value),
                            _ => result.has_most(stat, value),
                        };
                        StatCell {
                            stat,
                            value,
                            display,
                            highlight,
                        }
                    })
                    .collect(),
            })
            .collect();

        let bosses = result
            .appeared_boss_ids()
            .into_iter()
            .map(|boss| BossRow {
                boss_id: boss,
                name: ctx.label(IdCategory::Boss, boss),
                icon: ctx.engine.icon_url(IdCategory::Boss, boss),
                spawned: result.total_boss_spawn(boss),
                eliminated: result.total_boss_elimination(boss),
                rate: result
                    .boss_elimination_rate(boss)
                    .map(|rate| percentage(rate, config.percentage_digits)),
                leaders: result
                    .player_results()
                    .iter()
                    .zip(&names)
                    .filter(|(player, _)| {
                        result.has_most_boss_eliminations(boss, player.eliminations_of(boss))
                    })
                    .map(|(_, name)| name.clone())
                    .collect(),
            })
            .collect();

        let waves = result
            .waves()
            .iter()
            .enumerate()
            .map(|(index, wave)| {
                let number = index + 1;
                WaveRow {
                    wave: number,
                    event: ctx.label(IdCategory::Event, wave.event_id),
                    water_level: ctx.label(IdCategory::WaterLevel, wave.water_id),
                    quota: wave.golden_egg_quota,
                    delivered: wave.golden_egg_delivered,
                    appearances: wave.golden_egg_appearances,
                    power_eggs: wave.power_egg_collected,
                    quota_met: wave.quota_met(),
                    specials: result
                        .specials_used_in_wave(number)
                        .iter()
                        .zip(&names)
                        .map(|(usage, name)| SpecialCell {
                            player: name.clone(),
                            special: ctx.label(IdCategory::Special, usage.special_id),
                            count: usage.count,
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            id: result.id(),
            schedule_id: result
                .canonical_schedule_id()
                .unwrap_or_else(|| result.schedule_id().to_string()),
            started: result.start_at().and_then(|seconds| {
                chrono::DateTime::from_timestamp(seconds, 0)
                    .and_then(|start| ctx.full_date(&DateInput::Utc(start)))
            }),
            duration: result.duration(),
            clear_waves: result.clear_waves(),
            hazard: result
                .danger_rate()
                .map(|rate| percentage(rate / 100.0, config.percentage_digits)),
            max_hazard: result.is_max_hazard(),
            fail_reason: result
                .fail_reason_id()
                .map(|id| ctx.label(IdCategory::FailReason, id)),
            players,
            bosses,
            waves,
        }
    }

    fn specials_summary(wave: &WaveRow) -> String {
        wave.specials
            .iter()
            .map(|cell| format!("{} {} x{}", cell.player, cell.special, cell.count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Report for ResultReport {
    fn write_console(&self, out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
        writeln!(out, "{}", catalog.t("report.title").bright_cyan().bold())?;
        writeln!(out, "{}", "==================".cyan())?;
        writeln!(out, "{}: {}", catalog.t("report.schedule"), self.schedule_id)?;
        if let Some(started) = &self.started {
            writeln!(out, "{}: {started}", catalog.t("report.started"))?;
        }
        if let Some(duration) = &self.duration {
            writeln!(out, "{}: {duration}", catalog.t("report.duration"))?;
        }
        if let Some(hazard) = &self.hazard {
            let hazard = if self.max_hazard {
                hazard.red().bold().to_string()
            } else {
                hazard.clone()
            };
            writeln!(out, "{}: {hazard}", catalog.t("report.hazard"))?;
        }
        writeln!(out, "{}: {}", catalog.t("report.clear_waves"), self.clear_waves)?;
        if let Some(reason) = &self.fail_reason {
            writeln!(out, "{}: {}", catalog.t("report.fail_reason"), reason.red())?;
        }
        writeln!(out)?;

        writeln!(out, "{}", catalog.t("report.players").bright_yellow().bold())?;
        for player in &self.players {
            let name = if player.registered {
                player.name.bold().to_string()
            } else {
                format!(
                    "{} ({})",
                    player.name.bold(),
                    catalog.t("report.unregistered").dimmed()
                )
            };
            writeln!(out, "  {name} - {} / {}", player.weapon, player.special)?;
            for cell in &player.stats {
                let value = if cell.highlight {
                    cell.display.yellow().bold().to_string()
                } else {
                    cell.display.clone()
                };
                writeln!(out, "    {:20} {value}", catalog.t(&format!("stat.{}", cell.stat)))?;
            }
        }
        writeln!(out)?;

        writeln!(out, "{}", catalog.t("report.bosses").bright_yellow().bold())?;
        for boss in &self.bosses {
            writeln!(
                out,
                "  {:12} {}/{} ({}) {}",
                boss.name,
                boss.eliminated,
                boss.spawned,
                boss.rate.as_deref().unwrap_or("-"),
                boss.leaders.join(", ").green()
            )?;
        }
        writeln!(out)?;

        writeln!(out, "{}", catalog.t("report.waves").bright_yellow().bold())?;
        for wave in &self.waves {
            let delivered = format!("{}/{}", wave.delivered, wave.quota);
            let delivered = if wave.quota_met {
                delivered.green()
            } else {
                delivered.red()
            };
            writeln!(
                out,
                "  {} {}: {delivered} {} / {}",
                catalog.t("report.wave"),
                wave.wave,
                wave.event,
                wave.water_level
            )?;
            writeln!(
                out,
                "    {}: {}",
                catalog.t("report.specials"),
                Self::specials_summary(wave)
            )?;
        }
        Ok(())
    }

    fn write_markdown(&self, out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
        writeln!(out, "# {}\n", catalog.t("report.title"))?;
        writeln!(out, "- **{}**: {}", catalog.t("report.schedule"), self.schedule_id)?;
        if let Some(started) = &self.started {
            writeln!(out, "- **{}**: {started}", catalog.t("report.started"))?;
        }
        if let Some(duration) = &self.duration {
            writeln!(out, "- **{}**: {duration}", catalog.t("report.duration"))?;
        }
        if let Some(hazard) = &self.hazard {
            writeln!(out, "- **{}**: {hazard}", catalog.t("report.hazard"))?;
        }
        writeln!(
            out,
            "- **{}**: {}",
            catalog.t("report.clear_waves"),
            self.clear_waves
        )?;
        if let Some(reason) = &self.fail_reason {
            writeln!(out, "- **{}**: {reason}", catalog.t("report.fail_reason"))?;
        }

        writeln!(out, "\n## {}\n", catalog.t("report.players"))?;
        let stat_headers: Vec<String> = Stat::ALL
            .iter()
            .map(|stat| catalog.t(&format!("stat.{stat}")))
            .collect();
        writeln!(
            out,
            "| {} | {} | {} |",
            catalog.t("report.player"),
            catalog.t("report.weapon"),
            stat_headers.join(" | ")
        )?;
        writeln!(out, "|{}", " --- |".repeat(stat_headers.len() + 2))?;
        for player in &self.players {
            let cells: Vec<String> = player
                .stats
                .iter()
                .map(|cell| {
                    if cell.highlight {
                        format!("**{}**", cell.display)
                    } else {
                        cell.display.clone()
                    }
                })
                .collect();
            writeln!(
                out,
                "| {} | {} | {} |",
                player.name,
                player.weapon,
                cells.join(" | ")
            )?;
        }

        writeln!(out, "\n## {}\n", catalog.t("report.bosses"))?;
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            catalog.t("report.boss"),
            catalog.t("report.spawned"),
            catalog.t("report.eliminated"),
            catalog.t("report.rate"),
            catalog.t("report.top")
        )?;
        writeln!(out, "| --- | --- | --- | --- | --- |")?;
        for boss in &self.bosses {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                boss.name,
                boss.spawned,
                boss.eliminated,
                boss.rate.as_deref().unwrap_or("-"),
                boss.leaders.join(", ")
            )?;
        }

        writeln!(out, "\n## {}\n", catalog.t("report.waves"))?;
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            catalog.t("report.wave"),
            catalog.t("report.event"),
            catalog.t("report.water_level"),
            catalog.t("report.quota"),
            catalog.t("report.delivered"),
            catalog.t("report.specials")
        )?;
        writeln!(out, "| --- | --- | --- | --- | --- | --- |")?;
        for wave in &self.waves {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                wave.wave,
                wave.event,
                wave.water_level,
                wave.quota,
                wave.delivered,
                Self::specials_summary(wave)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub schedule_id: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub stage: Option<String>,
    pub weapons: Vec<String>,
    pub rare_weapon: Option<String>,
    /// At least one slot hands out a Grizzco weapon.
    pub grizzco_rotation: bool,
}

impl ScheduleReport {
    pub fn build(schedule: &Schedule, ctx: &ReportContext<'_>) -> Self {
        Self {
            schedule_id: schedule.schedule_id.clone(),
            start: ctx.compact_date(&DateInput::Utc(schedule.start_at)),
            end: schedule
                .end_at
                .and_then(|end| ctx.compact_date(&DateInput::Utc(end))),
            stage: schedule
                .stage_id
                .map(|stage| ctx.label(IdCategory::Stage, stage)),
            weapons: schedule
                .weapons
                .iter()
                .map(|&weapon| ctx.label(IdCategory::Weapon, weapon))
                .collect(),
            rare_weapon: schedule
                .rare_weapon_id
                .map(|weapon| ctx.label(IdCategory::Weapon, weapon)),
            grizzco_rotation: schedule
                .weapons
                .iter()
                .chain(&schedule.rare_weapon_id)
                .any(|&weapon| is_grizzco_weapon(weapon)),
        }
    }
}

impl Report for ScheduleReport {
    fn write_console(&self, out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
        writeln!(
            out,
            "{} {}",
            catalog.t("report.schedule").bright_cyan().bold(),
            self.schedule_id.bold()
        )?;
        if let Some(start) = &self.start {
            writeln!(out, "  {}: {start}", catalog.t("report.started"))?;
        }
        if let Some(end) = &self.end {
            writeln!(out, "  {}: {end}", catalog.t("report.ends"))?;
        }
        if let Some(stage) = &self.stage {
            writeln!(out, "  {}: {stage}", catalog.t("report.stage"))?;
        }
        writeln!(
            out,
            "  {}: {}",
            catalog.t("report.weapons"),
            self.weapons.join(", ")
        )?;
        if let Some(rare) = &self.rare_weapon {
            writeln!(out, "  {}: {}", catalog.t("report.rare_weapon"), rare.yellow())?;
        }
        Ok(())
    }

    fn write_markdown(&self, out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
        writeln!(out, "# {} {}\n", catalog.t("report.schedule"), self.schedule_id)?;
        if let Some(start) = &self.start {
            writeln!(out, "- **{}**: {start}", catalog.t("report.started"))?;
        }
        if let Some(end) = &self.end {
            writeln!(out, "- **{}**: {end}", catalog.t("report.ends"))?;
        }
        if let Some(stage) = &self.stage {
            writeln!(out, "- **{}**: {stage}", catalog.t("report.stage"))?;
        }
        writeln!(
            out,
            "- **{}**: {}",
            catalog.t("report.weapons"),
            self.weapons.join(", ")
        )?;
        if let Some(rare) = &self.rare_weapon {
            writeln!(out, "- **{}**: {rare}", catalog.t("report.rare_weapon"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    pub player_id: String,
    pub name: String,
    pub registered: bool,
    pub custom_name: bool,
    pub avatar: Option<String>,
    pub created: Option<String>,
}

impl UserReport {
    /// `created_at` is the raw registration stamp: epoch seconds or a
    /// timestamp string.
    pub fn build(user: &UserProfile, created_at: &Value, ctx: &ReportContext<'_>) -> Self {
        Self {
            player_id: user.player_id.clone(),
            name: user.name.clone().unwrap_or_else(|| user.player_id.clone()),
            registered: user.is_registered,
            custom_name: user.is_custom_name,
            avatar: user.avatar.clone(),
            created: match created_at {
                Value::Number(number) => number.as_i64().and_then(|seconds| {
                    ctx.zone
                        .epoch(seconds)
                        .map_err(|err| log::warn!("creation time not rendered: {err}"))
                        .ok()
                }),
                Value::String(text) => ctx.full_date(&DateInput::Text(text.clone())),
                _ => None,
            },
        }
    }

    fn yes_no(catalog: &Catalog, flag: bool) -> String {
        catalog.t(if flag { "report.yes" } else { "report.no" })
    }
}

impl Report for UserReport {
    fn write_console(&self, out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
        let status = if self.registered {
            catalog.t("report.registered").green()
        } else {
            catalog.t("report.unregistered").dimmed()
        };
        writeln!(
            out,
            "{} {} ({status})",
            catalog.t("report.profile").bright_cyan().bold(),
            self.name.bold()
        )?;
        writeln!(out, "  id: {}", self.player_id)?;
        writeln!(
            out,
            "  {}: {}",
            catalog.t("report.custom_name"),
            Self::yes_no(catalog, self.custom_name)
        )?;
        if let Some(avatar) = &self.avatar {
            writeln!(out, "  {}: {avatar}", catalog.t("report.avatar"))?;
        }
        if let Some(created) = &self.created {
            writeln!(out, "  {}: {created}", catalog.t("report.created"))?;
        }
        Ok(())
    }

    fn write_markdown(&self, out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
        writeln!(out, "# {} {}\n", catalog.t("report.profile"), self.name)?;
        writeln!(out, "- **id**: {}", self.player_id)?;
        writeln!(
            out,
            "- **{}**: {}",
            catalog.t("report.registered"),
            Self::yes_no(catalog, self.registered)
        )?;
        writeln!(
            out,
            "- **{}**: {}",
            catalog.t("report.custom_name"),
            Self::yes_no(catalog, self.custom_name)
        )?;
        if let Some(avatar) = &self.avatar {
            writeln!(out, "- **{}**: {avatar}", catalog.t("report.avatar"))?;
        }
        if let Some(created) = &self.created {
            writeln!(out, "- **{}**: {created}", catalog.t("report.created"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salmon_stats::{IdKeyMap, RawSchedule, StatsConfig, parse_raw_schedule};

    const FIXTURE: &str = include_str!("../../salmon-stats/tests/fixtures/result.json");

    fn engine() -> StatsEngine {
        StatsEngine::new(StatsConfig::default(), IdKeyMap::default())
    }

    fn fixture_report() -> ResultReport {
        let engine = engine();
        let catalog = Catalog::default();
        let ctx = ReportContext::new(&engine, &catalog, Zone::Utc);
        let result = engine.derive_json(FIXTURE).expect("fixture derives");
        ResultReport::build(&result, &ctx)
    }

    fn render(write: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        write(&mut buffer).expect("report renders");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn result_report_resolves_names_and_labels() {
        let report = fixture_report();
        let names: Vec<&str> = report.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["mizuki_sr", "Ren", "Kai", "Sho"]);
        assert_eq!(report.players[2].weapon, "Grizzco Brella");
        assert_eq!(report.players[0].special, "Sting Ray");
        assert!(!report.players[3].registered);
        assert_eq!(report.schedule_id, "2022050108");
        assert_eq!(report.started.as_deref(), Some("2022-05-01 09:02"));
        assert_eq!(report.hazard.as_deref(), Some("186.40%"));
        assert_eq!(report.duration.as_deref(), Some("00:07:57"));
    }

    #[test]
    fn result_report_highlights_roster_bests() {
        let report = fixture_report();
        let highlighted = |stat: Stat| -> Vec<&str> {
            report
                .players
                .iter()
                .filter(|p| p.stats.iter().any(|c| c.stat == stat && c.highlight))
                .map(|p| p.name.as_str())
                .collect()
        };
        assert_eq!(highlighted(Stat::GoldenEggs), vec!["Ren", "Sho"]);
        assert_eq!(highlighted(Stat::Deaths), vec!["Ren", "Kai"]);
        assert_eq!(highlighted(Stat::BossEliminations), vec!["mizuki_sr"]);
    }

    #[test]
    fn result_report_summarizes_bosses_and_waves() {
        let report = fixture_report();
        let maws = report
            .bosses
            .iter()
            .find(|b| b.boss_id == BossId::MAWS)
            .expect("maws appeared");
        assert_eq!(maws.name, "Maws");
        assert_eq!((maws.eliminated, maws.spawned), (4, 5));
        assert_eq!(maws.rate.as_deref(), Some("80.00%"));
        assert_eq!(maws.leaders, vec!["mizuki_sr"]);
        assert!(report.bosses.iter().all(|b| b.boss_id != BossId::DRIZZLER));

        assert_eq!(report.waves.len(), 3);
        assert_eq!(report.waves[1].event, "Fog");
        assert_eq!(report.waves[2].water_level, "High");
        assert_eq!(report.waves[2].specials[3].count, 2);
    }

    #[test]
    fn markdown_marks_highlights_in_bold() {
        let report = fixture_report();
        let catalog = Catalog::default();
        let text = render(|out| generate_markdown_report(out, &report, &catalog));
        assert!(text.starts_with("# Salmon Run Result"));
        assert!(text.contains("| Ren | Splat Charger | **25** |"));
        assert!(text.contains("| Maws | 5 | 4 | 80.00% | mizuki_sr |"));
    }

    #[test]
    fn console_and_json_render_the_same_rows() {
        let report = fixture_report();
        let catalog = Catalog::default();
        let console = render(|out| generate_console_report(out, &report, &catalog));
        assert!(console.contains("Sho (unregistered)"));
        assert!(console.contains("Hazard level: 186.40%"));

        let json = render(|out| generate_json_report(out, &report));
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["players"].as_array().map(Vec::len), Some(4));
        assert_eq!(value["bosses"][0]["name"], "Goldie");
    }

    #[test]
    fn schedule_dates_follow_configured_compact_pattern() {
        let config = StatsConfig {
            compact_date_pattern: "%d/%m %Hh".to_string(),
            ..StatsConfig::default()
        };
        let engine = StatsEngine::new(config, IdKeyMap::default());
        let catalog = Catalog::default();
        let ctx = ReportContext::new(&engine, &catalog, Zone::Utc);
        let raw = RawSchedule::from_json(
            r#"{ "schedule_id": "2022050107", "end_at": "2022-05-02 19:00:00" }"#,
        )
        .expect("schedule parses");
        let schedule = parse_raw_schedule(raw).expect("schedule normalizes");
        let report = ScheduleReport::build(&schedule, &ctx);
        assert_eq!(report.start.as_deref(), Some("01/05 07h"));
        assert_eq!(report.end.as_deref(), Some("02/05 19h"));
    }

    #[test]
    fn schedule_report_translates_rotation() {
        let engine = engine();
        let catalog = Catalog::default();
        let ctx = ReportContext::new(&engine, &catalog, Zone::Utc);
        let raw = RawSchedule::from_json(
            r#"{ "schedule_id": 1651388400000, "weapons": [40, -2, 3010, 2010], "stage_id": 5001 }"#,
        )
        .expect("schedule parses");
        let schedule = parse_raw_schedule(raw).expect("schedule normalizes");
        let report = ScheduleReport::build(&schedule, &ctx);
        assert_eq!(report.schedule_id, "2022050107");
        assert_eq!(report.start.as_deref(), Some("05-01 07:00"));
        assert_eq!(report.stage.as_deref(), Some("Marooner's Bay"));
        assert_eq!(report.weapons[1], "Random (Grizzco)");
        assert!(!report.grizzco_rotation);
    }

    #[test]
    fn user_report_reads_registration_stamp() {
        let engine = engine();
        let catalog = Catalog::default();
        let ctx = ReportContext::new(&engine, &catalog, Zone::Utc);
        let raw = salmon_stats::RawUser::from_json(
            r#"{ "player_id": "abc", "name": "Kai", "created_at": 1651395721 }"#,
        )
        .expect("user parses");
        let created_at = raw.created_at.clone();
        let user = salmon_stats::parse_raw_user(raw);
        let report = UserReport::build(&user, &created_at, &ctx);
        assert!(report.registered);
        assert_eq!(report.created.as_deref(), Some("2022-05-01 09:02:01"));

        let text = render(|out| generate_markdown_report(out, &report, &catalog));
        assert!(text.contains("- **registered**: yes"));
    }
}
