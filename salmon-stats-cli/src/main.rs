mod loader;
mod reports;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Read, Write, stdin, stdout};
use std::path::{Path, PathBuf};

use loader::FsLoader;
use reports::{
    Report, ReportContext, ResultReport, ScheduleReport, UserReport, Zone, generate_console_report,
    generate_json_report, generate_markdown_report,
};
use salmon_stats::{
    Catalog, RawSchedule, RawUser, StatsEngine, StaticLoader, parse_raw_schedule, parse_raw_user,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    /// A single match result
    Result,
    /// A raw rotation schedule
    Schedule,
    /// A raw player profile
    User,
}

#[derive(Debug, Parser)]
#[command(name = "salmon-stats", version)]
#[command(about = "Derive Salmon Run match statistics and render them as reports")]
struct Args {
    /// JSON document to read, or `-` for stdin
    input: String,

    /// Kind of document the input holds
    #[arg(long, value_enum, default_value_t = InputKind::Result)]
    kind: InputKind,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json", "markdown"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding `config.json` / `id_key_map.json` overrides
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Message catalog used for labels instead of the bundled English one
    #[arg(long)]
    locale: Option<PathBuf>,

    /// Render timestamps in UTC instead of the local zone
    #[arg(long)]
    utc: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(&args)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let engine = load_engine(args.data_dir.as_deref())?;
    let catalog = load_catalog(args.locale.as_deref())?;
    let input = read_input(&args.input)?;
    let zone = if args.utc { Zone::Utc } else { Zone::Local };
    let ctx = ReportContext::new(&engine, &catalog, zone);

    if args.output.is_some() {
        colored::control::set_override(false);
    }

    let mut rendered = Vec::new();
    match args.kind {
        InputKind::Result => {
            let result = engine
                .derive_json(&input)
                .with_context(|| format!("failed to derive match result from {}", args.input))?;
            log::info!(
                "derived result {:?} with {} players",
                result.id(),
                result.player_results().len()
            );
            let report = ResultReport::build(&result, &ctx);
            write_report(&mut rendered, &report, &args.report, &catalog)?;
        }
        InputKind::Schedule => {
            let raw = RawSchedule::from_json(&input).context("malformed schedule")?;
            let schedule = parse_raw_schedule(raw).context("failed to normalize schedule")?;
            let report = ScheduleReport::build(&schedule, &ctx);
            write_report(&mut rendered, &report, &args.report, &catalog)?;
        }
        InputKind::User => {
            let raw = RawUser::from_json(&input).context("malformed player profile")?;
            let created_at = raw.created_at.clone();
            let user = parse_raw_user(raw);
            let report = UserReport::build(&user, &created_at, &ctx);
            write_report(&mut rendered, &report, &args.report, &catalog)?;
        }
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    output_target.writer().write_all(&rendered)?;
    output_target.flush_inner()?;
    Ok(())
}

fn load_engine(data_dir: Option<&Path>) -> Result<StatsEngine> {
    match data_dir {
        Some(dir) => StatsEngine::load(&FsLoader::new(dir))
            .with_context(|| format!("failed to load reference data from {}", dir.display())),
        None => StatsEngine::load(&StaticLoader).context("failed to load bundled reference data"),
    }
}

fn load_catalog(locale: Option<&Path>) -> Result<Catalog> {
    let Some(path) = locale else {
        return Ok(Catalog::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    Catalog::from_json(&data).with_context(|| format!("malformed catalog {}", path.display()))
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
}

fn write_report<R: Report>(
    out: &mut dyn Write,
    report: &R,
    format: &str,
    catalog: &Catalog,
) -> Result<()> {
    match format {
        "json" => generate_json_report(out, report),
        "markdown" => generate_markdown_report(out, report, catalog),
        _ => generate_console_report(out, report, catalog),
    }
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../salmon-stats/tests/fixtures/result.json"
    );

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "salmon-stats-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn base_args() -> Args {
        Args {
            input: FIXTURE.to_string(),
            kind: InputKind::Result,
            report: "json".to_string(),
            output: None,
            data_dir: None,
            locale: None,
            utc: true,
            verbose: false,
        }
    }

    #[test]
    fn args_parse_defaults() {
        let args = Args::try_parse_from(["salmon-stats", "result.json"]).unwrap();
        assert_eq!(args.kind, InputKind::Result);
        assert_eq!(args.report, "console");
        assert!(!args.utc);
        assert!(Args::try_parse_from(["salmon-stats", "x", "--report", "csv"]).is_err());
    }

    #[test]
    fn run_writes_json_report_to_file() {
        let output = temp_path("json");
        let mut args = base_args();
        args.output = Some(output.clone());
        run(&args).unwrap();

        let content = std::fs::read_to_string(output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["schedule_id"], "2022050108");
        assert_eq!(value["players"][0]["name"], "mizuki_sr");
    }

    #[test]
    fn localized_catalog_overrides_labels() {
        let locale = temp_path("locale.json");
        std::fs::write(&locale, r#"{ "report": { "title": "Resultat" } }"#).unwrap();
        let output = temp_path("md");
        let mut args = base_args();
        args.report = "markdown".to_string();
        args.locale = Some(locale);
        args.output = Some(output.clone());
        run(&args).unwrap();

        let content = std::fs::read_to_string(output).unwrap();
        assert!(content.starts_with("# Resultat"));
        assert!(content.contains("## Players"));
    }

    #[test]
    fn missing_input_reports_path() {
        let mut args = base_args();
        args.input = "/nonexistent/result.json".to_string();
        let err = run(&args).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/result.json"));
    }

    #[test]
    fn failed_run_does_not_create_output() {
        let output = temp_path("never-written");
        let mut args = base_args();
        args.input = "/nonexistent/result.json".to_string();
        args.output = Some(output.clone());
        assert!(run(&args).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        let locale = temp_path("broken-locale.json");
        std::fs::write(&locale, "not json").unwrap();
        assert!(load_catalog(Some(&locale)).is_err());
        assert!(load_catalog(None).is_ok());
    }
}
