use std::process::{Command, Output};

const RESULT_FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../salmon-stats/tests/fixtures/result.json"
);
const SCHEDULE_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/schedule.json");
const USER_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/user.json");

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "salmon-stats-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_salmon-stats"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("run cli")
}

#[test]
fn cli_writes_json_result_report() {
    let output_path = temp_path("result-json");
    let status = Command::new(env!("CARGO_BIN_EXE_salmon-stats"))
        .args([RESULT_FIXTURE, "--report", "json", "--utc", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["schedule_id"], "2022050108");
    assert_eq!(report["duration"], "00:07:57");
    assert_eq!(report["started"], "2022-05-01 09:02");
    assert_eq!(report["players"].as_array().map(Vec::len), Some(4));
    assert_eq!(report["bosses"].as_array().map(Vec::len), Some(8));
}

#[test]
fn cli_prints_markdown_to_stdout() {
    let output = run(&[RESULT_FIXTURE, "--report", "markdown"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# Salmon Run Result"));
    assert!(stdout.contains("| Steel Eel | 2 | 2 | 100% |"));
}

#[test]
fn cli_console_report_lists_players() {
    let output = run(&[RESULT_FIXTURE]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Salmon Run Result"));
    assert!(stdout.contains("mizuki_sr"));
    assert!(stdout.contains("Kai"));
}

#[test]
fn cli_reads_schedules() {
    let output = run(&[SCHEDULE_FIXTURE, "--kind", "schedule", "--report", "json", "--utc"]);
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json schedule report");
    assert_eq!(report["schedule_id"], "2022050107");
    assert_eq!(report["start"], "05-01 07:00");
    assert_eq!(report["stage"], "Salmonid Smokeyard");
    assert_eq!(report["weapons"][0], "Grizzco Brella");
    assert_eq!(report["grizzco_rotation"], true);
}

#[test]
fn cli_reads_user_profiles_from_stdin() {
    let input = std::fs::read(USER_FIXTURE).expect("read user fixture");
    let mut child = Command::new(env!("CARGO_BIN_EXE_salmon-stats"))
        .args(["-", "--kind", "user", "--report", "json"])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .expect("spawn cli");
    {
        use std::io::Write;
        let mut stdin = child.stdin.take().expect("stdin");
        stdin.write_all(&input).expect("write stdin");
    }
    let output = child.wait_with_output().expect("wait cli");
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json user report");
    assert_eq!(report["name"], "mizuki_sr");
    assert_eq!(report["registered"], true);
    assert_eq!(report["custom_name"], false);
}

#[test]
fn cli_rejects_invalid_results() {
    let input = temp_path("empty-roster.json");
    std::fs::write(&input, r#"{ "schedule_id": "2022050108", "player_results": [] }"#)
        .expect("write input");
    let output = run(&[input.to_str().expect("utf8 path")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no players"));
}

#[test]
fn cli_leaves_no_output_file_when_derivation_fails() {
    let input = temp_path("duplicate-players.json");
    std::fs::write(
        &input,
        r#"{ "schedule_id": "2022050108", "player_results": [{ "player_id": "a" }, { "player_id": "a" }] }"#,
    )
    .expect("write input");
    let output_path = temp_path("failed-report");
    let output = run(&[
        input.to_str().expect("utf8 path"),
        "--output",
        output_path.to_str().expect("utf8 path"),
    ]);
    assert!(!output.status.success());
    assert!(!output_path.exists());
}

#[test]
fn cli_honours_data_dir_overrides() {
    let dir = temp_path("data-dir");
    std::fs::create_dir_all(&dir).expect("create data dir");
    std::fs::write(
        dir.join("config.json"),
        r#"{ "asset_base_url": "http://localhost:8080/img" }"#,
    )
    .expect("write config");
    let output = run(&[
        RESULT_FIXTURE,
        "--report",
        "json",
        "--data-dir",
        dir.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(
        report["players"][0]["weapon_icon"],
        "http://localhost:8080/img/weapon/40.png"
    );
}
