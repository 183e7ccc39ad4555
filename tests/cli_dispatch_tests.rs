use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_dls")
}

fn shipped_config() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/data/formats.yaml")
}

fn dls(args: &[&str]) -> std::process::Output {
    Command::new(bin())
        .args(args)
        .env("DLS_FORMATS_CONFIG", shipped_config())
        .env("DLS_LOG", "warn")
        .output()
        .expect("dls should run")
}

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("dls-{name}-{stamp}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn target_command_dispatches_and_emits_json() {
    let output = dls(&["target", "50", "150", "100", "75"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("target should emit json");
    assert_eq!(payload["target"], 113);
    assert_eq!(payload["formula"], "standard_edition");
}

#[test]
fn par_command_emits_par_score() {
    let output = dls(&["par", "250", "100", "40"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("par should emit json");
    assert_eq!(payload["par_score"], 101);
}

#[test]
fn unknown_command_prints_usage() {
    let output = dls(&["simulate"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: dls"));
}

#[test]
fn target_command_rejects_bad_numbers() {
    let output = dls(&["target", "50", "lots", "100", "75"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid <team1_score>"));
}

#[test]
fn unknown_format_fails() {
    let output = dls(&["target", "40", "150", "100", "75"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("40-over"));
}

#[test]
fn table_command_prints_tab_separated_rows() {
    let output = dls(&["table", "20", "--table"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert!(lines
        .next()
        .is_some_and(|header| header.starts_with("overs_remaining\tw0")));
    let first = lines.next().expect("first data row");
    assert!(first.starts_with("20\t100.0"), "{first}");
    assert_eq!(stdout.lines().count(), 22);
}

#[test]
fn validate_command_accepts_shipped_tables() {
    let output = dls(&["validate", shipped_config()]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[50] ok"));
    assert!(stdout.contains("[20] ok"));
}

#[test]
fn validate_command_reports_broken_tables() {
    let dir = unique_temp_dir("validate");
    let mut rows = String::from("overs_remaining,w0,w1,w2,w3,w4,w5,w6,w7,w8,w9\n");
    rows.push_str("2,100,90,80,70,60,50,40,30,20,10\n");
    rows.push_str("1,110,45,40,35,30,25,20,15,10,5\n");
    rows.push_str("0,0,0,0,0,0,0,0,0,0,0\n");
    fs::write(dir.join("broken.csv"), rows).expect("write table");
    fs::write(
        dir.join("formats.yaml"),
        "formats:\n  - format_overs: 2\n    table: broken.csv\n",
    )
    .expect("write config");

    let config = dir.join("formats.yaml");
    let output = dls(&["validate", config.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed"), "{stderr}");

    let _ = fs::remove_dir_all(dir);
}
