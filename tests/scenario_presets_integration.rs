//! Presets, scenario files and the CLI surface.

use std::path::Path;
use std::process::{Command, Output};

use offpeak_planner::config::PlannerConfig;
use offpeak_planner::store::{ConfigStore, TomlFileStore};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_offpeak-planner"))
        .args(args)
        .output()
        .expect("offpeak-planner process should run")
}

fn stdout_of(args: &[&str]) -> String {
    let output = run_cli(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

#[test]
fn scenario_files_parse_and_validate() {
    for path in ["scenarios/night_utc.toml", "scenarios/split_paris.toml"] {
        let config = PlannerConfig::from_toml_file(Path::new(path))
            .unwrap_or_else(|e| panic!("{path}: {e}"));
        assert!(config.validate().is_empty(), "{path} should be valid");
        assert!(config.calendar().is_ok());
        assert_eq!(config.periods(&mut config.id_generator()).unwrap().len(), 2);
    }
}

#[test]
fn split_scenario_matches_split_preset() {
    let from_file = PlannerConfig::from_toml_file(Path::new("scenarios/split_paris.toml")).unwrap();
    assert_eq!(from_file, PlannerConfig::from_preset("split").unwrap());
}

#[test]
fn every_preset_is_valid() {
    for name in PlannerConfig::PRESETS {
        let config = PlannerConfig::from_preset(name).unwrap();
        assert!(config.validate().is_empty(), "preset {name} should be valid");
    }
    assert!(PlannerConfig::from_preset("nope").is_err());
}

#[test]
fn cli_status_reports_time_until_off_peak() {
    let stdout = stdout_of(&[
        "--config",
        "scenarios/night_utc.toml",
        "--at",
        "1970-05-23T21:21:29Z",
        "status",
    ]);
    assert!(stdout.contains("peak, off-peak starts in 1h38m31s"), "{stdout}");
}

#[test]
fn cli_defaults_to_status() {
    let stdout = stdout_of(&[
        "--config",
        "scenarios/night_utc.toml",
        "--at",
        "1970-05-24T01:21:29Z",
    ]);
    assert!(stdout.contains("off-peak, ends in 5h38m31s"), "{stdout}");
}

#[test]
fn cli_plan_recommends_overnight_delay() {
    let stdout = stdout_of(&[
        "--config",
        "scenarios/night_utc.toml",
        "--at",
        "2024-05-10T19:30:00Z",
        "plan",
        "dishwasher",
        "eco",
    ]);
    assert!(
        stdout.contains("Dishwasher / Eco: start now with delay 4h00"),
        "{stdout}"
    );
}

#[test]
fn cli_rejects_unknown_appliance_and_preset() {
    let output = run_cli(&["--preset", "split", "plan", "oven", "bake"]);
    assert!(!output.status.success());

    let output = run_cli(&["--preset", "nope", "status"]);
    assert!(!output.status.success());
}

#[test]
fn cli_reports_unknown_program_with_planner_error() {
    let output = run_cli(&["--preset", "baseline", "plan", "dishwasher", "turbo"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(r#"appliance "Dishwasher" has no program "turbo""#),
        "{stderr}"
    );
}

#[test]
fn cli_init_writes_loadable_config() {
    let path = std::env::temp_dir().join(format!("offpeak-init-{}.toml", std::process::id()));
    let path_str = path.to_str().expect("utf-8 temp path");

    stdout_of(&["--preset", "split", "init", path_str]);
    let loaded = TomlFileStore::new(&path).load().unwrap();
    assert_eq!(loaded, PlannerConfig::split());

    let stdout = stdout_of(&["--config", path_str, "--at", "2023-07-14T14:00:00+01:00", "windows"]);
    assert_eq!(stdout.lines().count(), 3, "{stdout}");

    std::fs::remove_file(&path).ok();
}
