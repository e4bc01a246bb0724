//! Integration tests for the ludus CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CUSTOM_CATALOG: &str = r#"{
    "classes": [
        {
            "id": "hoplomachus",
            "name": "Hoplomachus",
            "stats": {"strength": 50, "agility": 40, "dexterity": 50, "endurance": 50, "constitution": 50},
            "weapon_damage": 9
        },
        {
            "id": "dimachaerus",
            "name": "Dimachaerus",
            "stats": {"strength": 45, "agility": 60, "dexterity": 60, "endurance": 40, "constitution": 40},
            "weapon_damage": 10
        }
    ],
    "skills": []
}"#;

const CUSTOM_REWARDS: &str = r#"{
    "final": {"gold": 900, "fame": 90},
    "semifinal": {"gold": 300, "fame": 30},
    "quarterfinal": {"gold": 100, "fame": 10},
    "early_round": {"gold": 50, "fame": 5},
    "bout": {"gold": 70, "fame": 7},
    "champion": {"gold": 7777, "fame": 777},
    "runner_up": {"gold": 333, "fame": 33}
}"#;

/// Write a file into a fresh temp directory.
fn temp_file(name: &str, contents: &str) -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    let path = path.to_str().unwrap().to_string();
    (dir, path)
}

fn ludus() -> Command {
    let mut cmd = Command::cargo_bin("ludus").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn stdout_of(args: &[&str]) -> String {
    let output = ludus().args(args).assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

// ---------------------------------------------------------------------------
// duel
// ---------------------------------------------------------------------------

#[test]
fn duel_reports_winner() {
    ludus()
        .args(["duel", "murmillo", "retiarius"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Spartacus")
                .and(predicate::str::contains("Crixus"))
                .and(predicate::str::contains("defeats"))
                .and(predicate::str::contains("Damage dealt")),
        );
}

#[test]
fn duel_same_seed_same_result() {
    let args = ["duel", "secutor", "thraex", "--seed", "1234", "--log"];
    assert_eq!(stdout_of(&args), stdout_of(&args));
}

#[test]
fn duel_log_lists_turns() {
    ludus()
        .args(["duel", "thraex", "secutor", "--log", "--level", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Combat Log").and(predicate::str::contains("[turn  1]")));
}

#[test]
fn duel_class_names_ignore_case() {
    ludus().args(["duel", "Murmillo", "THRAEX"]).assert().success();
}

#[test]
fn duel_json_valid_output() {
    let output = ludus()
        .args(["duel", "murmillo", "secutor", "--json", "--rules", "death"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON output");
    assert!(["knockout", "submission", "judge_decision"].contains(&json["decision"].as_str().unwrap()));
    assert_eq!(json["fighters"].as_array().unwrap().len(), 2);
    assert!(!json["log"]["entries"].as_array().unwrap().is_empty());
}

#[test]
fn duel_unknown_class() {
    ludus()
        .args(["duel", "murmillo", "samurai"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown class: samurai"));
}

#[test]
fn duel_unknown_rules() {
    ludus()
        .args(["duel", "murmillo", "thraex", "--rules", "pillow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown rules"));
}

#[test]
fn duel_unknown_difficulty() {
    ludus()
        .args(["duel", "murmillo", "thraex", "--difficulty", "legendary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown difficulty"));
}

#[test]
fn duel_rejects_out_of_range_level() {
    for level in ["0", "101", "4294967295"] {
        ludus()
            .args(["duel", "murmillo", "thraex", "--level", level])
            .assert()
            .failure()
            .stderr(predicate::str::contains(format!("invalid level {level}: must be between 1 and 100")));
    }
}

#[test]
fn duel_with_custom_catalog() {
    let (_dir, path) = temp_file("catalog.json", CUSTOM_CATALOG);
    ludus()
        .args(["duel", "hoplomachus", "dimachaerus", "--catalog", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("hoplomachus"));
}

#[test]
fn verbose_logs_to_stderr() {
    ludus()
        .args(["-v", "duel", "murmillo", "retiarius"])
        .assert()
        .success()
        .stderr(predicate::str::contains("match decided"));
}

// ---------------------------------------------------------------------------
// tournament
// ---------------------------------------------------------------------------

#[test]
fn tournament_crowns_champion() {
    ludus()
        .args(["tournament"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("single-elimination")
                .and(predicate::str::contains("Standings"))
                .and(predicate::str::contains("CHAMPION")),
        );
}

#[test]
fn tournament_round_robin_with_events() {
    ludus()
        .args(["tournament", "--format", "round-robin", "--entrants", "5", "--events"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("round-robin")
                .and(predicate::str::contains("earns"))
                .and(predicate::str::contains("round 4 complete")),
        );
}

#[test]
fn tournament_gauntlet_under_submission_rules() {
    ludus()
        .args(["tournament", "--format", "gauntlet", "--entrants", "3", "--rules", "submission"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CHAMPION"));
}

#[test]
fn tournament_parallel_matches_sequential() {
    let tail = |out: String| out.lines().skip(1).collect::<Vec<_>>().join("\n");
    let sequential = stdout_of(&["tournament", "--entrants", "12", "--seed", "9"]);
    let parallel = stdout_of(&["tournament", "--entrants", "12", "--seed", "9", "--parallel"]);
    assert_eq!(tail(sequential), tail(parallel));
}

#[test]
fn tournament_custom_rewards() {
    let (_dir, path) = temp_file("rewards.json", CUSTOM_REWARDS);
    ludus()
        .args(["tournament", "--entrants", "4", "--rewards", &path, "--events"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("earns 7777 gold, 777 fame (champion)")
                .and(predicate::str::contains("earns 333 gold, 33 fame (runner-up)"))
                .and(predicate::str::contains("earns 900 gold, 90 fame (final win)")),
        );
}

#[test]
fn tournament_malformed_rewards() {
    let (_dir, path) = temp_file("rewards.json", r#"{"final": 3}"#);
    ludus()
        .args(["tournament", "--rewards", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reward table parse error"));
}

#[test]
fn tournament_needs_two_entrants() {
    ludus()
        .args(["tournament", "--entrants", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 2 participants"));
}

#[test]
fn tournament_rejects_bad_bracket_size() {
    ludus()
        .args(["tournament", "--entrants", "5", "--size", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid bracket size 6"));
}

#[test]
fn tournament_unknown_format() {
    ludus()
        .args(["tournament", "--format", "swiss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

// ---------------------------------------------------------------------------
// catalog
// ---------------------------------------------------------------------------

#[test]
fn catalog_lists_standard_classes() {
    ludus()
        .args(["catalog"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("murmillo")
                .and(predicate::str::contains("retiarius"))
                .and(predicate::str::contains("net_throw"))
                .and(predicate::str::contains("4 classes")),
        );
}

#[test]
fn catalog_json_round_trips() {
    let output = ludus()
        .args(["catalog", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON output");
    assert_eq!(json["classes"].as_array().unwrap().len(), 4);

    let text = String::from_utf8(output).unwrap();
    let (_dir, path) = temp_file("catalog.json", &text);
    ludus()
        .args(["catalog", "--catalog", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 classes"));
}

#[test]
fn catalog_custom_file() {
    let (_dir, path) = temp_file("catalog.json", CUSTOM_CATALOG);
    ludus()
        .args(["catalog", "-c", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hoplomachus").and(predicate::str::contains("2 classes, 0 skills")));
}

#[test]
fn catalog_missing_file() {
    ludus()
        .args(["catalog", "--catalog", "/nonexistent/catalog.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn catalog_invalid_reference() {
    let (_dir, path) = temp_file(
        "catalog.json",
        r#"{"classes": [{"id": "x", "name": "X", "stats": {"strength": 1, "agility": 1, "dexterity": 1, "endurance": 1, "constitution": 1}, "weapon_damage": 1, "skills": ["fireball"]}], "skills": []}"#,
    );
    ludus()
        .args(["catalog", "--catalog", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid catalog"));
}

#[test]
fn catalog_rejects_oversized_stats() {
    let (_dir, path) = temp_file(
        "catalog.json",
        r#"{"classes": [{"id": "titan", "name": "Titan", "stats": {"strength": 50, "agility": 50, "dexterity": 50, "endurance": 50, "constitution": 4294967295}, "weapon_damage": 8}], "skills": []}"#,
    );
    ludus()
        .args(["duel", "titan", "titan", "--catalog", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid catalog").and(predicate::str::contains("above 100")));
}
