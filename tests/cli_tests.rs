//! Command-line tests running the `payer-match` binary on fixture files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BANK_EXPORT: &str = "\
Auftragskonto;Buchungstag;Beguenstigter/Zahlungspflichtiger;Verwendungszweck;Betrag;Waehrung
DE001;13.01.25;MAX MUSTERMANN;Spende;50,00;EUR
DE001;14.01.25;Schmidt, Maria;Spende;1.000,00;EUR
DE001;15.01.25;Stadtwerke Berlin;Abschlag;-80,00;EUR
DE001;16.01.25;Globex Trading AG;Spende;10,00;EUR
";

const DIRECTORY: &str = "\
Name;Straße;PLZ;Ort
Max Mustermann;Hauptstr. 1;12345;Berlin
Maria Schmidt;Ring 2;54321;Köln
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("umsaetze.csv"), BANK_EXPORT).unwrap();
        std::fs::write(dir.path().join("adressen.csv"), DIRECTORY).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

fn payer_match() -> Command {
    Command::cargo_bin("payer-match").unwrap()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_resolve_text_output() {
    let fx = Fixture::new();

    payer_match()
        .args(["resolve", arg(&fx.path("umsaetze.csv"))])
        .args(["--directory", arg(&fx.path("adressen.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("Max Mustermann (score 100, exact)"))
        .stdout(predicate::str::contains("Maria Schmidt (score 100, exact)"))
        .stdout(predicate::str::contains("Donations: 3"))
        .stdout(predicate::str::contains("Unmatched: 1"))
        .stdout(predicate::str::contains("- Globex Trading AG"))
        .stdout(predicate::str::contains("Stadtwerke").not());
}

#[test]
fn test_resolve_json_output() {
    let fx = Fixture::new();

    let output = payer_match()
        .args(["resolve", arg(&fx.path("umsaetze.csv"))])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["total"], 3);
    assert_eq!(report["summary"]["matched"], 2);

    let first = &report["donations"][0];
    assert_eq!(first["transaction"]["payer_name"], "MAX MUSTERMANN");
    assert_eq!(first["best"]["record"]["full_name"], "Max Mustermann");
    assert_eq!(first["confidence"], "exact");
    assert!(report["donations"][2]["best"].is_null());
}

#[test]
fn test_resolve_tsv_output() {
    let fx = Fixture::new();

    payer_match()
        .args(["resolve", arg(&fx.path("umsaetze.csv"))])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .args(["-f", "tsv", "--workers", "2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("booking_date\tamount\tpayer_name"))
        .stdout(predicate::str::contains(
            "2025-01-14\t1000.00\tSchmidt, Maria\tMaria Schmidt\tRing 2\t54321\tKöln\t100\texact",
        ));
}

#[test]
fn test_resolve_writes_review_log() {
    let fx = Fixture::new();
    let log = fx.path("review.csv");

    payer_match()
        .args(["resolve", arg(&fx.path("umsaetze.csv"))])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .args(["--log", arg(&log)])
        .assert()
        .success();

    let content = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Date Generated;Donor Name;Street"));
    assert!(lines[2].contains("Maria Schmidt;Ring 2;54321;Köln;1000,00 EUR;14.01.2025"));
}

#[test]
fn test_resolve_rejects_unnamed_directory_record() {
    let fx = Fixture::new();
    let directory = fx.write("lücke.csv", "Name;Ort\nMax Mustermann;Berlin\n;Hamburg\n");

    payer_match()
        .args(["resolve", arg(&fx.path("umsaetze.csv"))])
        .args(["-d", arg(&directory)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Directory record 1 has no name"));
}

#[test]
fn test_match_explains_decision() {
    let fx = Fixture::new();

    payer_match()
        .args(["match", "SCHMIDT, MARIA"])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("Match: Maria Schmidt (record 1)"))
        .stdout(predicate::str::contains("Address: Ring 2, 54321 Köln"))
        .stdout(predicate::str::contains("Normalized: Maria Schmidt"));
}

#[test]
fn test_match_reports_no_match() {
    let fx = Fixture::new();

    payer_match()
        .args(["match", "Globex Trading AG"])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("No match"))
        .stdout(predicate::str::contains("Closest below threshold"));
}

#[test]
fn test_match_threshold_flag() {
    let fx = Fixture::new();

    payer_match()
        .args(["match", "Max Mustermnn", "--threshold", "97"])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("No match"));

    payer_match()
        .args(["match", "Max Mustermnn", "-t", "101"])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Threshold must be between 0 and 100"));
}

#[test]
fn test_match_requires_directory() {
    payer_match()
        .args(["match", "Max Mustermann"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No address directory given"));
}

#[test]
fn test_settings_file_supplies_directory_and_threshold() {
    let fx = Fixture::new();
    let settings = fx.write(
        "settings.json",
        &serde_json::json!({
            "directory": fx.path("adressen.csv"),
            "threshold": 97,
        })
        .to_string(),
    );

    payer_match()
        .args(["--config", arg(&settings)])
        .args(["match", "MAX MUSTERMANN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Match: Max Mustermann"));

    payer_match()
        .args(["--config", arg(&settings)])
        .args(["match", "Max Mustermnn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No match"));
}

#[test]
fn test_invalid_settings_file() {
    let fx = Fixture::new();
    let settings = fx.write("settings.json", r#"{"treshold": 80}"#);

    payer_match()
        .args(["--config", arg(&settings)])
        .args(["match", "Max Mustermann", "-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse settings"));
}

#[test]
fn test_split_command() {
    payer_match()
        .args(["split", "Maria und Hans Schmidt", "SCHMIDT, MARIA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Maria Schmidt\n  - Hans Schmidt"))
        .stdout(predicate::str::contains("Normalized: Maria Schmidt"));
}

#[test]
fn test_compare_command_json() {
    let output = payer_match()
        .args(["compare", "Hans Schmidt", "SCHMIDT HANS", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["scores"]["token_sort_ratio"], 100);
    assert_eq!(json["scores"]["best"], 100);
}

#[test]
fn test_search_by_city() {
    let fx = Fixture::new();

    payer_match()
        .args(["search", "köln"])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 directory records match \"köln\""))
        .stdout(predicate::str::contains("[1] Maria Schmidt | Ring 2, 54321 Köln"))
        .stdout(predicate::str::contains("Mustermann").not());
}

#[test]
fn test_search_json_and_tsv() {
    let fx = Fixture::new();

    let output = payer_match()
        .args(["search", "MUSTER", "--format", "json"])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["records"], 2);
    assert_eq!(report["hits"][0]["index"], 0);
    assert_eq!(report["hits"][0]["record"]["postal_code"], "12345");

    payer_match()
        .args(["search", "-f", "tsv"])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("index\tname\tstreet"))
        .stdout(predicate::str::contains("1\tMaria Schmidt\tRing 2\t54321\tKöln"));
}

#[test]
fn test_search_without_hits() {
    let fx = Fixture::new();

    payer_match()
        .args(["search", "Globex"])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("No directory records match \"Globex\""));
}

#[test]
fn test_missing_bank_file() {
    let fx = Fixture::new();

    payer_match()
        .args(["resolve", arg(&fx.path("fehlt.csv"))])
        .args(["-d", arg(&fx.path("adressen.csv"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}
