use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

const PRO_ENDPOINT: &str = "/v1beta/models/gemini-3-pro-preview:generateContent";

fn reply(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn opus(url: &str, out: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("opus"));
    cmd.env("GEMINI_API_KEY", "test-key")
        .env_remove("API_KEY")
        .env_remove("OPUS_MODEL")
        .env_remove("OPUS_COMPOSER")
        .arg("--api-url")
        .arg(url)
        .arg("--out")
        .arg(out);
    cmd
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_end_to_end_compose() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", PRO_ENDPOINT)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({"tools": [{"googleSearch": {}}]})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("```abc\nX:1\nT:Morning Reel\n\nK:D\n|:DFA dfa:|\n```"))
        .create();

    let out = tempdir().unwrap();

    opus(&url, out.path())
        .arg("--library")
        .arg("compose")
        .arg("a morning reel")
        .assert()
        .success()
        .stdout(predicate::str::contains("X:1\nT:Morning Reel\n%\nK:D"));

    mock.assert();
    assert_eq!(
        files_in(out.path()),
        vec![
            "Opus_Infinite_Full_Library_Export.md",
            "a_morning_reel_v1_CREATION.txt"
        ]
    );

    let snapshot = std::fs::read_to_string(out.path().join("a_morning_reel_v1_CREATION.txt")).unwrap();
    assert!(snapshot.starts_with("METADATA\nTITLE: a morning reel\nVERSION: v1\n"));
    assert!(snapshot.contains("PROCESS: CREATION - Initial Generation: a morning reel"));

    let library =
        std::fs::read_to_string(out.path().join("Opus_Infinite_Full_Library_Export.md")).unwrap();
    assert!(library.contains("Total Compositions: 1"));
    assert!(library.contains("# 1. a morning reel"));
}

#[test]
fn test_quota_error_is_reported_once() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", PRO_ENDPOINT)
        .with_status(429)
        .with_body(r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#)
        .expect(1)
        .create();

    let out = tempdir().unwrap();

    opus(&url, out.path())
        .arg("compose")
        .arg("a waltz")
        .arg("--workflow")
        .arg("--to")
        .arg("planning")
        .assert()
        .failure()
        .stderr(predicate::str::contains("currently unavailable due to quota limits"));

    mock.assert();
    assert!(files_in(out.path()).is_empty());
}

#[test]
fn test_edit_file() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", PRO_ENDPOINT)
        .match_body(Matcher::Regex("Introduce a variation".to_string()))
        .with_status(200)
        .with_body(reply("X:1\nT:Jig\nK:G\nGAB cBA|"))
        .create();

    let out = tempdir().unwrap();
    let score = out.path().join("jig.abc");
    std::fs::write(&score, "X:1\nT:Jig\nK:G\nGAB|").unwrap();

    opus(&url, out.path())
        .arg("edit")
        .arg(&score)
        .arg("variation")
        .assert()
        .success()
        .stdout(predicate::str::contains("GAB cBA|"));

    mock.assert();
    assert!(out.path().join("jig_v2_VARIATION.txt").exists());
}

#[test]
fn test_stages_lists_workflow() {
    Command::new(cargo::cargo_bin!("opus"))
        .arg("stages")
        .assert()
        .success()
        .stdout(predicate::str::contains(" 0  PLANNING"))
        .stdout(predicate::str::contains("10  FINAL_CHECK"));
}

#[test]
fn test_version_from_build_script() {
    Command::new(cargo::cargo_bin!("opus"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^opus \S+\n$").unwrap());
}

#[test]
fn test_spec_prints_dictionary() {
    Command::new(cargo::cargo_bin!("opus"))
        .arg("spec")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# ABC+ Command Dictionary"))
        .stdout(predicate::str::contains("## Articulations"));
}

#[test]
fn test_spec_json_tables() {
    let output = Command::new(cargo::cargo_bin!("opus"))
        .arg("spec")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let spec: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        spec["Articulations"][0],
        json!({"command": "!staccato!", "meaning": "Light, detached playing", "xmlTarget": "<staccato/>"})
    );
    assert_eq!(
        spec["Layout"][0],
        json!({"command": "%%system-break", "meaning": "New line of music"})
    );
    assert_eq!(spec.as_object().unwrap().len(), 6);
}

#[test]
fn test_missing_score_file() {
    let out = tempdir().unwrap();
    opus("http://127.0.0.1:1", out.path())
        .arg("musicxml")
        .arg(out.path().join("missing.abc"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read score"));
}
