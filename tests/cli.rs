use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn semwrap() -> Command {
    let mut cmd = Command::cargo_bin("semwrap").unwrap();
    cmd.env_remove("SEMWRAP_LOG");
    cmd
}

fn init_wrap(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("wrap.json");
    semwrap()
        .args(["wrap", "init"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created wrap"));
    path
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let path = init_wrap(&dir);
    semwrap()
        .args(["wrap", "init"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    semwrap()
        .args(["wrap", "init", "--force"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn marks_flow_into_summary_and_caption() {
    let dir = TempDir::new().unwrap();
    let path = init_wrap(&dir);
    for (idx, mark) in [("1", "80"), ("2", "60")] {
        semwrap()
            .args(["assessment", "set"])
            .arg(&path)
            .args(["1", idx, "--mark", mark])
            .assert()
            .success();
    }
    semwrap()
        .args(["wrap", "show"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Semester average: 68% (Upper Second (2:1))"));

    semwrap()
        .args(["wrap", "set"])
        .arg(&path)
        .args(["--name", "Ada", "--handle", "ada"])
        .assert()
        .success();
    semwrap()
        .arg("caption")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada\n"))
        .stdout(predicate::str::contains("• Semester average: 68%"))
        .stdout(predicate::str::contains("LinkedIn: @ada"))
        .stdout(predicate::str::ends_with("#SemesterWrapped #university #students\n"));
}

#[test]
fn module_weights_are_locked_while_auto() {
    let dir = TempDir::new().unwrap();
    let path = init_wrap(&dir);
    semwrap()
        .args(["module", "add"])
        .arg(&path)
        .args(["--code", "BIO101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added module 2"));
    semwrap()
        .args(["module", "set"])
        .arg(&path)
        .args(["1", "--weight", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("automatically"));

    semwrap()
        .args(["module", "auto-weights"])
        .arg(&path)
        .arg("off")
        .assert()
        .success();
    semwrap()
        .args(["module", "set"])
        .arg(&path)
        .args(["1", "--weight", "30"])
        .assert()
        .success();
    let doc = read_json(&path);
    assert_eq!(doc["modules"][0]["weight"], 30.0);
    assert_eq!(doc["modules"][1]["code"], "BIO101");
}

#[test]
fn removing_the_last_assessment_keeps_one() {
    let dir = TempDir::new().unwrap();
    let path = init_wrap(&dir);
    for _ in 0..2 {
        semwrap()
            .args(["assessment", "remove"])
            .arg(&path)
            .args(["1", "1"])
            .assert()
            .success();
    }
    let doc = read_json(&path);
    let assessments = doc["modules"][0]["assessments"].as_array().unwrap();
    assert_eq!(assessments.len(), 1);
    assert_eq!(assessments[0]["type"], "Overall");
    assert_eq!(assessments[0]["weight"], 100.0);
}

#[test]
fn zero_position_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = init_wrap(&dir);
    semwrap()
        .args(["module", "remove"])
        .arg(&path)
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("positions start at 1"));
}

#[test]
fn render_image_writes_sanitized_png() {
    let dir = TempDir::new().unwrap();
    let path = init_wrap(&dir);
    let out = dir.path().join("out");
    semwrap()
        .args(["render", "image"])
        .arg(&path)
        .arg("--out-dir")
        .arg(&out)
        .args(["--name", "My:Report*.png", "--format", "story"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1080x1920"));
    let png = out.join("MyReport.png");
    let bytes = fs::read(&png).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn render_image_failure_is_reported_without_partial_file() {
    let dir = TempDir::new().unwrap();
    let path = init_wrap(&dir);
    // A regular file where the output directory should be.
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "not a directory").unwrap();
    semwrap()
        .args(["render", "image"])
        .arg(&path)
        .arg("--out-dir")
        .arg(&blocker)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Export failed. Run with -v for details."));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
}

#[test]
fn render_scene_and_layout() {
    let dir = TempDir::new().unwrap();
    let path = init_wrap(&dir);
    semwrap()
        .args(["render", "scene"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"width\": 1200"))
        .stdout(predicate::str::contains("Module breakdown"));
    semwrap()
        .args(["render", "layout"])
        .arg(&path)
        .args(["--format", "story", "--preview", "2000x1000", "--header", "80"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Instagram (Story)"))
        .stdout(predicate::str::contains("Preview: 506x900"));
}

#[test]
fn lenient_documents_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    fs::write(
        &path,
        r#"{"modules":[{"code":"X1","assessments":[
            {"type":"Exam","name":"Exam","weight":"100","mark":"72.4"}
        ]}]}"#,
    )
    .unwrap();
    semwrap()
        .args(["wrap", "show"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Semester average: 72% (First Class)"));
}

#[test]
fn missing_document_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.json");
    semwrap()
        .arg("caption")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}
