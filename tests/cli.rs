// End-to-end runs of the fstrace-report binary

use predicates::prelude::*;

fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
    let p = std::env::temp_dir().join(name);
    std::fs::write(&p, content).unwrap();
    p
}

#[test]
fn no_file_prints_help_and_succeeds() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fstrace-report");
    cmd.assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fstrace-report");
    cmd.arg("-v").assert().success().stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_file_exits_with_one() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fstrace-report");
    cmd.arg("/definitely/not/here/trace.log")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn three_line_fixture_reports_counts() {
    let log = temp_file("fstrace_cli_fixture.log", "sh(10): W /a\nsh(10): R /a\nnot a trace line\n");
    let html = std::env::temp_dir().join("fstrace_cli_fixture.html");
    let json = std::env::temp_dir().join("fstrace_cli_fixture.json");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fstrace-report");
    cmd.arg(&log)
        .arg("--no-color")
        .arg("--html")
        .arg(&html)
        .arg("--json-path")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed 2 of 3 lines (1 errors)"));

    let report = std::fs::read_to_string(&html).unwrap();
    assert!(report.contains("<li>/a: <span class=\"count\">2</span></li>"));
    assert!(report.contains("<li>/a: <span class=\"count\">1</span></li>"));
    assert!(report.contains("data-pid=\"10\""));

    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(v["paths_count"], 1);
    assert_eq!(v["count_per_path"]["/a"], 2);
    assert_eq!(v["count_per_write_path"]["/a"], 1);
    assert_eq!(v["pid_to_process"]["10"], "sh");

    for p in [&log, &html, &json] { let _ = std::fs::remove_file(p); }
}

#[test]
fn parse_errors_do_not_fail_the_run() {
    let log = temp_file("fstrace_cli_garbage.log", "garbage\nmore garbage\n");
    let html = std::env::temp_dir().join("fstrace_cli_garbage.html");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fstrace-report");
    cmd.arg(&log).arg("-q").arg("--html").arg(&html).assert().success();
    assert!(std::fs::read_to_string(&html).unwrap().contains("id=\"pids\""));
    let _ = std::fs::remove_file(&log);
    let _ = std::fs::remove_file(&html);
}
