//! Runs the built binary the way the daily pipeline invokes it.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn runner() -> Command {
    Command::new(env!("CARGO_BIN_EXE_metrics-runner"))
}

#[test]
fn missing_date_prints_usage_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let output = runner().current_dir(dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), "Usage: metrics-runner YYYYMMDD");
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none(), "no report expected");
}

#[test]
fn missing_inputs_print_and_write_the_error_report() {
    let dir = TempDir::new().unwrap();
    let output = runner()
        .arg("20240101")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "status: {:?}", output.status);

    let stdout = String::from_utf8(output.stdout).unwrap();
    let printed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(
        printed["error"],
        "File not found: blockchair_zcash_blocks_20240101.tsv"
    );

    let written = fs::read_to_string(dir.path().join("metrics_20240101.json")).unwrap();
    assert_eq!(written.trim(), stdout.trim());
}
