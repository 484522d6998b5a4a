use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

use qrmint::manifest::read_manifest;

const ENV_OVERRIDES: &[&str] = &[
    "QRMINT_TOTAL_CODES",
    "QRMINT_PREFIX",
    "QRMINT_CODE_LENGTH",
    "QRMINT_SEED",
    "QRMINT_IMAGE_SIZE",
    "QRMINT_IMAGE_FORMAT",
    "QRMINT_ERROR_CORRECTION",
    "QRMINT_MARGIN",
    "QRMINT_OUTPUT_FOLDER",
    "QRMINT_CSV_FILE",
    "QRMINT_BATCH_SIZE",
    "QRMINT_LOG_FILE",
];

/// Run the binary inside `dir` with no config file or env overrides in play.
fn qrmint(dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_qrmint"));
    command
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("QRMINT_LOG_COLOR", "false")
        .args(["--output", "qr_codes", "--csv", "qr_codes.csv", "--no-progress"])
        .args(args);
    for name in ENV_OVERRIDES {
        command.env_remove(name);
    }
    command.output().expect("spawn qrmint")
}

const SMALL_RUN: &[&str] = &[
    "--total", "3", "--prefix", "AB", "--length", "5", "--seed", "17", "--size", "120",
    "--batch-size", "2", "--json",
];

#[test]
fn failed_render_still_exits_successfully() {
    // Learn the seeded codes, then block one image path in a fresh directory.
    let reference = TempDir::new().expect("tempdir");
    assert!(qrmint(reference.path(), SMALL_RUN).status.success());
    let codes = read_manifest(&reference.path().join("qr_codes.csv")).expect("manifest");

    let temp = TempDir::new().expect("tempdir");
    let blocked = temp.path().join("qr_codes").join(format!("{}.png", codes[0].code));
    fs::create_dir_all(&blocked).expect("block image path");

    let output = qrmint(temp.path(), SMALL_RUN);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["generated"], 3);
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["failures"][0]["code"], codes[0].code.as_str());
}

#[test]
fn exhausted_keyspace_exits_with_failure() {
    let temp = TempDir::new().expect("tempdir");
    let output = qrmint(
        temp.path(),
        &["--total", "100", "--prefix", "AAAAAAA", "--length", "8"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Fatal error:"), "stderr: {stderr}");
    assert!(!temp.path().join("qr_codes.csv").exists());
}

#[test]
fn blocked_output_folder_exits_with_failure() {
    let temp = TempDir::new().expect("tempdir");
    fs::write(temp.path().join("qr_codes"), b"file in the way").expect("write blocker");

    let output = qrmint(temp.path(), &["--total", "2"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Fatal error:"), "stderr: {stderr}");
}

#[test]
fn invalid_prefix_exits_with_failure() {
    let temp = TempDir::new().expect("tempdir");
    let output = qrmint(temp.path(), &["--total", "2", "--prefix", "../"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Fatal error:"), "stderr: {stderr}");
    assert!(!temp.path().join("qr_codes").exists());
}
