use std::fs;
use std::path::Path;

use tempfile::TempDir;

use qrmint::manifest::{MANIFEST_HEADER, read_manifest};
use qrmint::progress::NoProgress;
use qrmint::{Error, QrmintConfig, run};

fn config_in(dir: &Path) -> QrmintConfig {
    let mut config = QrmintConfig::default();
    config.codes.seed = Some(17);
    config.image.size = 120;
    config.output.folder = dir.join("qr_codes");
    config.output.csv_file = dir.join("qr_codes.csv");
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn small_run_renders_every_code_and_writes_manifest() {
    let temp = TempDir::new().expect("tempdir");
    let mut config = config_in(temp.path());
    config.codes.total_codes = 3;
    config.codes.prefix = "AB".to_string();
    config.codes.code_length = 5;
    config.output.batch_size = 2;

    let settings = config.resolve().expect("resolve");
    let summary = run::execute(&settings, &mut NoProgress)
        .await
        .expect("run succeeds");

    assert_eq!(summary.requested, 3);
    assert_eq!(summary.generated, 3);
    assert_eq!(summary.render.succeeded, 3);
    assert_eq!(summary.render.failed(), 0);
    assert_eq!(summary.render.batch_sizes, vec![2, 1]);
    assert!(summary.bytes_written > 0);

    let manifest = fs::read_to_string(&settings.csv_file).expect("manifest exists");
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], MANIFEST_HEADER);

    let records = read_manifest(&settings.csv_file).expect("parse manifest");
    assert_eq!(records.len(), 3);
    let stamp = &records[0].generated_at;
    assert!(records.iter().all(|r| &r.generated_at == stamp));
    assert!(stamp.ends_with('Z'));

    for record in &records {
        assert!(record.code.starts_with("AB") && record.code.len() == 5);
        let image_path = settings.layout.folder().join(format!("{}.png", record.code));
        let image = image::open(&image_path).expect("image readable");
        assert_eq!((image.width(), image.height()), (120, 120));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn zero_codes_produce_header_only_manifest() {
    let temp = TempDir::new().expect("tempdir");
    let mut config = config_in(temp.path());
    config.codes.total_codes = 0;

    let settings = config.resolve().expect("resolve");
    let summary = run::execute(&settings, &mut NoProgress)
        .await
        .expect("run succeeds");

    assert_eq!(summary.generated, 0);
    assert_eq!(summary.render.succeeded, 0);
    assert_eq!(summary.render.failed(), 0);
    assert!(summary.render.batch_sizes.is_empty());
    assert!(settings.layout.folder().is_dir());

    let manifest = fs::read_to_string(&settings.csv_file).expect("manifest exists");
    assert_eq!(manifest.lines().collect::<Vec<_>>(), [MANIFEST_HEADER]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exhausted_keyspace_aborts_the_run() {
    let temp = TempDir::new().expect("tempdir");
    let mut config = config_in(temp.path());
    config.codes.total_codes = 100;
    config.codes.prefix = "AAAAAAA".to_string();
    config.codes.code_length = 8;

    let settings = config.resolve().expect("resolve");
    let result = run::execute(&settings, &mut NoProgress).await;

    assert!(matches!(result, Err(Error::ExhaustedRetries { .. })));
    assert!(!settings.csv_file.exists(), "no manifest for a failed run");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unusable_output_folder_aborts_the_run() {
    let temp = TempDir::new().expect("tempdir");
    let mut config = config_in(temp.path());
    config.codes.total_codes = 2;
    fs::write(temp.path().join("qr_codes"), b"file in the way").expect("write blocker");

    let settings = config.resolve().expect("resolve");
    let result = run::execute(&settings, &mut NoProgress).await;

    assert!(matches!(result, Err(Error::DirectoryProvision { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn existing_output_folder_is_reused() {
    let temp = TempDir::new().expect("tempdir");
    let mut config = config_in(temp.path());
    config.codes.total_codes = 1;
    fs::create_dir_all(temp.path().join("qr_codes")).expect("precreate");

    let settings = config.resolve().expect("resolve");
    let summary = run::execute(&settings, &mut NoProgress)
        .await
        .expect("run succeeds");

    assert_eq!(summary.directory, qrmint::layout::DirectoryState::Existing);
    assert_eq!(summary.render.succeeded, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn seeded_runs_issue_identical_codes() {
    let first = TempDir::new().expect("tempdir");
    let second = TempDir::new().expect("tempdir");

    let mut codes = Vec::new();
    for dir in [&first, &second] {
        let mut config = config_in(dir.path());
        config.codes.total_codes = 5;
        let settings = config.resolve().expect("resolve");
        run::execute(&settings, &mut NoProgress).await.expect("run");
        let records = read_manifest(&settings.csv_file).expect("manifest");
        codes.push(records.into_iter().map(|r| r.code).collect::<Vec<_>>());
    }

    assert_eq!(codes[0], codes[1]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn one_failed_image_does_not_abort_the_run() {
    let reference = TempDir::new().expect("tempdir");
    let mut config = config_in(reference.path());
    config.codes.total_codes = 3;
    let settings = config.resolve().expect("resolve");
    run::execute(&settings, &mut NoProgress).await.expect("run");
    let codes = read_manifest(&settings.csv_file).expect("manifest");

    // Same seed, but a directory already sits where the first image goes.
    let temp = TempDir::new().expect("tempdir");
    let mut config = config_in(temp.path());
    config.codes.total_codes = 3;
    let settings = config.resolve().expect("resolve");
    let blocked = settings.layout.folder().join(format!("{}.png", codes[0].code));
    fs::create_dir_all(&blocked).expect("block image path");

    let summary = run::execute(&settings, &mut NoProgress)
        .await
        .expect("partial failure is not fatal");

    assert_eq!(summary.generated, 3);
    assert_eq!(summary.render.succeeded, 2);
    assert_eq!(summary.render.failed(), 1);
    assert_eq!(summary.render.failures[0].code, codes[0].code);
    assert_eq!(read_manifest(&settings.csv_file).expect("manifest").len(), 3);
}
