use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use barcode_card_generator::{run_pipeline, CardConfig, CardError, FontSource};

fn write_input(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("input.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn test_config(dir: &Path, input: PathBuf) -> CardConfig {
    CardConfig {
        input_path: input,
        output_path: dir.join("cards.pdf"),
        font: FontSource::Builtin,
        scratch_dir: dir.to_path_buf(),
    }
}

fn barcode_leftovers(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("barcode_"))
        })
        .collect()
}

#[test]
fn end_to_end_two_records_one_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "name,number,info\nAlice,400638133393,x\nBob,599999999999,y\n",
    );
    let config = test_config(dir.path(), input);

    let report = run_pipeline(&config).unwrap();
    assert_eq!(report.record_count, 2);
    assert_eq!(report.page_count, 1);

    let output = fs::read(&config.output_path).unwrap();
    assert!(output.starts_with(b"%PDF"));
    assert!(barcode_leftovers(dir.path()).is_empty());
}

#[test]
fn header_only_input_produces_a_blank_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "name,number,info\n");
    let config = test_config(dir.path(), input);

    let report = run_pipeline(&config).unwrap();
    assert_eq!(report.record_count, 0);
    assert_eq!(report.page_count, 1);
    assert!(config.output_path.exists());
}

#[test]
fn missing_input_fails_with_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), dir.path().join("absent.csv"));

    let result = run_pipeline(&config);
    assert!(matches!(result, Err(CardError::FileNotFound(_))));
    assert!(!config.output_path.exists());
}

#[test]
fn malformed_number_aborts_without_touching_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "name,number,info\nAlice,400638133393,x\nMallory,40063813339X,y\n",
    );
    let config = test_config(dir.path(), input);
    // A previous run's output must survive the failed run untouched.
    fs::write(&config.output_path, b"previous contents").unwrap();

    let result = run_pipeline(&config);
    assert!(matches!(result, Err(CardError::InvalidNumberFormat { .. })));
    assert_eq!(fs::read(&config.output_path).unwrap(), b"previous contents");
    // Alice's transient barcode image was already cleaned up.
    assert!(barcode_leftovers(dir.path()).is_empty());
}

#[test]
fn cli_succeeds_and_reports_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "name,number,info\nAlice,400638133393,x\nBob,599999999999,y\n",
    );
    let output_path = dir.path().join("cards.pdf");

    let output = Command::new(env!("CARGO_BIN_EXE_barcode-card-generator"))
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output_path)
        .arg("--scratch-dir")
        .arg(dir.path())
        .arg("--builtin-font")
        .output()
        .expect("run CLI");

    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Alice"));
    assert!(stdout.contains("successfully"));
    assert!(output_path.exists());
}

#[test]
fn cli_exits_nonzero_on_missing_input() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_barcode-card-generator"))
        .arg("--input")
        .arg(dir.path().join("absent.csv"))
        .arg("--output")
        .arg(dir.path().join("cards.pdf"))
        .arg("--builtin-font")
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"));
}
