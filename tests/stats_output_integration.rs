use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestFixture;

fn run_reflow(root: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reflow"))
        .arg(root.as_os_str())
        .arg("--no-progress")
        .args(extra)
        .env("RUST_LOG", "warn")
        .env_remove("REFLOW_LINE_JOINING")
        .output()
        .expect("Failed to run reflow")
}

fn read_stats(path: &Path) -> Value {
    let json_content = fs::read_to_string(path).expect("Failed to read stats file");
    serde_json::from_str(&json_content).expect("Failed to parse JSON")
}

/// --stats-out produces JSON with the documented structure
#[test]
fn test_stats_output_json_structure() {
    let fixture = TestFixture::new();
    fixture.create_input_file("doc.txt", "Short wrapped\nlines of text.\nSecond paragraph.");

    let stats_file = fixture.root_path.join("test_stats.json");
    let output = run_reflow(
        &fixture.root_path,
        &["--stats-out", stats_file.to_str().unwrap(), "--overwrite-all"],
    );
    assert!(output.status.success(), "reflow failed: {}", String::from_utf8_lossy(&output.stderr));

    let stats = read_stats(&stats_file);
    let obj = stats.as_object().expect("Stats should be a JSON object");
    for key in [
        "run_start",
        "total_processing_time_ms",
        "total_chars_processed",
        "total_lines_emitted",
        "overall_chars_per_sec",
        "files_processed",
        "files_skipped",
        "files_failed",
        "file_stats",
    ] {
        assert!(obj.contains_key(key), "Missing {key} field");
    }

    let file_stats = obj["file_stats"].as_array().expect("file_stats should be an array");
    assert_eq!(file_stats.len(), 1);

    let file_obj = file_stats[0].as_object().unwrap();
    for key in [
        "path",
        "chars_processed",
        "lines_in",
        "lines_emitted",
        "source_kind",
        "processing_time_ms",
        "cleaning_time_ms",
        "chars_per_sec",
        "status",
        "error",
    ] {
        assert!(file_obj.contains_key(key), "Missing {key} field");
    }

    assert_eq!(file_obj["status"], "success");
    assert!(file_obj["error"].is_null());
    assert_eq!(file_obj["source_kind"], "pdf");
    assert_eq!(file_obj["lines_in"], 3);
    assert_eq!(file_obj["lines_emitted"], 2);
    assert!(file_obj["chars_per_sec"].as_f64().unwrap() > 0.0);

    assert_eq!(obj["files_processed"], 1);
    assert_eq!(obj["files_skipped"], 0);
    assert_eq!(obj["files_failed"], 0);
    assert_eq!(obj["total_lines_emitted"], 2);
    assert!(obj["overall_chars_per_sec"].as_f64().unwrap() > 0.0);

    let aux = fixture.root_path.join("doc_reflow.txt");
    assert_eq!(
        fs::read_to_string(aux).unwrap(),
        "Short wrapped lines of text.\n\nSecond paragraph.\n"
    );
}

/// A rerun skips the completed file and does not pick up its output as input
#[test]
fn test_stats_output_second_run_skips() {
    let fixture = TestFixture::new();
    fixture.create_input_file("a.txt", "One.");
    fixture.create_input_file("sub/b.txt", "Two.");

    let stats_file = fixture.stats_path();
    let stats_arg = stats_file.to_str().unwrap();

    let output = run_reflow(&fixture.root_path, &["--stats-out", stats_arg]);
    assert!(output.status.success(), "first run failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read_stats(&stats_file)["files_processed"], 2);

    let output = run_reflow(&fixture.root_path, &["--stats-out", stats_arg]);
    assert!(output.status.success(), "second run failed: {}", String::from_utf8_lossy(&output.stderr));

    let stats = read_stats(&stats_file);
    assert_eq!(stats["files_processed"], 0);
    assert_eq!(stats["files_skipped"], 2);
    assert_eq!(stats["file_stats"].as_array().unwrap().len(), 2);
}

/// CLI flags flow into the cleaning options
#[test]
fn test_cli_option_overrides() {
    let fixture = TestFixture::new();
    let file = fixture.create_input_file("doc.txt", "joined,\nunless disabled");
    let stats_file = fixture.stats_path();

    let output = run_reflow(
        &fixture.root_path,
        &["--stats-out", stats_file.to_str().unwrap(), "--no-line-joining", "--no-paragraph-breaks"],
    );
    assert!(output.status.success(), "reflow failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fixture.read_aux_file(&file), "joined,\nunless disabled\n");

    let options_file = fixture.root_path.join("options.json");
    fs::write(&options_file, r#"{ "source": "pdf", "lineJoiningEnabled": true }"#).unwrap();
    let output = run_reflow(
        &fixture.root_path,
        &[
            "--stats-out",
            stats_file.to_str().unwrap(),
            "--overwrite-all",
            "--options",
            options_file.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "reflow failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fixture.read_aux_file(&file), "joined, unless disabled\n");
}

/// An empty tree still writes a stats file
#[test]
fn test_stats_output_empty_directory() {
    let fixture = TestFixture::new();
    let stats_file = fixture.stats_path();

    let output = run_reflow(&fixture.root_path, &["--stats-out", stats_file.to_str().unwrap()]);
    assert!(output.status.success(), "reflow failed: {}", String::from_utf8_lossy(&output.stderr));

    let stats = read_stats(&stats_file);
    assert_eq!(stats["files_processed"], 0);
    assert_eq!(stats["total_chars_processed"], 0);
    assert!(stats["file_stats"].as_array().unwrap().is_empty());
}
