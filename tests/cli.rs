use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn setup_test_directory() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), "Hello 😀 World".as_bytes());
    write_file(&dir.path().join("b.md"), b"No emoji here");
    write_file(&dir.path().join("c.bin"), &[0x80, 0x81, 0xff, 0x00]);
    dir
}

fn noemoji() -> Command {
    let mut cmd = Command::cargo_bin("noemoji").unwrap();
    cmd.arg("--no-progress");
    cmd
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn missing_target_exits_with_one() {
    let dir = tempdir().unwrap();

    noemoji()
        .arg(dir.path().join("nope"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("directory does not exist"));
}

#[test]
fn file_target_exits_with_one() {
    let dir = setup_test_directory();

    noemoji()
        .arg(dir.path().join("a.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn dry_run_reports_and_keeps_files() {
    let dir = setup_test_directory();

    noemoji()
        .arg(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("File types: all"))
        .stdout(predicate::str::contains("[preview] report"))
        .stdout(predicate::str::contains("a.txt"))
        .stdout(predicate::str::contains("count: 1  found: 😀"))
        .stdout(predicate::str::contains("Skipped file types: .bin"))
        .stdout(predicate::str::contains("b.md").not());

    assert_eq!(read(dir.path(), "a.txt"), "Hello 😀 World");
}

#[test]
fn whitelist_excludes_other_types() {
    let dir = setup_test_directory();

    noemoji()
        .arg(dir.path())
        .args(["--ext", ".md", "-n"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No files containing emoji found"))
        .stdout(predicate::str::contains("Skipped file types: .bin, .txt"));
}

#[test]
fn yes_flag_cleans_without_prompt() {
    let dir = setup_test_directory();

    noemoji()
        .arg(dir.path())
        .arg("-y")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned 1 file(s), removed 1 emoji"))
        .stdout(predicate::str::contains("(yes/no)").not());

    assert_eq!(read(dir.path(), "a.txt"), "Hello  World");
    assert_eq!(read(dir.path(), "b.md"), "No emoji here");
    assert_eq!(
        fs::read(dir.path().join("c.bin")).unwrap(),
        vec![0x80, 0x81, 0xff, 0x00]
    );
}

#[test]
fn declining_the_prompt_changes_nothing() {
    let dir = setup_test_directory();

    noemoji()
        .arg(dir.path())
        .write_stdin("no\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(yes/no)"))
        .stdout(predicate::str::contains("Cancelled"));

    assert_eq!(read(dir.path(), "a.txt"), "Hello 😀 World");
}

#[test]
fn closed_stdin_counts_as_cancel() {
    let dir = setup_test_directory();

    noemoji()
        .arg(dir.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));

    assert_eq!(read(dir.path(), "a.txt"), "Hello 😀 World");
}

#[test]
fn accepting_the_prompt_cleans() {
    let dir = setup_test_directory();

    noemoji()
        .arg(dir.path())
        .write_stdin("Y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removing emoji"));

    assert_eq!(read(dir.path(), "a.txt"), "Hello  World");
}

#[test]
fn exclude_list_protects_files() {
    let dir = setup_test_directory();
    write_file(&dir.path().join("data.json"), "{\"x\": \"🎉\"}".as_bytes());

    noemoji()
        .arg(dir.path())
        .args(["-x", "json", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exclude: .json"));

    assert_eq!(read(dir.path(), "data.json"), "{\"x\": \"🎉\"}");
    assert_eq!(read(dir.path(), "a.txt"), "Hello  World");
}

#[test]
fn streamed_files_are_cleaned() {
    let dir = tempdir().unwrap();
    let mut content = "filler line\n".repeat(50);
    content.push_str("end 🎉🎉🎉done");
    write_file(&dir.path().join("big.log"), content.as_bytes());

    noemoji()
        .arg(dir.path())
        .args(["--large-file-threshold", "100b", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed 3 emoji"));

    assert_eq!(read(dir.path(), "big.log"), content.replace('🎉', ""));
}

#[test]
fn nothing_found_is_success() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("b.md"), b"No emoji here");

    noemoji()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No files containing emoji found"))
        .stdout(predicate::str::contains("(yes/no)").not());
}

#[test]
fn unicode_engine_is_selectable() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("legal.txt"), "Acme© 2024 ✅".as_bytes());

    noemoji()
        .arg(dir.path())
        .args(["--engine", "unicode", "-n"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Engine: unicode properties"))
        .stdout(predicate::str::contains("count: 2"));
}

#[test]
fn invalid_threshold_is_rejected() {
    let dir = setup_test_directory();

    noemoji()
        .arg(dir.path())
        .args(["--large-file-threshold", "huge"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid --large-file-threshold"));
}
