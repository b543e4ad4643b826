use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tt-{nanos}-{file_name}"))
}

fn run(store_path: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tt"))
        .args(args)
        .env("TT_STORE_PATH", store_path)
        .env("TT_CONFIG_PATH", temp_path("no-config.json"))
        .output()
        .expect("failed to run tt")
}

const STORE: &str = "1 1700000000- \"Task 1\"\n2 1700000100- \"Task 2\"\n";

#[test]
fn start_moves_the_active_marker() {
    let store_path = temp_path("cli-start.txt");
    std::fs::write(&store_path, STORE).unwrap();

    let first = run(&store_path, &["start", "1"]);
    let second = run(&store_path, &["start", "2"]);
    let stored = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(first.status.success());
    assert!(second.status.success());
    assert_eq!(
        String::from_utf8_lossy(&second.stdout).trim(),
        "Started task: Task 2 (2)"
    );
    assert_eq!(
        stored,
        "1 1700000000- \"Task 1\"\n2! 1700000100- \"Task 2\"\n"
    );
}

#[test]
fn stop_clears_the_active_task() {
    let store_path = temp_path("cli-stop.txt");
    std::fs::write(&store_path, "1! 1700000000- \"Task 1\"\n").unwrap();

    let stopped = run(&store_path, &["stop"]);
    let again = run(&store_path, &["stop"]);
    let stored = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(stopped.status.success());
    assert_eq!(stored, STORE.lines().next().unwrap().to_string() + "\n");
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("no active task"));
}

#[test]
fn done_and_reopen_toggle_the_end_time() {
    let store_path = temp_path("cli-done.txt");
    std::fs::write(&store_path, STORE).unwrap();

    let done = run(&store_path, &["done", "2"]);
    let finished = std::fs::read_to_string(&store_path).unwrap();
    let done_again = run(&store_path, &["done", "2"]);
    let reopen = run(&store_path, &["reopen", "2"]);
    let reopened = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(done.status.success());
    let line = finished.lines().nth(1).unwrap();
    assert!(line.starts_with("2 1700000100-"));
    assert!(!line.starts_with("2 1700000100- "));

    assert!(!done_again.status.success());
    assert!(String::from_utf8_lossy(&done_again.stderr).contains("task already finished"));

    assert!(reopen.status.success());
    assert_eq!(reopened, STORE);
}

#[test]
fn finishing_the_active_task_keeps_it_active() {
    let store_path = temp_path("cli-done-active.txt");
    std::fs::write(&store_path, "1! 1700000000- \"Task 1\"\n").unwrap();

    let done = run(&store_path, &["done", "1"]);
    let stored = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(done.status.success());
    assert!(stored.starts_with("1! 1700000000-17"));
}

#[test]
fn delete_removes_the_task() {
    let store_path = temp_path("cli-delete.txt");
    std::fs::write(&store_path, "1 1700000000- \"Task 1\"\n2! 1700000100- \"Task 2\"\n").unwrap();

    let deleted = run(&store_path, &["delete", "2"]);
    let stored = std::fs::read_to_string(&store_path).unwrap();
    let missing = run(&store_path, &["delete", "2"]);
    std::fs::remove_file(&store_path).ok();

    assert!(deleted.status.success());
    assert_eq!(
        String::from_utf8_lossy(&deleted.stdout).trim(),
        "Deleted task: Task 2 (2)"
    );
    assert_eq!(stored, "1 1700000000- \"Task 1\"\n");
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("ERROR: not_found - task 2 not found"));
}

#[test]
fn malformed_store_is_reported_and_left_alone() {
    let store_path = temp_path("cli-malformed.txt");
    let corrupt = "1! 10- \"a\"\n2! 20- \"b\"\n";
    std::fs::write(&store_path, corrupt).unwrap();

    let output = run(&store_path, &["start", "1"]);
    let stored = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: malformed_input - line 2"));
    assert_eq!(stored, corrupt);
}
