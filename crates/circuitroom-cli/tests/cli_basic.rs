//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temp
//! directory, so the database and config live there.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;

struct Cli {
    home: TempDir,
}

impl Cli {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_circuitroom"));
        cmd.args(args)
            .env("HOME", self.home.path())
            .env_remove("CIRCUITROOM_ENV")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run and return (stdout, stderr, code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        self.run_with_stdin(args, "")
    }

    fn run_with_stdin(&self, args: &[&str], input: &str) -> (String, String, i32) {
        self.run_with_stdin_after(args, Duration::ZERO, input)
    }

    /// Like `run_with_stdin`, but waits before writing `input`.
    fn run_with_stdin_after(
        &self,
        args: &[&str],
        delay: Duration,
        input: &str,
    ) -> (String, String, i32) {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn circuitroom");
        {
            let mut stdin = child.stdin.take().unwrap();
            std::thread::sleep(delay);
            stdin.write_all(input.as_bytes()).unwrap();
        }
        let output = child.wait_with_output().unwrap();
        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code().unwrap_or(-1),
        )
    }

    fn ok(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "{args:?} failed: {stderr}");
        stdout
    }

    fn steps_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.ok(&["step", "list", "--json"])).unwrap()
    }
}

#[test]
fn empty_draft_lists_nothing() {
    let cli = Cli::new();
    let out = cli.ok(&["step", "list"]);
    assert!(out.contains("No steps yet"));
    let json = cli.steps_json();
    assert_eq!(json["steps"].as_array().unwrap().len(), 0);
    assert_eq!(json["total_rounds"], 1);
}

#[test]
fn add_edit_move_remove_steps() {
    let cli = Cli::new();
    cli.ok(&["step", "add", "Squats", "40"]);
    cli.ok(&["step", "pause", "0:20"]);
    cli.ok(&["step", "add", "Burpees", "1:00"]);

    let json = cli.steps_json();
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[1]["kind"], "pause");
    assert_eq!(steps[2]["duration_secs"], 60);

    let burpees = steps[2]["id"].as_str().unwrap().to_string();
    cli.ok(&["step", "edit", &burpees[..8], "--label", "Lunges", "--duration", "30"]);
    cli.ok(&["step", "move", &burpees, "1"]);

    let json = cli.steps_json();
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps[0]["label"], "Lunges");
    assert_eq!(steps[0]["duration_secs"], 30);

    cli.ok(&["step", "remove", &burpees]);
    assert_eq!(cli.steps_json()["steps"].as_array().unwrap().len(), 2);

    let out = cli.ok(&["step", "list"]);
    assert!(out.contains("Squats"));
    assert!(out.contains("PAUSE"));
    assert!(out.contains("Total time: 01:00"));
}

#[test]
fn invalid_input_fails() {
    let cli = Cli::new();
    let (_, stderr, code) = cli.run(&["step", "add", "Squats", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid duration"));

    let (_, stderr, code) = cli.run(&["rounds", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: "));

    let (_, _, code) = cli.run(&["step", "remove", "ffffffff"]);
    assert_eq!(code, 1);
}

#[test]
fn rounds_persist() {
    let cli = Cli::new();
    assert!(cli.ok(&["rounds"]).contains("Total rounds: 1"));
    cli.ok(&["rounds", "3"]);
    assert_eq!(cli.steps_json()["total_rounds"], 3);
}

#[test]
fn workouts_save_load_delete() {
    let cli = Cli::new();
    assert!(cli.ok(&["workout", "list"]).contains("No saved workouts"));

    cli.ok(&["workout", "load", "example"]);
    assert_eq!(cli.steps_json()["steps"].as_array().unwrap().len(), 8);

    cli.ok(&["workout", "save", "legs"]);
    cli.ok(&["step", "clear"]);
    cli.ok(&["workout", "load", "legs"]);
    assert_eq!(cli.steps_json()["steps"].as_array().unwrap().len(), 8);

    let names: Vec<String> =
        serde_json::from_str(&cli.ok(&["workout", "list", "--json"])).unwrap();
    assert_eq!(names, ["legs"]);

    cli.ok(&["workout", "delete", "legs"]);
    let (_, stderr, code) = cli.run(&["workout", "load", "legs"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("legs"));
}

#[test]
fn config_get_set_reset() {
    let cli = Cli::new();
    assert_eq!(cli.ok(&["config", "get", "sound.enabled"]).trim(), "true");
    cli.ok(&["config", "set", "session.pre_roll_secs", "5"]);
    assert_eq!(cli.ok(&["config", "get", "session.pre_roll_secs"]).trim(), "5");
    assert!(cli.ok(&["config", "list"]).contains("session.pre_roll_secs = 5"));

    let (_, _, code) = cli.run(&["config", "set", "sound.volume", "loud"]);
    assert_eq!(code, 1);
    let (_, _, code) = cli.run(&["config", "get", "nope"]);
    assert_eq!(code, 1);

    cli.ok(&["config", "reset"]);
    assert_eq!(cli.ok(&["config", "get", "session.pre_roll_secs"]).trim(), "3");
}

#[test]
fn run_empty_workout_fails() {
    let cli = Cli::new();
    let (_, stderr, code) = cli.run(&["run", "--mute"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no steps"));
}

#[test]
fn run_to_completion_emits_events() {
    let cli = Cli::new();
    cli.ok(&["config", "set", "session.pre_roll_secs", "1"]);
    cli.ok(&["config", "set", "session.finish_secs", "1"]);
    cli.ok(&["step", "add", "Jump", "1"]);

    let out = cli.ok(&["run", "--mute", "--json"]);
    let types: Vec<String> = out
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types.first().map(String::as_str), Some("session_started"));
    assert!(types.iter().any(|t| t == "step_started"));
    assert_eq!(types.last().map(String::as_str), Some("session_completed"));
}

#[test]
fn run_stops_on_q() {
    let cli = Cli::new();
    cli.ok(&["step", "add", "Plank", "60"]);
    let (out, stderr, code) = cli.run_with_stdin(&["run", "--mute", "--json"], "q\n");
    assert_eq!(code, 0, "{stderr}");
    assert!(out.lines().last().unwrap().contains("session_stopped"));
}

#[test]
fn stop_during_finishing_reports_stopped() {
    let cli = Cli::new();
    cli.ok(&["config", "set", "session.pre_roll_secs", "1"]);
    cli.ok(&["config", "set", "session.finish_secs", "30"]);
    cli.ok(&["step", "add", "Jump", "1"]);

    // Pre-roll and the step are over after ~2s; finishing runs for 30s more.
    let (out, stderr, code) =
        cli.run_with_stdin_after(&["run", "--mute"], Duration::from_millis(3_500), "q\n");
    assert_eq!(code, 0, "{stderr}");
    assert!(out.contains("Done!"), "{out}");
    assert!(out.contains("Workout stopped."), "{out}");
    assert!(!out.contains("Workout complete."), "{out}");
}

#[test]
fn text_run_to_completion_reports_complete() {
    let cli = Cli::new();
    cli.ok(&["config", "set", "session.pre_roll_secs", "1"]);
    cli.ok(&["config", "set", "session.finish_secs", "1"]);
    cli.ok(&["step", "add", "Jump", "1"]);

    let out = cli.ok(&["run", "--mute"]);
    assert!(out.contains("Workout complete."), "{out}");
    assert!(!out.contains("Workout stopped."), "{out}");
}

#[test]
fn completions_are_generated() {
    let cli = Cli::new();
    let out = cli.ok(&["completions", "bash"]);
    assert!(out.contains("circuitroom"));
}
