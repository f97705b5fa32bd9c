//! Drives the built binary end to end with piped stdout, so `play` always
//! takes the plain path.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn chatreplay_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_chatreplay"))
}

fn run(args: &[&str]) -> Output {
    Command::new(chatreplay_bin())
        .args(args)
        .env_remove("CHATREPLAY_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn chatreplay")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_normalized(dir: &Path) -> PathBuf {
    let path = dir.join("chat.jsonl");
    fs::write(
        &path,
        concat!(
            r#"{"offset_ms": 0, "author": "ann", "text": "first"}"#,
            "\n",
            r#"{"offset_ms": 900, "author": "bob", "text": "second"}"#,
            "\n",
            "not a record\n",
            "\n",
            r#"{"offset_ms": 2000, "author": "cid", "text": "third"}"#,
            "\n",
        ),
    )
    .expect("write log");
    path
}

fn write_live_chat(dir: &Path) -> PathBuf {
    let line = |offset: &str, author: &str, text: &str| {
        format!(
            r#"{{"replayChatItemAction":{{"actions":[{{"addChatItemAction":{{"item":{{"liveChatTextMessageRenderer":{{"message":{{"runs":[{{"text":"{text}"}}]}},"authorName":{{"simpleText":"{author}"}}}}}}}}}}],"videoOffsetTimeMsec":"{offset}"}}}}"#
        )
    };
    let path = dir.join("stream.live_chat.json");
    fs::write(
        &path,
        [
            line("-3000", "early", "hello?"),
            line("1500", "ann", "hi"),
            line("3000", "bob", "bye"),
        ]
        .join("\n"),
    )
    .expect("write log");
    path
}

#[test]
fn inspect_prints_text_summary() {
    let dir = tempdir().expect("tempdir");
    let log = write_normalized(dir.path());
    let output = run(&["inspect", log.to_str().expect("utf8 path")]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("format:       normalized"));
    assert!(text.contains("events:       3"));
    assert!(text.contains("duration:     0:00:02"));
    assert!(text.contains("1 blank, 1 dropped"));
    assert!(text.contains("line 3: invalid JSON"));
}

#[test]
fn inspect_json_detects_live_chat() {
    let dir = tempdir().expect("tempdir");
    let log = write_live_chat(dir.path());
    let output = run(&["inspect", log.to_str().expect("utf8 path"), "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let summary: Value = serde_json::from_slice(&output.stdout).expect("json summary");
    assert_eq!(summary["events"], 3);
    assert_eq!(summary["duration"], "0:00:03");
    assert_eq!(summary["first_offset_ms"], 0);
    assert_eq!(summary["report"]["parser"], "live-chat");
    assert_eq!(summary["report"]["dropped"], 0);
}

#[test]
fn plain_playback_prints_every_message_in_order() {
    let dir = tempdir().expect("tempdir");
    let log = write_normalized(dir.path());
    let output = run(&["play", log.to_str().expect("utf8 path"), "--speed", "64"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "[0:00:00] ann: first\n[0:00:00] bob: second\n[0:00:02] cid: third\n"
    );
}

#[test]
fn plain_playback_from_start_position() {
    let dir = tempdir().expect("tempdir");
    let log = write_live_chat(dir.path());
    let output = run(&[
        "play",
        log.to_str().expect("utf8 path"),
        "--plain",
        "--speed",
        "32",
        "--start",
        "0:00:01",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "[0:00:01] ann: hi\n[0:00:03] bob: bye\n");
}

#[test]
fn plain_progress_lines_follow_each_update() {
    let dir = tempdir().expect("tempdir");
    let log = write_normalized(dir.path());
    let output = run(&[
        "play",
        log.to_str().expect("utf8 path"),
        "--plain",
        "--progress",
        "--speed",
        "64",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("[0:00:00] ann: first\n"), "stdout: {text}");
    assert!(text.contains("[0:00:02] cid: third\n"));
    assert!(
        text.lines()
            .last()
            .is_some_and(|line| line.starts_with("# ") && line.ends_with("/ 0:00:02 (100%)")),
        "stdout: {text}"
    );
}

#[test]
fn start_past_end_exits_with_usage_code() {
    let dir = tempdir().expect("tempdir");
    let log = write_normalized(dir.path());
    let output = run(&["play", log.to_str().expect("utf8 path"), "--start", "0:10:00"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("past the end"), "stderr: {}", stderr(&output));
}

#[test]
fn missing_log_exits_with_one() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("nope.jsonl");
    let output = run(&["inspect", missing.to_str().expect("utf8 path")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to read"));
}

#[test]
fn log_file_receives_structured_events() {
    let dir = tempdir().expect("tempdir");
    let log = write_normalized(dir.path());
    let log_file = dir.path().join("replay.log");
    let output = run(&[
        "play",
        log.to_str().expect("utf8 path"),
        "--speed",
        "64",
        "--log-format",
        "json",
        "--log-file",
        log_file.to_str().expect("utf8 path"),
        "-v",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = fs::read_to_string(&log_file).expect("log file");
    let events: Vec<Value> = written
        .lines()
        .map(|line| serde_json::from_str(line).expect("json log line"))
        .collect();
    assert!(
        events
            .iter()
            .any(|e| e["fields"]["replay_event"] == "play")
    );
    assert!(
        events
            .iter()
            .any(|e| e["fields"]["message"] == "chat log loaded")
    );
}
