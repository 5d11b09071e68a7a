#![cfg(unix)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn write_bundle(dir: &Path, env: &[&str]) {
    let spec = serde_json::json!({
        "ociVersion": "1.0.2",
        "process": { "cwd": "/", "args": ["sh"], "env": env },
        "root": { "path": "rootfs" },
    });
    std::fs::write(dir.join("config.json"), spec.to_string()).unwrap();
}

fn run_hook(dir: &Path, subcommand: &str) -> std::process::Output {
    let state = serde_json::json!({ "ociVersion": "1.0.2", "id": "c1", "pid": 1, "bundle": dir });

    let mut child = Command::new(env!("CARGO_BIN_EXE_nvhook"))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--log-file")
        .arg(dir.join("logs/hook.log"))
        .arg(subcommand)
        .env_remove("RUST_LOG")
        .env_remove("NVHOOK_DEBUG")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // No-op subcommands may exit before reading stdin.
    let _ = child
        .stdin
        .take()
        .unwrap()
        .write_all(state.to_string().as_bytes());
    child.wait_with_output().unwrap()
}

#[test]
fn test_log_file_survives_exec() {
    let temp_dir = TempDir::new().unwrap();
    write_bundle(temp_dir.path(), &["NVIDIA_VISIBLE_DEVICES=all"]);
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[nvidia-container-cli]\npath = \"/bin/true\"\n",
    )
    .unwrap();

    let output = run_hook(temp_dir.path(), "prestart");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let log = std::fs::read_to_string(temp_dir.path().join("logs/hook.log")).unwrap();
    assert!(log.contains("Executing"), "log file: {log:?}");
    assert!(log.contains("--device=all"), "log file: {log:?}");
}

#[test]
fn test_cpu_container_exits_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    write_bundle(temp_dir.path(), &["PATH=/usr/bin"]);
    std::fs::write(temp_dir.path().join("config.toml"), "").unwrap();

    let output = run_hook(temp_dir.path(), "prestart");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let log = std::fs::read_to_string(temp_dir.path().join("logs/hook.log")).unwrap();
    assert!(log.contains("nothing to configure"), "log file: {log:?}");
}

#[test]
fn test_poststop_is_a_noop() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_hook(temp_dir.path(), "poststop");
    assert!(output.status.success());
}
