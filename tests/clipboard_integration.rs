/*!
 * Integration tests for clipboard functionality
 */

use std::env;
use std::fs;
use std::process::Command;

use tempfile::tempdir;

#[test]
#[ignore] // This test requires tmux to be running and is ignored by default
          // To run this test manually use: cargo test --test clipboard_integration -- --ignored
fn test_clip_flag() {
    if env::var("TMUX").is_err() {
        return;
    }

    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join("main.go"),
        "package main\n\nfunc main() {}\n",
    )
    .unwrap();
    let output_file = temp_dir.path().join("output.md");

    // The command format is: ctxdump [OPTIONS] [DIRECTORY_PATH] [OUTPUT_FILE]
    let status = Command::new(env!("CARGO_BIN_EXE_ctxdump"))
        .args([
            "--clip",
            &temp_dir.path().to_string_lossy(),
            &output_file.to_string_lossy(),
        ])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(output_file.exists());

    let dumped = fs::read_to_string(&output_file).unwrap();
    let clipboard_output = Command::new("tmux").args(["show-buffer"]).output().unwrap();
    let clipboard_content = String::from_utf8_lossy(&clipboard_output.stdout);

    assert_eq!(dumped, clipboard_content);
    assert!(dumped.contains("```go // main.go"));
}
