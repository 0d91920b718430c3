/*!
 * End-to-end checks from project detection to the rendered dump
 */

use std::fs;
use std::io;
use std::sync::Arc;

use indicatif::ProgressBar;
use tempfile::tempdir;

use ctxdump::config::Config;
use ctxdump::detect::{self, ProjectDetector, MAX_DETECTED};
use ctxdump::ignore_set::{self, IgnoreOverrides};
use ctxdump::scanner::Scanner;
use ctxdump::writer::{OutputFormat, OutputWriter};

#[test]
fn test_rust_project_dump() -> io::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    fs::write(root.join("Cargo.toml"), "[package]\nname = \"demo\"\n")?;
    fs::create_dir_all(root.join("src"))?;
    fs::write(root.join("src/main.rs"), "fn main() {}\n")?;
    fs::create_dir_all(root.join("target/debug"))?;
    fs::write(root.join("target/debug/build.log"), "compiled\n")?;

    let detected = ProjectDetector::new().detect(root);
    assert_eq!(detected.first().map(String::as_str), Some("Rust"));

    let ignore = ignore_set::resolve(&detected, &IgnoreOverrides::default());
    assert!(ignore.ignores_folder("target"));

    let config = Config {
        target_dir: root.to_path_buf(),
        output_file: root.join("dump.md"),
        respect_gitignore: false,
        ..Config::default()
    };
    let scanner = Scanner::new(config, ignore, Arc::new(ProgressBar::hidden()));
    let tree = scanner.scan()?;

    let text = OutputWriter::new(OutputFormat::Markdown)
        .with_project_types(detected)
        .render(&tree)?;

    assert!(text.contains("```rust // src/main.rs"));
    assert!(text.contains("```toml // Cargo.toml"));
    assert!(!text.contains("build.log"));
    Ok(())
}

#[test]
fn test_user_overrides_apply_without_detection() -> io::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    fs::create_dir_all(root.join("fixtures"))?;
    fs::write(root.join("fixtures/big.json"), "{}\n")?;
    fs::write(root.join("keep.py"), "print('hi')\n")?;
    fs::write(root.join("snapshot.snap"), "old\n")?;

    let overrides = IgnoreOverrides {
        files: vec![],
        folders: vec!["fixtures/".to_string()],
        extensions: vec![".snap".to_string()],
    };
    let ignore = ignore_set::resolve(&[], &overrides);

    let config = Config {
        target_dir: root.to_path_buf(),
        output_file: root.join("dump.md"),
        respect_gitignore: false,
        ..Config::default()
    };
    let scanner = Scanner::new(config, ignore, Arc::new(ProgressBar::hidden()));
    let text = OutputWriter::new(OutputFormat::Markdown).render(&scanner.scan()?)?;

    assert!(text.contains("// keep.py"));
    assert!(!text.contains("big.json"));
    assert!(!text.contains("snapshot.snap"));
    Ok(())
}

#[test]
fn test_fourth_detected_type_adds_no_ignores() -> io::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    for (manifest, source) in [
        ("Cargo.toml", "main.rs"),
        ("go.mod", "main.go"),
        ("mix.exs", "app.ex"),
        ("pubspec.yaml", "main.dart"),
    ] {
        fs::write(root.join(manifest), "")?;
        fs::write(root.join(source), "")?;
    }
    fs::create_dir_all(root.join(".elixir_ls"))?;
    fs::write(root.join(".elixir_ls/notes.txt"), "kept\n")?;

    let candidates = ProjectDetector::new().detect_candidates(root);
    assert_eq!(candidates.len(), 4);
    assert_eq!(candidates[3].name, "Elixir");

    let detected = detect::top_names(&candidates);
    assert_eq!(detected.len(), MAX_DETECTED);
    assert_eq!(detected, ProjectDetector::new().detect(root));
    assert!(!detected.contains(&"Elixir".to_string()));

    let ignore = ignore_set::resolve(&detected, &IgnoreOverrides::default());
    assert!(ignore.ignores_folder("target"));
    assert!(!ignore.ignores_folder(".elixir_ls"));

    let config = Config {
        target_dir: root.to_path_buf(),
        output_file: root.join("dump.md"),
        respect_gitignore: false,
        ..Config::default()
    };
    let scanner = Scanner::new(config, ignore, Arc::new(ProgressBar::hidden()));
    let text = OutputWriter::new(OutputFormat::Markdown).render(&scanner.scan()?)?;
    assert!(text.contains("// .elixir_ls/notes.txt"));
    Ok(())
}

#[test]
fn test_empty_directory_detects_nothing() {
    let dir = tempdir().unwrap();
    assert!(ProjectDetector::new().detect(dir.path()).is_empty());
}
