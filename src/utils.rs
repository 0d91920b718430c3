/*!
 * Utility functions for ctxdump
 */

use std::io;
use std::path::Path;
use std::sync::Arc;

use ignore::WalkBuilder;
use indicatif::ProgressBar;
use walkdir::WalkDir;

use crate::config::Config;
use crate::ignore_set::IgnoreSet;
use crate::scanner::Scanner;

/// Count the files a scan will visit, for progress tracking
pub fn count_files(dir: &Path, config: &Config, ignore: &IgnoreSet) -> io::Result<u64> {
    let scanner = Arc::new(Scanner::new(
        config.clone(),
        ignore.clone(),
        Arc::new(ProgressBar::hidden()),
    ));
    let mut count = 0;

    if config.respect_gitignore {
        let mut walker = WalkBuilder::new(dir);
        walker.require_git(false);

        if let Some(gitignore_path) = &config.gitignore_path {
            walker.add_custom_ignore_filename(gitignore_path);
        }

        let filter = Arc::clone(&scanner);
        walker.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            entry.depth() == 0 || !filter.should_ignore(entry.path(), is_dir)
        });

        for entry in walker.build().filter_map(Result::ok) {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) && scanner.should_include(entry.path()) {
                count += 1;
            }
        }
    } else {
        let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
            entry.depth() == 0 || !scanner.should_ignore(entry.path(), entry.file_type().is_dir())
        });

        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_dir() && scanner.should_include(entry.path()) {
                count += 1;
            }
        }
    }

    Ok(count)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
