/*!
 * Heuristic project-type detection
 *
 * Every rule in the table is scored independently against a snapshot of the
 * project root. Scanning problems only ever lower a rule's score; detection
 * itself cannot fail.
 */

mod rules;

pub use rules::{find_rule, ManifestCheck, ProjectRule, CONTENT_SCAN_DEPTH, RULES, SOURCE_DIRS};

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::matcher::{is_glob, matches};

/// Weight of a matching root file
pub const FILE_WEIGHT: f64 = 3.0;
/// Weight of a generic manifest whose dependency check failed
pub const UNVERIFIED_MANIFEST_WEIGHT: f64 = 0.5;
/// Weight of a matching folder
pub const FOLDER_WEIGHT: f64 = 2.0;
/// Weight of a matching content pattern
pub const CONTENT_WEIGHT: f64 = 1.0;
/// Raw score a rule needs to be reported at all
pub const MIN_SCORE: f64 = 1.0;
/// Candidates this close to a cluster leader are ordered by priority
pub const PRIORITY_DELTA: f64 = 0.2;
/// Number of names returned by [`ProjectDetector::detect`]
pub const MAX_DETECTED: usize = 3;

/// Manifests larger than this are not read for the dependency check
const MAX_MANIFEST_BYTES: u64 = 1_048_576;

/// A rule that survived scoring
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCandidate {
    /// Rule name
    pub name: String,
    /// Rule priority
    pub priority: i32,
    /// Normalized score in [0, 1]
    pub confidence: f64,
}

/// Scores directories against a set of project rules
#[derive(Debug, Clone)]
pub struct ProjectDetector {
    rules: Vec<ProjectRule>,
}

impl Default for ProjectDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDetector {
    /// Create a detector over the built-in rule table
    pub fn new() -> Self {
        Self {
            rules: RULES.clone(),
        }
    }

    /// Create a detector over a custom rule table
    pub fn with_rules(rules: Vec<ProjectRule>) -> Self {
        Self { rules }
    }

    /// Names of the most likely project types, most confident first
    pub fn detect(&self, root: &Path) -> Vec<String> {
        top_names(&self.detect_candidates(root))
    }

    /// Every surviving candidate, ranked
    pub fn detect_candidates(&self, root: &Path) -> Vec<DetectionCandidate> {
        let view = DirectoryView::capture(root);

        let candidates: Vec<DetectionCandidate> = self
            .rules
            .par_iter()
            .filter_map(|rule| score_rule(rule, &view))
            .collect();

        let ranked = rank(candidates);
        for candidate in &ranked {
            debug!(
                name = %candidate.name,
                confidence = candidate.confidence,
                priority = candidate.priority,
                "project type candidate"
            );
        }
        ranked
    }
}

/// Snapshot of the listings a detection run needs
#[derive(Debug)]
struct DirectoryView {
    root: PathBuf,
    /// File names directly under the root
    top_level_files: Vec<String>,
    /// File names from the shallow recursive scan
    content_names: Vec<String>,
}

impl DirectoryView {
    fn capture(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            top_level_files: list_top_level_files(root),
            content_names: collect_content_names(root, CONTENT_SCAN_DEPTH),
        }
    }

    fn file_indicator_present(&self, pattern: &str) -> bool {
        if is_glob(pattern) {
            self.top_level_files.iter().any(|name| matches(pattern, name))
        } else {
            self.root.join(pattern).exists()
        }
    }

    fn folder_present(&self, folder: &str) -> bool {
        self.root.join(folder).is_dir()
    }

    fn content_present(&self, pattern: &str) -> bool {
        self.content_names.iter().any(|name| matches(pattern, name))
    }

    fn manifest_declares(&self, check: &ManifestCheck) -> bool {
        let path = self.root.join(check.file);
        match fs::metadata(&path) {
            Ok(meta) if meta.len() > MAX_MANIFEST_BYTES => return false,
            Ok(_) => {}
            Err(e) => {
                debug!("skipping manifest {}: {}", path.display(), e);
                return false;
            }
        }
        match fs::read_to_string(&path) {
            Ok(text) => text
                .to_lowercase()
                .contains(&check.needle.to_lowercase()),
            Err(e) => {
                debug!("failed to read manifest {}: {}", path.display(), e);
                false
            }
        }
    }
}

/// List regular files directly under `root`
fn list_top_level_files(root: &Path) -> Vec<String> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("cannot list {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect()
}

/// Names of the first `MAX_DETECTED` ranked candidates
pub fn top_names(candidates: &[DetectionCandidate]) -> Vec<String> {
    candidates
        .iter()
        .take(MAX_DETECTED)
        .map(|c| c.name.clone())
        .collect()
}

/// Collect file names at the root and inside conventional source
/// directories, descending at most `max_depth` directory levels
pub fn collect_content_names(root: &Path, max_depth: usize) -> Vec<String> {
    WalkDir::new(root)
        .max_depth(max_depth + 1)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            SOURCE_DIRS.iter().any(|dir| *dir == name)
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("content scan error: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect()
}

/// Score a single rule; `None` when it does not qualify
fn score_rule(rule: &ProjectRule, view: &DirectoryView) -> Option<DetectionCandidate> {
    let mut raw = 0.0;
    let mut hits = 0usize;

    let content_hits = rule
        .content_patterns
        .iter()
        .filter(|pattern| view.content_present(pattern))
        .count();

    for pattern in rule.file_patterns {
        if !view.file_indicator_present(pattern) {
            continue;
        }
        // A build file on its own says nothing about the language
        if rule.requires_source && content_hits == 0 {
            continue;
        }
        raw += match rule.manifest_check {
            Some(check) if check.file == *pattern => {
                if view.manifest_declares(&check) {
                    FILE_WEIGHT
                } else {
                    UNVERIFIED_MANIFEST_WEIGHT
                }
            }
            _ => FILE_WEIGHT,
        };
        hits += 1;
    }

    for folder in rule.folder_patterns {
        if view.folder_present(folder) {
            raw += FOLDER_WEIGHT;
            hits += 1;
        }
    }

    raw += content_hits as f64 * CONTENT_WEIGHT;
    hits += content_hits;

    if hits == 0 || raw < MIN_SCORE {
        return None;
    }

    Some(DetectionCandidate {
        name: rule.name.to_string(),
        priority: rule.priority,
        confidence: (raw / full_evidence(rule)).min(1.0),
    })
}

/// Score of one full-weight match for every indicator kind a rule declares
fn full_evidence(rule: &ProjectRule) -> f64 {
    let mut total = 0.0;
    if !rule.file_patterns.is_empty() {
        total += FILE_WEIGHT;
    }
    if !rule.folder_patterns.is_empty() {
        total += FOLDER_WEIGHT;
    }
    if !rule.content_patterns.is_empty() {
        total += CONTENT_WEIGHT;
    }
    // Only reachable for a rule with no indicators, which never scores
    if total == 0.0 {
        1.0
    } else {
        total
    }
}

/// Order candidates by confidence, letting priority decide inside clusters
/// of similar confidence
fn rank(mut candidates: Vec<DetectionCandidate>) -> Vec<DetectionCandidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut start = 0;
    while start < candidates.len() {
        let leader = candidates[start].confidence;
        let end = candidates[start..]
            .iter()
            .position(|c| leader - c.confidence > PRIORITY_DELTA)
            .map_or(candidates.len(), |offset| start + offset);

        candidates[start..end].sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| a.name.cmp(&b.name))
        });
        start = end;
    }

    candidates
}
