/*!
 * Effective ignore set for a dump
 *
 * Combines a common baseline, per-project-type defaults and user overrides.
 * Membership is exact name matching for files and folders and suffix
 * matching for extensions; no glob is evaluated here.
 */

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Static ignore lists for one project type
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreDefaults {
    pub files: &'static [&'static str],
    pub folders: &'static [&'static str],
    pub extensions: &'static [&'static str],
}

/// User-specified ignore additions, from the config file or the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreOverrides {
    pub files: Vec<String>,
    pub folders: Vec<String>,
    pub extensions: Vec<String>,
}

impl IgnoreOverrides {
    /// Append another set of overrides
    pub fn merge(&mut self, other: IgnoreOverrides) {
        self.files.extend(other.files);
        self.folders.extend(other.folders);
        self.extensions.extend(other.extensions);
    }

    /// Whether no override was given
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty() && self.extensions.is_empty()
    }
}

/// Files, folders and extensions excluded from a dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    pub files: BTreeSet<String>,
    pub folders: BTreeSet<String>,
    pub extensions: BTreeSet<String>,
}

impl IgnoreSet {
    /// Add static defaults
    pub fn add_defaults(&mut self, defaults: &IgnoreDefaults) {
        self.files.extend(defaults.files.iter().map(|s| s.to_string()));
        self.folders
            .extend(defaults.folders.iter().map(|s| s.to_string()));
        self.extensions
            .extend(defaults.extensions.iter().map(|s| normalize_extension(s)));
    }

    /// Add user overrides
    pub fn add_overrides(&mut self, overrides: &IgnoreOverrides) {
        self.files.extend(
            overrides
                .files
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );
        self.folders.extend(
            overrides
                .folders
                .iter()
                .map(|s| s.trim().trim_end_matches(['/', '\\']).to_string())
                .filter(|s| !s.is_empty()),
        );
        self.extensions.extend(
            overrides
                .extensions
                .iter()
                .map(|s| normalize_extension(s))
                .filter(|s| !s.is_empty()),
        );
    }

    /// Whether a file with this name is ignored
    pub fn ignores_file(&self, name: &str) -> bool {
        self.files.contains(name) || self.has_ignored_extension(name)
    }

    /// Whether a directory with this name is ignored
    pub fn ignores_folder(&self, name: &str) -> bool {
        self.folders.contains(name)
    }

    /// Whether the name ends with one of the ignored extensions
    pub fn has_ignored_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            name.len() > ext.len() + 1
                && name.ends_with(ext.as_str())
                && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
        })
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.files.len() + self.folders.len() + self.extensions.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Strip a leading `*.` or `.` from an extension
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    let ext = ext.strip_prefix("*.").unwrap_or(ext);
    ext.trim_start_matches('.').to_string()
}

/// Build the effective ignore set
///
/// The result does not depend on the order of `detected`. Unknown project
/// types contribute nothing.
pub fn resolve(detected: &[String], overrides: &IgnoreOverrides) -> IgnoreSet {
    let mut set = IgnoreSet::default();
    set.add_defaults(&COMMON_IGNORE);

    for name in detected {
        if let Some(defaults) = PROJECT_IGNORES.get(name.as_str()) {
            set.add_defaults(defaults);
        }
    }

    set.add_overrides(overrides);
    set
}

/// Baseline applied to every dump
pub static COMMON_IGNORE: IgnoreDefaults = IgnoreDefaults {
    files: &[
        // Version Control
        ".gitignore",
        ".gitattributes",
        // OS Files
        ".DS_Store",
        "Thumbs.db",
        "desktop.ini",
        "ehthumbs.db",
        ".directory",
        // Lock files
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "composer.lock",
        "Cargo.lock",
        "poetry.lock",
        "Gemfile.lock",
        // Secrets
        ".env",
        ".env.local",
    ],
    folders: &[
        // Version Control
        ".git",
        ".svn",
        ".hg",
        ".bzr",
        // IDEs & Editors
        ".idea",
        ".vscode",
        ".vs",
        // Caches & Temp
        ".cache",
        "tmp",
        "temp",
        "logs",
        // Build & Dist
        "dist",
        "build",
        "out",
        "coverage",
    ],
    extensions: &[
        // OS Files
        "lnk",
        "url",
        // Editors
        "swp",
        "swo",
        // Logs
        "log",
        // Minified bundles
        "min.js",
        "min.css",
        "map",
        // Database
        "sqlite",
        "sqlite3",
        "db",
        // Archives
        "zip",
        "tar.gz",
        "tgz",
        "rar",
        "7z",
        // Images & media
        "png",
        "jpg",
        "jpeg",
        "gif",
        "ico",
        "webp",
        "mp3",
        "mp4",
        "pdf",
        // Fonts
        "woff",
        "woff2",
        "ttf",
        "eot",
        // Native artifacts
        "exe",
        "dll",
        "so",
        "dylib",
        "o",
        "a",
    ],
};

/// Defaults registered per project type, keyed by rule name
pub static PROJECT_IGNORES: Lazy<HashMap<&'static str, IgnoreDefaults>> = Lazy::new(|| {
    let node = IgnoreDefaults {
        files: &["npm-debug.log", "yarn-error.log", ".eslintcache"],
        folders: &["node_modules", "bower_components", ".npm", ".yarn", ".pnpm-store", ".nyc_output"],
        extensions: &["tsbuildinfo"],
    };

    HashMap::from([
        ("Node.js", node),
        ("TypeScript", node),
        ("React", node),
        ("Vue", node),
        (
            "Angular",
            IgnoreDefaults {
                files: &[],
                folders: &["node_modules", ".angular"],
                extensions: &[],
            },
        ),
        (
            "Next.js",
            IgnoreDefaults {
                files: &["next-env.d.ts"],
                folders: &["node_modules", ".next", ".vercel"],
                extensions: &[],
            },
        ),
        (
            "Python",
            IgnoreDefaults {
                files: &[".python-version", ".coverage"],
                folders: &["__pycache__", ".pytest_cache", ".mypy_cache", ".tox", "venv", ".venv", "env", "develop-eggs"],
                extensions: &["pyc", "pyo", "pyd", "egg", "egg-info"],
            },
        ),
        (
            "Django",
            IgnoreDefaults {
                files: &["db.sqlite3"],
                folders: &["__pycache__", "staticfiles", "media"],
                extensions: &["pyc"],
            },
        ),
        (
            "Rust",
            IgnoreDefaults {
                files: &[],
                folders: &["target", ".cargo"],
                extensions: &["rlib", "rmeta"],
            },
        ),
        (
            "Go",
            IgnoreDefaults {
                files: &["go.sum"],
                folders: &["vendor", "bin"],
                extensions: &["test", "out"],
            },
        ),
        (
            "Java",
            IgnoreDefaults {
                files: &[".classpath", ".project", ".factorypath"],
                folders: &[".gradle", "gradle", ".maven", ".m2", "target", ".settings"],
                extensions: &["class", "jar", "war", "ear", "iml"],
            },
        ),
        (
            "Kotlin",
            IgnoreDefaults {
                files: &[],
                folders: &[".gradle", ".kotlin", "target"],
                extensions: &["class", "jar"],
            },
        ),
        (
            "C/C++",
            IgnoreDefaults {
                files: &["CMakeCache.txt", "compile_commands.json"],
                folders: &["CMakeFiles", "cmake-build-debug", "cmake-build-release"],
                extensions: &["obj", "lib", "pdb", "gch"],
            },
        ),
        (
            ".NET",
            IgnoreDefaults {
                files: &[],
                folders: &["bin", "obj", "Debug", "Release", "packages"],
                extensions: &["suo", "user", "pubxml", "nupkg"],
            },
        ),
        (
            "PHP",
            IgnoreDefaults {
                files: &[".phpunit.result.cache"],
                folders: &["vendor"],
                extensions: &[],
            },
        ),
        (
            "Ruby",
            IgnoreDefaults {
                files: &[],
                folders: &[".bundle", "vendor"],
                extensions: &["gem"],
            },
        ),
        (
            "Swift",
            IgnoreDefaults {
                files: &[],
                folders: &["Pods", ".build", "DerivedData", "xcuserdata"],
                extensions: &["xcworkspace", "ipa", "dSYM"],
            },
        ),
        (
            "Flutter",
            IgnoreDefaults {
                files: &[".flutter-plugins", ".flutter-plugins-dependencies"],
                folders: &[".dart_tool", "build", ".pub-cache"],
                extensions: &[],
            },
        ),
        (
            "Elixir",
            IgnoreDefaults {
                files: &[],
                folders: &["_build", "deps", ".elixir_ls"],
                extensions: &["beam", "ez"],
            },
        ),
    ])
});
