/*!
 * Configuration handling for ctxdump
 *
 * Settings come from the command line and an optional TOML file. Command
 * line values win; ignore lists from both sources are combined.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ResultExt};
use crate::ignore_set::IgnoreOverrides;
use crate::monitor::DEFAULT_INTERVAL;
use crate::writer::OutputFormat;
use crate::{bail, ensure};

/// Name of the per-project config file
pub const PROJECT_CONFIG_FILE: &str = ".ctxdump.toml";

/// Smallest accepted poll interval for the monitor
pub const MIN_INTERVAL_MS: u64 = 50;

/// Command-line arguments for ctxdump
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "ctxdump",
    version = env!("CARGO_PKG_VERSION"),
    about = "Concatenate project sources into LLM context and apply pasted edits",
    long_about = "Dumps a project's source files into a single markdown, XML or JSON document for LLM assistants. \
                  With --monitor, watches the clipboard and applies whole-file or search/replace edits pasted back by the assistant."
)]
pub struct Args {
    /// Project directory to process
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output file name (defaults to .ctxdump.context.<ext>)
    pub output_file: Option<String>,

    /// Output format
    #[clap(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Comma-separated file names to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_files: Vec<String>,

    /// Comma-separated folder names to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_folders: Vec<String>,

    /// Comma-separated extensions to ignore (e.g. "log,tmp")
    #[clap(long, value_delimiter = ',')]
    pub ignore_extensions: Vec<String>,

    /// Comma-separated list of patterns to include (if specified, only matching files are included)
    #[clap(long, value_delimiter = ',')]
    pub include_patterns: Vec<String>,

    /// Number of threads to use for processing
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Respect .gitignore files
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    pub respect_gitignore: bool,

    /// Path to custom .gitignore file
    #[clap(long)]
    pub gitignore_path: Option<String>,

    /// Skip project type detection and use only the common ignore list
    #[clap(long)]
    pub no_detect: bool,

    /// Print detected project types with their confidence
    #[clap(long)]
    pub show_detection: bool,

    /// Copy output to clipboard
    #[clap(long, help = "Copy output to system clipboard")]
    pub clip: bool,

    /// Print output to stdout instead of writing a file
    #[clap(long, conflicts_with = "output_file")]
    pub stdout: bool,

    /// Watch the clipboard and apply pasted edits under the project directory
    #[clap(long)]
    pub monitor: bool,

    /// Clipboard poll interval in milliseconds
    #[clap(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Path to a config file
    #[clap(long)]
    pub config: Option<String>,

    /// Write a default config file and exit
    #[clap(long)]
    pub init_config: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,
}

/// `[output]` table of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: Option<OutputFormat>,
}

/// `[monitor]` table of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    pub interval_ms: Option<u64>,
}

/// Contents of a TOML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub ignore: IgnoreOverrides,
    pub output: OutputSection,
    pub monitor: MonitorSection,
}

impl FileConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Ok(toml::from_str(&text)?)
    }

    /// Find the config file to use
    ///
    /// An explicit path wins, then `.ctxdump.toml` in the project, then the
    /// user config directory.
    pub fn locate(explicit: Option<&Path>, target_dir: &Path) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let project = target_dir.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Some(project);
        }

        Self::default_path().filter(|path| path.is_file())
    }

    /// `<config dir>/ctxdump/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ctxdump").join("config.toml"))
    }

    /// Write a commented-free default config, refusing to overwrite
    pub fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            bail!(InvalidArgument, "Config file already exists: {}", path.display());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let defaults = FileConfig {
            ignore: IgnoreOverrides::default(),
            output: OutputSection {
                format: Some(OutputFormat::default()),
            },
            monitor: MonitorSection {
                interval_ms: Some(DEFAULT_INTERVAL.as_millis() as u64),
            },
        };
        fs::write(path, toml::to_string_pretty(&defaults)?)?;
        Ok(())
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Target directory to process
    pub target_dir: PathBuf,

    /// Output file path
    pub output_file: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// User ignore additions
    pub ignore_overrides: IgnoreOverrides,

    /// Patterns to include (if empty, include all)
    pub include_patterns: Vec<String>,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// Whether to respect .gitignore files
    pub respect_gitignore: bool,

    /// Path to custom .gitignore file
    pub gitignore_path: Option<PathBuf>,

    /// Run project type detection
    pub detect: bool,

    /// Copy output to clipboard
    pub clip: bool,

    /// Print output to stdout
    pub stdout: bool,

    /// Run the clipboard monitor instead of dumping
    pub monitor: bool,

    /// Clipboard poll interval
    pub interval: Duration,

    /// Config file that was loaded, if any
    pub config_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let format = OutputFormat::default();
        Self {
            target_dir: PathBuf::from("."),
            output_file: default_output_file(format),
            format,
            ignore_overrides: IgnoreOverrides::default(),
            include_patterns: Vec::new(),
            num_threads: 4,
            respect_gitignore: true,
            gitignore_path: None,
            detect: true,
            clip: false,
            stdout: false,
            monitor: false,
            interval: DEFAULT_INTERVAL,
            config_file: None,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments, loading the
    /// config file if one is found
    pub fn from_args(args: Args) -> Result<Self> {
        let target_dir = PathBuf::from(&args.directory_path);
        let explicit = args.config.as_ref().map(PathBuf::from);

        let located = FileConfig::locate(explicit.as_deref(), &target_dir);
        let file = match &located {
            Some(path) => {
                debug!("loading config from {}", path.display());
                Some(FileConfig::load(path)?)
            }
            None => None,
        };

        let mut config = Self::merge(args, file.unwrap_or_default());
        config.config_file = located;
        Ok(config)
    }

    /// Combine arguments with file settings
    pub fn merge(args: Args, file: FileConfig) -> Self {
        let format = args
            .format
            .or(file.output.format)
            .unwrap_or_default();

        let output_file = args
            .output_file
            .map(PathBuf::from)
            .unwrap_or_else(|| default_output_file(format));

        let interval_ms = args.interval_ms.or(file.monitor.interval_ms);

        let mut ignore_overrides = file.ignore;
        ignore_overrides.merge(IgnoreOverrides {
            files: args.ignore_files,
            folders: args.ignore_folders,
            extensions: args.ignore_extensions,
        });

        Self {
            target_dir: PathBuf::from(args.directory_path),
            output_file,
            format,
            ignore_overrides,
            include_patterns: args.include_patterns,
            num_threads: args.threads,
            respect_gitignore: args.respect_gitignore,
            gitignore_path: args.gitignore_path.map(PathBuf::from),
            detect: !args.no_detect,
            clip: args.clip,
            stdout: args.stdout,
            monitor: args.monitor,
            interval: interval_ms.map_or(DEFAULT_INTERVAL, Duration::from_millis),
            config_file: None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        if !self.monitor && !self.stdout {
            if let Some(parent) = self.output_file.parent() {
                ensure!(
                    parent.as_os_str().is_empty() || parent.exists(),
                    PathNotFound,
                    "Output directory not found: {}",
                    parent.display()
                );
            }
        }

        if let Some(path) = &self.gitignore_path {
            ensure!(
                path.exists(),
                PathNotFound,
                "Custom .gitignore file not found: {}",
                path.display()
            );
        }

        ensure!(
            self.interval.as_millis() as u64 >= MIN_INTERVAL_MS,
            Config,
            "Poll interval must be at least {} ms",
            MIN_INTERVAL_MS
        );
        ensure!(self.num_threads > 0, Config, "Thread count must be positive");

        Ok(())
    }
}

/// `.ctxdump.context.<ext>` for the given format
pub fn default_output_file(format: OutputFormat) -> PathBuf {
    PathBuf::from(format!(".ctxdump.context.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("ctxdump").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_defaults() {
        let config = Config::merge(parse(&[]), FileConfig::default());
        assert_eq!(config.target_dir, PathBuf::from("."));
        assert_eq!(config.format, OutputFormat::Markdown);
        assert_eq!(config.output_file, PathBuf::from(".ctxdump.context.md"));
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert!(config.respect_gitignore);
        assert!(config.detect);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [ignore]
            folders = ["fixtures"]
            extensions = ["snap"]

            [output]
            format = "json"

            [monitor]
            interval_ms = 250
            "#,
        )
        .unwrap();

        let config = Config::merge(
            parse(&["--format", "xml", "--ignore-folders", "generated,tmp2"]),
            file,
        );
        assert_eq!(config.format, OutputFormat::Xml);
        assert_eq!(config.interval, Duration::from_millis(250));
        assert_eq!(
            config.ignore_overrides.folders,
            vec!["fixtures", "generated", "tmp2"]
        );
        assert_eq!(config.ignore_overrides.extensions, vec!["snap"]);
    }

    #[test]
    fn test_respect_gitignore_can_be_disabled() {
        let config = Config::merge(parse(&["--respect-gitignore", "false"]), FileConfig::default());
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn test_validate_rejects_missing_dir() {
        let config = Config {
            target_dir: PathBuf::from("/nonexistent/ctxdump"),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_interval() {
        let dir = tempdir().unwrap();
        let config = Config {
            target_dir: dir.path().to_path_buf(),
            interval: Duration::from_millis(1),
            monitor: true,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_write_and_load_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        FileConfig::write_default(&path).unwrap();
        let loaded = FileConfig::load(&path).unwrap();
        assert_eq!(loaded.output.format, Some(OutputFormat::Markdown));
        assert_eq!(loaded.monitor.interval_ms, Some(1000));

        // Never clobbers an existing file
        assert!(FileConfig::write_default(&path).is_err());
    }

    #[test]
    fn test_project_config_is_located() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILE), "").unwrap();
        assert_eq!(
            FileConfig::locate(None, dir.path()),
            Some(dir.path().join(PROJECT_CONFIG_FILE))
        );
    }
}
