/*!
 * Command-line interface for ctxdump
 */

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use ctxdump::clipboard::{copy_to_clipboard, SystemClipboard};
use ctxdump::config::{Args, Config, FileConfig};
use ctxdump::detect::{self, ProjectDetector};
use ctxdump::error::CtxError;
use ctxdump::ignore_set;
use ctxdump::monitor::{CancellationToken, MonitorLoop};
use ctxdump::report::{Reporter, ScanReport};
use ctxdump::scanner::Scanner;
use ctxdump::utils::count_files;
use ctxdump::writer::OutputWriter;

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "ctxdump", &mut io::stdout());
        return Ok(());
    }

    if args.init_config {
        let path = args
            .config
            .as_ref()
            .map(PathBuf::from)
            .or_else(FileConfig::default_path)
            .ok_or_else(|| CtxError::Config("No config directory on this system".to_string()))?;
        FileConfig::write_default(&path)?;
        info!("wrote default config to {}", path.display());
        return Ok(());
    }

    let show_detection = args.show_detection;
    let config = Config::from_args(args)?;
    config.validate()?;

    if let Some(path) = &config.config_file {
        debug!("using config file {}", path.display());
    }

    if config.monitor {
        run_monitor(&config)
    } else {
        run_dump(&config, show_detection)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ctxdump={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Detect, scan, render and report
fn run_dump(config: &Config, show_detection: bool) -> io::Result<()> {
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        warn!("failed to set thread pool size: {}", e);
    }

    let project_types = if config.detect {
        let candidates = ProjectDetector::new().detect_candidates(&config.target_dir);
        if show_detection {
            for candidate in &candidates {
                eprintln!(
                    "🧭 {} (confidence {:.2}, priority {})",
                    candidate.name, candidate.confidence, candidate.priority
                );
            }
            if candidates.is_empty() {
                eprintln!("🧭 No project type detected");
            }
        }
        detect::top_names(&candidates)
    } else {
        Vec::new()
    };
    info!("project types: {:?}", project_types);

    let ignore = ignore_set::resolve(&project_types, &config.ignore_overrides);
    debug!("ignore set has {} entries", ignore.len());

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📊 Setup");
    progress.set_message(format!(
        "📂 Scanning directory: {}",
        config.target_dir.display()
    ));

    let total_files = match count_files(&config.target_dir, config, &ignore) {
        Ok(count) => {
            progress.set_message(format!("🔎 Found {} files to process", count));
            count
        }
        Err(e) => {
            warn!("failed to count files: {}", e);
            0
        }
    };

    progress.set_length(total_files);
    progress.set_prefix("📊 Processing");
    progress.set_message("Starting scan...");

    let ignore_entries = ignore.len();
    let scanner = Scanner::new(config.clone(), ignore, Arc::new(progress.clone()));
    let writer = OutputWriter::new(config.format).with_project_types(project_types.clone());

    let start_time = Instant::now();
    let root_node = scanner.scan()?;

    let (text, output) = if config.stdout {
        (writer.render(&root_node)?, "stdout".to_string())
    } else {
        let text = writer.write(&root_node, &config.output_file)?;
        (text, config.output_file.display().to_string())
    };
    let total_duration = start_time.elapsed();
    progress.finish_and_clear();

    if config.stdout {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
    }

    if config.clip {
        match copy_to_clipboard(&text) {
            Ok(()) => info!("copied output to clipboard"),
            Err(e) => warn!("failed to copy to clipboard: {}", e),
        }
    }

    let scanner_stats = scanner.get_statistics();
    let scan_report = ScanReport {
        output,
        duration: total_duration,
        project_types,
        ignore_entries,
        files_processed: scanner_stats.files_processed,
        total_lines: scanner_stats.total_lines,
        total_chars: scanner_stats.total_chars,
        file_details: scanner_stats.file_details,
    };
    Reporter::new().print_report(&scan_report);

    Ok(())
}

/// Watch the clipboard until interrupted
fn run_monitor(config: &Config) -> io::Result<()> {
    let root = fs::canonicalize(&config.target_dir)?;
    let clipboard = SystemClipboard::detect().map_err(CtxError::from)?;
    info!("clipboard provider: {:?}", clipboard.provider());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let token = CancellationToken::new();
    let stats = runtime.block_on(async {
        let signal_token = token.clone();
        let signal = tokio::spawn(async move {
            shutdown_signal().await;
            info!("shutdown requested");
            signal_token.cancel();
        });

        let stats = MonitorLoop::new(clipboard, root, token)
            .with_interval(config.interval)
            .run()
            .await;
        signal.abort();
        stats
    });
    // A clipboard read abandoned on cancel must not hold up exit
    runtime.shutdown_timeout(Duration::from_millis(200));

    eprintln!("\n{}", Reporter::new().generate_monitor_report(&stats));
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
