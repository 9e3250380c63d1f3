use std::path::PathBuf;
use std::process::exit;
use std::sync::atomic::Ordering;

mod args;
mod config;

use anyhow::{bail, Result};
use config::Config;
use rustix::process::{geteuid, kill_process, Pid, Signal};
use sdesk_console::{due_to, success, SdeskLayer, WRITER};
use sdesk_pm::{Pacman, ReconcileReport, Updater, SUBPROCESS};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

fn main() {
    ctrlc::set_handler(single_handler).expect(
        "sdesk-update could not initialize SIGINT handler.\n\nPlease restart your system.",
    );

    let code = match try_main() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            error!("{e}");
            e.chain().skip(1).for_each(|cause| {
                due_to!("{cause}");
            });
            1
        }
    };

    exit(code);
}

fn try_main() -> Result<i32> {
    let matches = args::command_builder().get_matches();

    if matches.get_flag("no_color") {
        sdesk_console::console::set_colors_enabled(false);
        sdesk_console::console::set_colors_enabled_stderr(false);
    }

    init_logger(matches.get_flag("debug"));

    debug!("sdesk-update version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::read(matches.get_one::<PathBuf>("config").map(|x| x.as_path()))?;
    debug!("Config: {config:?}");

    let path_arg = |id: &str| matches.get_one::<PathBuf>(id).cloned();

    let lock_file = path_arg("lock_file").unwrap_or_else(|| config.lock_file());
    let directives = path_arg("directives").unwrap_or_else(|| config.directives());
    let dbpath = path_arg("dbpath").unwrap_or_else(|| config.dbpath());
    let timeout_secs = matches
        .get_one::<u64>("timeout")
        .copied()
        .unwrap_or_else(|| config.timeout_secs());
    let dry_run = matches.get_flag("dry_run");
    let strict = matches.get_flag("strict") || config.strict();

    if dry_run {
        info!("Running in dry-run mode, pacman will not be invoked");
    } else {
        root()?;
    }

    let mut pacman = Pacman::new(config.pacman(), &dbpath);

    let report = Updater::builder()
        .lock_file(&lock_file)
        .directives(&directives)
        .timeout_secs(timeout_secs)
        .dry_run(dry_run)
        .build()
        .run(&mut pacman)?;

    finish(&report, strict, dry_run)
}

/// Report the run and pick the exit code.
///
/// Failed pacman invocations only fail the process in strict mode.
fn finish(report: &ReconcileReport, strict: bool, dry_run: bool) -> Result<i32> {
    debug!(
        "{} action(s), {} already up to date, {} failed",
        report.actions.len(),
        report.skipped,
        report.failed.len()
    );

    if !report.is_clean() {
        warn!("{} package operation(s) failed:", report.failed.len());
        for (action, e) in &report.failed {
            warn!("{action}: {e}");
        }

        if strict {
            bail!(
                "{} base package operation(s) could not be applied",
                report.failed.len()
            );
        }
    }

    if dry_run {
        success!("Dry run finished, {} change(s) planned.", report.actions.len());
    } else {
        success!("SDesk is up-to-date.");
    }

    Ok(0)
}

fn init_logger(debug: bool) {
    if debug {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .without_time()
                    .with_target(false)
                    .with_filter(LevelFilter::DEBUG),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                SdeskLayer.with_filter(
                    EnvFilter::builder()
                        .with_default_directive(LevelFilter::INFO.into())
                        .with_env_var("SDESK_LOG")
                        .from_env_lossy(),
                ),
            )
            .init();
    }
}

fn root() -> Result<()> {
    if !geteuid().is_root() {
        bail!("Please run me as root, or pass --dry-run to preview changes");
    }

    Ok(())
}

fn single_handler() {
    // Kill subprocess
    let subprocess_pid = SUBPROCESS.load(Ordering::Relaxed);
    if subprocess_pid > 0 {
        if let Some(pid) = Pid::from_raw(subprocess_pid) {
            kill_process(pid, Signal::Term).ok();
        }
        info!("User aborted the operation");
    }

    // Show cursor before exiting.
    let _ = WRITER.show_cursor();
    exit(2);
}
