//! `safe-rm`: an rm replacement that moves files into a recoverable trash.

mod args;
mod remove;
mod ui;

use anyhow::{bail, Context, Result};
use args::Cli;
use clap::Parser;
use remove::Remover;
use safe_rm_core::prelude::*;
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::{env, process};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ui::Prompt;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SAFERM_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

/// Loads the configuration, reporting overrides that were skipped.
///
/// A config file that cannot be parsed stops the run: falling back to
/// defaults would silently drop the user's protected paths.
fn load_config(environ: &HashMap<String, String>) -> Result<Config> {
    let (config, skipped) =
        Config::load(environ).context("refusing to run without a usable configuration")?;
    for err in &skipped {
        eprintln!("safe-rm: warning: {err}; ignoring it");
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<i32> {
    let environ: HashMap<String, String> = env::vars().collect();
    let config = load_config(&environ)?;
    let trash = Trash::open(&config.trash_dir, local_hostname());
    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock());

    if cli.safe_list {
        ui::render_list(trash.root(), &trash.list());
        return Ok(0);
    }
    if let Some(original) = &cli.safe_restore {
        let cwd = env::current_dir().context("resolving working directory")?;
        let outcome = trash.restore(&absolutize(original, &cwd))?;
        if let Some(warning) = &outcome.warning {
            eprintln!("safe-rm: warning: {warning}");
        }
        println!("Restored: {} -> {}", outcome.from.display(), outcome.to.display());
        return Ok(0);
    }
    if cli.safe_purge {
        let days = cli.purge_days.unwrap_or(config.retention_days);
        let report = trash.purge(days);
        ui::render_purge(&report, days);
        return Ok(if report.failures.is_empty() { 0 } else { 1 });
    }
    if cli.safe_empty {
        return empty_trash(&trash, &mut prompt);
    }

    if cli.files.is_empty() {
        if cli.force {
            return Ok(0);
        }
        bail!("missing operand");
    }

    let rules = ProtectionRules::from_config(&config);
    if rules.invalid_patterns() > 0 && config.verbose_warnings {
        eprintln!(
            "safe-rm: warning: {} protected path pattern(s) could not be parsed and are ignored",
            rules.invalid_patterns()
        );
    }
    let remover = Remover {
        cli,
        config: &config,
        rules: &rules,
        trash: &trash,
        cwd: env::current_dir().context("resolving working directory")?,
    };
    if !remover.confirm_batch(&mut prompt)? {
        return Ok(0);
    }

    let mut exit_code = 0;
    for path in &cli.files {
        if let Err(err) = remover.remove(path, &mut prompt) {
            eprintln!("safe-rm: cannot remove '{}': {err}", path.display());
            exit_code = exit_code.max(exit_code_for(&err));
        }
    }
    Ok(exit_code)
}

fn empty_trash<R: BufRead>(trash: &Trash, prompt: &mut Prompt<R>) -> Result<i32> {
    let count = trash.list().len();
    if count == 0 {
        println!("Trash is already empty.");
        return Ok(0);
    }

    println!("WARNING: This will PERMANENTLY DELETE {count} item(s) from trash!");
    println!("This action cannot be undone.");
    let confirmed = is_confirmation(&prompt.confirm_phrase()?);
    let report = trash.empty(confirmed);
    if !confirmed {
        println!("Aborted.");
        return Ok(0);
    }

    ui::render_failures("delete", &report.failures);
    println!("\nPermanently deleted {} item(s).", report.deleted);
    Ok(if report.failures.is_empty() { 0 } else { 1 })
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CoreError>()
        .map(CoreError::exit_code)
        .unwrap_or(1)
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("safe-rm: {err:#}");
            process::exit(exit_code_for(&err));
        }
    }
}
