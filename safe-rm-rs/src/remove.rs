//! The rm path: resolve, check, protect, confirm, trash.

use crate::args::Cli;
use crate::ui::Prompt;
use anyhow::{bail, Result};
use safe_rm_core::prelude::*;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

/// Everything the per-path removal needs, resolved once per invocation.
pub struct Remover<'a> {
    pub cli: &'a Cli,
    pub config: &'a Config,
    pub rules: &'a ProtectionRules,
    pub trash: &'a Trash,
    pub cwd: PathBuf,
}

impl Remover<'_> {
    /// Asks once up front under `-I`. Returns false when the user declines.
    pub fn confirm_batch<R: BufRead>(&self, prompt: &mut Prompt<R>) -> Result<bool> {
        let cli = self.cli;
        if !cli.interactive_once || cli.force {
            return Ok(true);
        }
        if cli.files.len() <= 3 && !cli.recursive {
            return Ok(true);
        }
        let recursively = if cli.recursive { " recursively" } else { "" };
        prompt.yes_no(&format!(
            "safe-rm: remove {} argument(s){recursively}? ",
            cli.files.len()
        ))
    }

    /// Trashes one command-line operand.
    pub fn remove<R: BufRead>(&self, path: &Path, prompt: &mut Prompt<R>) -> Result<()> {
        let cli = self.cli;
        let abs = absolutize(path, &self.cwd);

        let metadata = match fs::symlink_metadata(&abs) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if cli.force {
                    return Ok(());
                }
                return Err(CoreError::NotFound(abs).into());
            }
            Err(err) => return Err(CoreError::io(&abs, err).into()),
        };

        if metadata.is_dir() && !cli.recursive {
            if !cli.remove_empty_dirs {
                bail!("Is a directory");
            }
            if fs::read_dir(&abs)?.next().is_some() {
                bail!("Directory not empty");
            }
        }

        let status = classify(&RealFileSystem, self.rules, &abs, cli.recursive);
        if status.protected {
            let confirmation = match self.config.protected_behavior {
                ProtectedBehavior::Confirm if !cli.force => {
                    eprintln!("WARNING: You are about to remove a protected path!");
                    eprintln!("  Path: {}", abs.display());
                    eprintln!("  Reason: {}", status.reason);
                    Some(prompt.confirm_phrase()?)
                }
                _ => None,
            };
            authorize(
                self.config.protected_behavior,
                &abs,
                &status,
                confirmation.as_deref(),
            )?;
        }

        if cli.interactive
            && !cli.force
            && !prompt.yes_no(&format!("safe-rm: remove '{}'? ", path.display()))?
        {
            return Ok(());
        }

        let outcome = self.trash.put(&abs)?;
        if let Some(warning) = &outcome.warning {
            if self.config.verbose_warnings {
                eprintln!("safe-rm: warning: failed to write metadata: {warning}");
            }
        }
        if cli.verbose {
            println!(
                "removed '{}' (moved to trash: {})",
                path.display(),
                outcome.location.display()
            );
        }
        Ok(())
    }
}
