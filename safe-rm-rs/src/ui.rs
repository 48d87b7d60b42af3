use anyhow::{Context, Result};
use safe_rm_core::prelude::*;
use std::io::{self, BufRead, Write};

/// Line-oriented prompts: questions go to stderr, answers come from the
/// given reader (stdin in the binary).
pub struct Prompt<R: BufRead> {
    input: R,
}

impl<R: BufRead> Prompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Asks a question and returns the answer line; empty on end of input.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{question}").context("writing prompt")?;
        stderr.flush().context("writing prompt")?;

        let mut answer = String::new();
        self.input.read_line(&mut answer).context("reading answer")?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    /// A plain y/yes question.
    pub fn yes_no(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(question)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
    }

    /// Asks for the literal confirmation phrase.
    pub fn confirm_phrase(&mut self) -> Result<String> {
        self.ask(&format!("Type '{CONFIRMATION_PHRASE}' to confirm: "))
    }
}

pub fn render_list(trash_root: &std::path::Path, rows: &[ListEntry]) {
    if rows.is_empty() {
        println!("Trash is empty.");
        return;
    }

    println!("Items in trash ({}):\n", trash_root.display());
    println!(
        "{:<20} {:>8} {:<50} {}",
        "DELETED AT", "SIZE", "ORIGINAL PATH", "TRASH PATH"
    );
    println!("{}", "-".repeat(120));
    for row in rows {
        let size = row.size_bytes.map(print_size).unwrap_or_else(|| "?".into());
        let (deleted_at, original) = match &row.provenance {
            Provenance::Known(metadata) => (
                metadata.deleted_at.format(LISTING_TIME_FORMAT).to_string(),
                metadata.original_path.display().to_string(),
            ),
            Provenance::Unknown => ("unknown".to_string(), "unknown".to_string()),
        };
        println!(
            "{:<20} {:>8} {:<50} {}",
            deleted_at,
            size,
            original,
            row.location.display()
        );
    }
}

pub fn render_purge(report: &PurgeReport, days: u32) {
    for item in &report.purged {
        match &item.original_path {
            Some(original) => println!(
                "Purged: {} (deleted at {})",
                original.display(),
                item.deleted_at.format("%Y-%m-%d")
            ),
            None => println!("Purged: {}", item.location.display()),
        }
    }
    render_failures("purge", &report.failures);

    if report.purged.is_empty() {
        println!("No items older than {days} days found.");
    } else {
        println!("\nPurged {} item(s).", report.purged.len());
    }
}

pub fn render_failures(action: &str, failures: &[ItemFailure]) {
    for failure in failures {
        eprintln!(
            "safe-rm: failed to {action} {}: {}",
            failure.location.display(),
            failure.error
        );
    }
}
