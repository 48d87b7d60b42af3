use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "safe-rm",
    version,
    about = "Remove (move to trash) the FILE(s).",
    long_about = "Remove (move to trash) the FILE(s).\n\n\
        Instead of permanently deleting files, safe-rm moves them to a trash \
        directory from which they can be listed, restored, purged or emptied.\n\n\
        Protected paths (root, top-level system directories, .git directories \
        and configured patterns) are blocked or need the phrase 'yes I am sure'."
)]
#[command(group(
    ArgGroup::new("safe_action")
        .args(["safe_list", "safe_restore", "safe_purge", "safe_empty"])
))]
/// Command-line options, compatible with the common `rm` flags.
pub struct Cli {
    /// Ignore nonexistent files and arguments, never prompt
    #[arg(short, long)]
    pub force: bool,

    /// Prompt before every removal
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// Prompt once before removing more than three files, or when removing recursively
    #[arg(short = 'I')]
    pub interactive_once: bool,

    /// Remove directories and their contents recursively
    #[arg(short = 'r', short_alias = 'R', long)]
    pub recursive: bool,

    /// Remove empty directories
    #[arg(short = 'd', long = "dir")]
    pub remove_empty_dirs: bool,

    /// Explain what is being done
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not remove '/' (default; '/' is always protected)
    #[arg(long, overrides_with = "no_preserve_root")]
    pub preserve_root: bool,

    /// Accepted for compatibility; '/' stays protected
    #[arg(long)]
    pub no_preserve_root: bool,

    /// List all items in the trash
    #[arg(long)]
    pub safe_list: bool,

    /// Restore a file from trash to its original location
    #[arg(long, value_name = "PATH")]
    pub safe_restore: Option<PathBuf>,

    /// Purge old items from trash
    #[arg(long)]
    pub safe_purge: bool,

    /// With --safe-purge, remove items older than N days (defaults to the configured retention)
    #[arg(long, value_name = "N", requires = "safe_purge")]
    pub purge_days: Option<u32>,

    /// Permanently delete ALL items in trash (requires confirmation)
    #[arg(long)]
    pub safe_empty: bool,

    /// Files or directories to remove
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_short_flags() {
        let cli = Cli::try_parse_from(["safe-rm", "-Rfv", "a", "b"]).unwrap();
        assert!(cli.recursive && cli.force && cli.verbose);
        assert_eq!(cli.files, [PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn double_dash_ends_options() {
        let cli = Cli::try_parse_from(["safe-rm", "--", "-weird-name"]).unwrap();
        assert_eq!(cli.files, [PathBuf::from("-weird-name")]);
    }

    #[test]
    fn safe_actions_are_exclusive() {
        assert!(Cli::try_parse_from(["safe-rm", "--safe-list", "--safe-empty"]).is_err());
        assert!(Cli::try_parse_from(["safe-rm", "--purge-days=3"]).is_err());

        let cli = Cli::try_parse_from(["safe-rm", "--safe-purge", "--purge-days=3"]).unwrap();
        assert_eq!(cli.purge_days, Some(3));
        let cli = Cli::try_parse_from(["safe-rm", "--safe-restore=/tmp/x"]).unwrap();
        assert_eq!(cli.safe_restore, Some(PathBuf::from("/tmp/x")));
    }
}
