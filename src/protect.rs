//! Deciding whether a path may be removed.
//!
//! Rules are checked in a fixed order and the first match supplies the
//! reason: filesystem root, root wildcard, system directories (and, for
//! recursive removals, their ancestors), repository markers, then user
//! patterns.

use crate::config::{Config, ProtectedBehavior};
use crate::errors::CoreError;
use crate::fs::FileSystem;
use crate::helpers::expand_tilde;
use crate::models::ProtectionStatus;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Phrase a user must type to override a protected path or empty the trash.
pub const CONFIRMATION_PHRASE: &str = "yes I am sure";

/// Top-level system directories that are never removed without an override.
pub const SYSTEM_DIRECTORIES: [&str; 17] = [
    "/bin", "/boot", "/dev", "/etc", "/home", "/lib", "/lib64", "/opt", "/proc", "/root", "/run",
    "/sbin", "/srv", "/sys", "/tmp", "/usr", "/var",
];

/// Directory name marking a repository.
pub const REPOSITORY_MARKER: &str = ".git";

/// Shell expansion of "everything directly under root".
const ROOT_WILDCARD: &str = "/*";

/// Suffix that turns a user pattern into a whole-subtree rule.
const SUBTREE_SUFFIX: &str = "/**";

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
enum UserRule {
    /// Exact or single-level glob match against the whole path.
    Glob(Pattern),
    /// `dir/**`: the base and everything beneath it.
    Subtree { base: Pattern, display: String },
    /// A pattern that failed to compile; it never matches.
    Invalid,
}

impl UserRule {
    fn compile(raw: &str, home: &Path) -> Self {
        let expanded = expand_tilde(raw, home);
        let compiled = match expanded.strip_suffix(SUBTREE_SUFFIX) {
            Some(base) => Pattern::new(base).map(|base| Self::Subtree {
                base,
                display: base_display(&expanded),
            }),
            None => Pattern::new(&expanded).map(Self::Glob),
        };
        compiled.unwrap_or_else(|err| {
            warn!(pattern = raw, error = %err, "ignoring malformed protected path pattern");
            Self::Invalid
        })
    }

    fn check(&self, path: &Path) -> Option<String> {
        match self {
            Self::Glob(pattern) if pattern.matches_path_with(path, GLOB_OPTIONS) => Some(format!(
                "Path matches protected pattern: {}",
                pattern.as_str()
            )),
            Self::Subtree { base, display } => path
                .ancestors()
                .any(|ancestor| base.matches_path_with(ancestor, GLOB_OPTIONS))
                .then(|| format!("Path is under protected directory: {display}")),
            _ => None,
        }
    }
}

fn base_display(expanded: &str) -> String {
    expanded
        .strip_suffix(SUBTREE_SUFFIX)
        .unwrap_or(expanded)
        .to_string()
}

/// Ordered, immutable protection rule set, built once and shared by
/// reference with every classification.
#[derive(Debug, Clone)]
pub struct ProtectionRules {
    system_dirs: Vec<PathBuf>,
    user_rules: Vec<UserRule>,
}

impl Default for ProtectionRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProtectionRules {
    /// The built-in catalog with no user patterns.
    pub fn builtin() -> Self {
        Self {
            system_dirs: SYSTEM_DIRECTORIES.iter().map(PathBuf::from).collect(),
            user_rules: Vec::new(),
        }
    }

    /// Adds user patterns, expanding a leading `~` against `home`.
    /// Malformed patterns are logged and never match.
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S], home: &Path) -> Self {
        self.user_rules
            .extend(patterns.iter().map(|p| UserRule::compile(p.as_ref(), home)));
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::builtin().with_patterns(config.protected_paths.as_slice(), &config.home_dir)
    }

    /// Number of user patterns that failed to compile.
    pub fn invalid_patterns(&self) -> usize {
        self.user_rules
            .iter()
            .filter(|rule| matches!(rule, UserRule::Invalid))
            .count()
    }
}

/// Classifies an absolute, normalized path.
///
/// `recursive` additionally protects ancestors of system directories. The
/// only I/O is checking whether the path directly contains a repository
/// marker.
pub fn classify<F: FileSystem + ?Sized>(
    fs: &F,
    rules: &ProtectionRules,
    path: &Path,
    recursive: bool,
) -> ProtectionStatus {
    if path == Path::new("/") {
        return ProtectionStatus::protected("Root directory is always protected");
    }
    if path.as_os_str() == ROOT_WILDCARD {
        return ProtectionStatus::protected("Wildcard patterns targeting root level are blocked");
    }

    for system_dir in &rules.system_dirs {
        if path == system_dir {
            return ProtectionStatus::protected(format!(
                "System directory is protected: {}",
                system_dir.display()
            ));
        }
    }
    if recursive {
        for system_dir in &rules.system_dirs {
            if system_dir != path && system_dir.starts_with(path) {
                return ProtectionStatus::protected(format!(
                    "Path contains protected system directory: {}",
                    system_dir.display()
                ));
            }
        }
    }

    let is_marker = path.file_name().is_some_and(|name| name == REPOSITORY_MARKER);
    if is_marker || fs.exists(&path.join(REPOSITORY_MARKER)) {
        return ProtectionStatus::protected(".git directory or repository root is protected");
    }

    rules
        .user_rules
        .iter()
        .find_map(|rule| rule.check(path))
        .map(ProtectionStatus::protected)
        .unwrap_or_else(ProtectionStatus::allowed)
}

/// True only for the exact confirmation phrase (surrounding whitespace from
/// a terminal line is ignored).
pub fn is_confirmation(input: &str) -> bool {
    input.trim() == CONFIRMATION_PHRASE
}

/// Applies the configured behavior to a classification.
///
/// Unprotected paths pass. Protected ones fail with
/// [`CoreError::Protected`] in block mode; in confirm mode they pass only
/// when `confirmation` is the exact confirmation phrase.
pub fn authorize(
    behavior: ProtectedBehavior,
    path: &Path,
    status: &ProtectionStatus,
    confirmation: Option<&str>,
) -> crate::Result<()> {
    if !status.protected {
        return Ok(());
    }
    match behavior {
        ProtectedBehavior::Block => Err(CoreError::protected(path, status.reason.clone())),
        ProtectedBehavior::Confirm if confirmation.is_some_and(is_confirmation) => Ok(()),
        ProtectedBehavior::Confirm => Err(CoreError::ConfirmationRequired {
            path: path.to_path_buf(),
            reason: status.reason.clone(),
        }),
    }
}
