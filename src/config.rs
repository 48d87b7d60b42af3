//! Configuration consumed by the trash core.
//!
//! Values come from an optional TOML file and `SAFERM_*` overrides. The
//! process environment is passed in as a map, so nothing here reads
//! ambient state on its own.

use crate::errors::CoreError;
use crate::helpers::expand_tilde;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// Default retention period for purge, in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

const TRASH_ENV: &str = "SAFERM_TRASH";
const PROTECTED_PATHS_ENV: &str = "SAFERM_PROTECTED_PATHS";
const RETENTION_ENV: &str = "SAFERM_RETENTION_DAYS";
const BEHAVIOR_ENV: &str = "SAFERM_PROTECTED_BEHAVIOR";

/// Config file names earlier releases read; they are noticed, not parsed.
const LEGACY_FILE_NAMES: [&str; 2] = ["config.yml", "config.yaml"];

/// What happens when a protected path is about to be removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectedBehavior {
    /// Protected paths can never be removed through this tool.
    Block,
    /// Removal proceeds only after the confirmation phrase is supplied.
    #[default]
    Confirm,
}

impl FromStr for ProtectedBehavior {
    type Err = CoreError;

    fn from_str(value: &str) -> crate::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "confirm" => Ok(Self::Confirm),
            other => Err(CoreError::invalid_config(format!(
                "protected_behavior must be \"block\" or \"confirm\", got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub trash_dir: PathBuf,
    pub retention_days: u32,
    pub protected_paths: Vec<String>,
    pub protected_behavior: ProtectedBehavior,
    pub verbose_warnings: bool,
    /// Home directory used to expand `~`; resolved by the loader.
    pub home_dir: PathBuf,
}

/// On-disk shape of the config file. Absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    trash_dir: Option<String>,
    retention_days: Option<u32>,
    protected_paths: Option<Vec<String>>,
    protected_behavior: Option<ProtectedBehavior>,
    verbose_warnings: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_home(PathBuf::from("/"))
    }
}

impl Config {
    /// Defaults for a user whose home directory is `home`.
    pub fn for_home(home: PathBuf) -> Self {
        Self {
            trash_dir: home.join(".local").join("share").join("safe-rm").join("trash"),
            retention_days: DEFAULT_RETENTION_DAYS,
            protected_paths: Vec::new(),
            protected_behavior: ProtectedBehavior::default(),
            verbose_warnings: true,
            home_dir: home,
        }
    }

    /// Loads the config file and applies environment overrides.
    ///
    /// A missing `HOME` or a config file that cannot be read or parsed is
    /// an error: the file may carry protections that must not be dropped.
    /// A malformed override only skips its own key; every skipped key is
    /// returned next to the config so callers can surface it.
    pub fn load(environ: &HashMap<String, String>) -> crate::Result<(Self, Vec<CoreError>)> {
        let home = environ
            .get("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| CoreError::invalid_config("HOME is not set"))?;

        let mut config = Self::for_home(home);
        let mut skipped = Vec::new();
        let path = config_path(environ, &config.home_dir);
        match read_file(&path)? {
            Some(file) => config.apply_file(file),
            None => skipped.extend(legacy_file_notice(&path)),
        }
        skipped.extend(config.apply_overrides(environ));
        for err in &skipped {
            warn!(error = %err, "ignoring configuration value");
        }
        Ok((config, skipped))
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(trash_dir) = file.trash_dir {
            self.trash_dir = PathBuf::from(expand_tilde(&trash_dir, &self.home_dir));
        }
        if let Some(days) = file.retention_days {
            self.retention_days = days;
        }
        if let Some(paths) = file.protected_paths {
            self.protected_paths = paths;
        }
        if let Some(behavior) = file.protected_behavior {
            self.protected_behavior = behavior;
        }
        if let Some(verbose) = file.verbose_warnings {
            self.verbose_warnings = verbose;
        }
    }

    /// Applies the `SAFERM_*` overrides that parse and reports the rest.
    fn apply_overrides(&mut self, environ: &HashMap<String, String>) -> Vec<CoreError> {
        let mut skipped = Vec::new();
        if let Some(trash) = non_empty(environ, TRASH_ENV) {
            self.trash_dir = PathBuf::from(trash);
        }
        if let Some(paths) = non_empty(environ, PROTECTED_PATHS_ENV) {
            self.protected_paths
                .extend(paths.split(':').filter(|p| !p.is_empty()).map(str::to_string));
        }
        if let Some(days) = non_empty(environ, RETENTION_ENV) {
            match days.trim().parse() {
                Ok(days) => self.retention_days = days,
                Err(_) => skipped.push(CoreError::invalid_config(format!(
                    "{RETENTION_ENV} is not a number: {days}"
                ))),
            }
        }
        if let Some(behavior) = non_empty(environ, BEHAVIOR_ENV) {
            match behavior.parse() {
                Ok(behavior) => self.protected_behavior = behavior,
                Err(err) => skipped.push(err),
            }
        }
        skipped
    }
}

/// Location of the config file: `$XDG_CONFIG_HOME/safe-rm/config.toml`,
/// else `~/.config/safe-rm/config.toml`.
pub fn config_path(environ: &HashMap<String, String>, home: &Path) -> PathBuf {
    let base = non_empty(environ, "XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(".config"));
    base.join("safe-rm").join("config.toml")
}

/// Parses a TOML config file, returning `None` when it does not exist.
fn read_file(path: &Path) -> crate::Result<Option<ConfigFile>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(CoreError::io(path, err)),
    };
    let file = toml::from_str(&contents)
        .map_err(|err| CoreError::invalid_config(format!("{}: {err}", path.display())))?;
    Ok(Some(file))
}

/// Notice for a leftover YAML config next to where the TOML one belongs.
fn legacy_file_notice(path: &Path) -> Option<CoreError> {
    let dir = path.parent()?;
    LEGACY_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|legacy| legacy.exists())
        .map(|legacy| {
            CoreError::invalid_config(format!(
                "{} is no longer read; move its settings to {}",
                legacy.display(),
                path.display()
            ))
        })
}

fn non_empty<'a>(environ: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    environ.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn environ(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_file() {
        let home = tempdir().unwrap();
        let env = environ(&[("HOME", home.path().to_str().unwrap())]);

        let (config, skipped) = Config::load(&env).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(config.trash_dir, home.path().join(".local/share/safe-rm/trash"));
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.protected_behavior, ProtectedBehavior::Confirm);
        assert!(config.protected_paths.is_empty());
        assert_eq!(config.home_dir, home.path());
    }

    #[test]
    fn file_then_environment_overrides() {
        let home = tempdir().unwrap();
        let xdg = home.path().join("xdg");
        fs::create_dir_all(xdg.join("safe-rm")).unwrap();
        fs::write(
            xdg.join("safe-rm/config.toml"),
            r#"
trash_dir = "~/my-trash"
retention_days = 7
protected_paths = ["~/keep/**"]
protected_behavior = "block"
"#,
        )
        .unwrap();
        let env = environ(&[
            ("HOME", home.path().to_str().unwrap()),
            ("XDG_CONFIG_HOME", xdg.to_str().unwrap()),
            ("SAFERM_PROTECTED_PATHS", "/data/**:/srv/x"),
            ("SAFERM_RETENTION_DAYS", "3"),
        ]);

        let (config, _) = Config::load(&env).unwrap();
        assert_eq!(config.trash_dir, home.path().join("my-trash"));
        assert_eq!(config.retention_days, 3);
        assert_eq!(config.protected_behavior, ProtectedBehavior::Block);
        assert_eq!(config.protected_paths, ["~/keep/**", "/data/**", "/srv/x"]);

        let env = environ(&[
            ("HOME", home.path().to_str().unwrap()),
            ("XDG_CONFIG_HOME", xdg.to_str().unwrap()),
            ("SAFERM_TRASH", "/elsewhere"),
            ("SAFERM_PROTECTED_BEHAVIOR", "confirm"),
        ]);
        let (config, _) = Config::load(&env).unwrap();
        assert_eq!(config.trash_dir, PathBuf::from("/elsewhere"));
        assert_eq!(config.protected_behavior, ProtectedBehavior::Confirm);
    }

    #[test]
    fn bad_override_skips_only_its_own_key() {
        let home = tempdir().unwrap();
        let xdg = home.path().join("xdg");
        fs::create_dir_all(xdg.join("safe-rm")).unwrap();
        fs::write(
            xdg.join("safe-rm/config.toml"),
            r#"
trash_dir = "/srv/trash"
retention_days = 9
protected_paths = ["/data/**"]
protected_behavior = "block"
"#,
        )
        .unwrap();
        let env = environ(&[
            ("HOME", home.path().to_str().unwrap()),
            ("XDG_CONFIG_HOME", xdg.to_str().unwrap()),
            ("SAFERM_RETENTION_DAYS", "30d"),
            ("SAFERM_PROTECTED_BEHAVIOR", "maybe"),
            ("SAFERM_PROTECTED_PATHS", "/more"),
        ]);

        let (config, skipped) = Config::load(&env).unwrap();

        assert_eq!(skipped.len(), 2);
        assert!(skipped
            .iter()
            .all(|err| matches!(err, CoreError::InvalidConfig(_))));
        assert_eq!(config.trash_dir, PathBuf::from("/srv/trash"));
        assert_eq!(config.retention_days, 9);
        assert_eq!(config.protected_behavior, ProtectedBehavior::Block);
        assert_eq!(config.protected_paths, ["/data/**", "/more"]);
    }

    #[test]
    fn unreadable_file_or_missing_home_is_an_error() {
        assert!(matches!(
            Config::load(&HashMap::new()),
            Err(CoreError::InvalidConfig(_))
        ));

        let home = tempdir().unwrap();
        let xdg = home.path().join("xdg");
        fs::create_dir_all(xdg.join("safe-rm")).unwrap();
        fs::write(xdg.join("safe-rm/config.toml"), "retention_days = \"many\"").unwrap();
        let env = environ(&[
            ("HOME", home.path().to_str().unwrap()),
            ("XDG_CONFIG_HOME", xdg.to_str().unwrap()),
        ]);
        assert!(matches!(Config::load(&env), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn legacy_yaml_file_is_reported() {
        let home = tempdir().unwrap();
        let dir = home.path().join(".config/safe-rm");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), "protected_paths: [/data]\n").unwrap();
        let env = environ(&[("HOME", home.path().to_str().unwrap())]);

        let (config, skipped) = Config::load(&env).unwrap();

        assert!(config.protected_paths.is_empty());
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].to_string().contains("config.yml"));

        fs::write(dir.join("config.toml"), "retention_days = 3").unwrap();
        let (config, skipped) = Config::load(&env).unwrap();
        assert_eq!(config.retention_days, 3);
        assert!(skipped.is_empty());
    }
}
