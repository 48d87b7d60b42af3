//! Shared utility helpers for path handling and trash naming.

use std::ffi::CStr;
use std::path::{Component, Path, PathBuf};

/// Suffix appended to a trashed item's path to name its metadata sidecar.
///
/// A user file whose name already ends with this suffix is indistinguishable
/// from a sidecar.
pub const SIDECAR_SUFFIX: &str = ".saferm-meta";

/// Local-time format of the suffix that disambiguates trash collisions.
pub const DISAMBIGUATION_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Deletion date format used when rendering listings.
pub const LISTING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Host identifier used when the system refuses to report one.
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// Returns the sidecar path belonging to a trashed item.
pub fn sidecar_path(item: &Path) -> PathBuf {
    let mut raw = item.as_os_str().to_owned();
    raw.push(SIDECAR_SUFFIX);
    PathBuf::from(raw)
}

/// Returns the trashed item a sidecar describes, or `None` when the path
/// is not a sidecar.
pub fn item_for_sidecar(sidecar: &Path) -> Option<PathBuf> {
    let raw = sidecar.to_str()?;
    raw.strip_suffix(SIDECAR_SUFFIX)
        .filter(|item| !item.is_empty() && !item.ends_with('/'))
        .map(PathBuf::from)
}

/// True when the path's final component carries the sidecar suffix.
pub fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(SIDECAR_SUFFIX) && name != SIDECAR_SUFFIX)
}

/// Drops the root component so an absolute path can be nested under the
/// trash root (`/home/u/f.txt` becomes `home/u/f.txt`).
pub fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
        .collect()
}

/// Returns a normalized path by resolving `.` and `..` segments lexically.
///
/// The filesystem is never consulted, so symlinks are left unresolved and
/// trailing separators disappear. `..` above the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !path.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(if path.has_root() { "/" } else { "." });
    }
    normalized
}

/// Makes `path` absolute against `cwd` and normalizes it.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&cwd.join(path))
    }
}

/// Expands a leading `~` using the supplied home directory.
pub fn expand_tilde(value: &str, home: &Path) -> String {
    match value.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{}", home.display(), rest)
        }
        _ => value.to_string(),
    }
}

/// Returns this machine's host name, or [`UNKNOWN_HOSTNAME`].
pub fn local_hostname() -> String {
    let mut buffer = [0u8; 256];
    // SAFETY: the buffer is valid for `len` bytes and gethostname writes at
    // most that many.
    let rc = unsafe { libc::gethostname(buffer.as_mut_ptr().cast(), buffer.len()) };
    if rc != 0 {
        return UNKNOWN_HOSTNAME.to_string();
    }
    // Truncated names may lack the terminator.
    let last = buffer.len() - 1;
    buffer[last] = 0;
    CStr::from_bytes_until_nul(&buffer)
        .ok()
        .and_then(|name| name.to_str().ok())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
}

/// Human readable size rendering for listings.
pub fn print_size(bytes: u64) -> String {
    const SUFFIXES: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut idx = 0usize;

    while value >= 1024.0 && idx < SUFFIXES.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }

    if idx == 0 {
        format!("{:.0} {}", value, SUFFIXES[idx])
    } else {
        format!("{:.1} {}", value, SUFFIXES[idx])
    }
}
