//! Moving paths into the trash root and reading their sidecars back.

use crate::errors::CoreError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::helpers::{sidecar_path, strip_root, DISAMBIGUATION_TIME_FORMAT};
use crate::models::{MoveOutcome, TrashMetadata};
use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A trash root on this host.
///
/// Items live at `<root>/<hostname>/<original path without leading />`,
/// each next to a JSON sidecar describing where it came from.
#[derive(Debug, Clone)]
pub struct Trash<F: FileSystem = RealFileSystem> {
    fs: F,
    root: PathBuf,
    hostname: String,
}

impl Trash<RealFileSystem> {
    pub fn open(root: impl Into<PathBuf>, hostname: impl Into<String>) -> Self {
        Self::with_fs(RealFileSystem, root, hostname)
    }
}

impl<F: FileSystem> Trash<F> {
    pub fn with_fs(fs: F, root: impl Into<PathBuf>, hostname: impl Into<String>) -> Self {
        Self {
            fs,
            root: root.into(),
            hostname: hostname.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Undisambiguated trash location for an absolute path.
    pub fn destination_for(&self, path: &Path) -> PathBuf {
        self.root.join(&self.hostname).join(strip_root(path))
    }

    /// Moves `path` into the trash and records its sidecar.
    ///
    /// The path itself is moved; symlinks are not dereferenced. A sidecar
    /// write failure does not undo the move and is returned as a warning.
    pub fn put(&self, path: &Path) -> crate::Result<MoveOutcome> {
        let metadata = self.fs.symlink_metadata(path).map_err(|err| {
            if err.is_not_found() {
                CoreError::NotFound(path.to_path_buf())
            } else {
                err
            }
        })?;
        if self.root.starts_with(path) {
            return Err(CoreError::protected(path, "Path contains the trash directory"));
        }
        if path.starts_with(&self.root) {
            return Err(CoreError::protected(path, "Path is inside the trash directory"));
        }

        let deleted_at = DateTime::<Local>::from(self.fs.now());
        let stamp = deleted_at.format(DISAMBIGUATION_TIME_FORMAT).to_string();
        let destination = self.free_destination(path, &stamp)?;

        if let Some(parent) = destination.parent() {
            self.fs.create_dir_all(parent)?;
        }
        relocate(&self.fs, path, &destination)?;
        info!(from = %path.display(), to = %destination.display(), "moved to trash");

        let record = TrashMetadata {
            original_path: path.to_path_buf(),
            deleted_at: deleted_at.fixed_offset(),
            hostname: self.hostname.clone(),
            is_directory: metadata.is_dir(),
        };
        let warning = match self.write_metadata(&destination, &record) {
            Ok(()) => None,
            Err(err) => {
                warn!(item = %destination.display(), error = %err, "failed to write trash metadata");
                Some(err)
            }
        };

        Ok(MoveOutcome {
            location: destination,
            warning,
        })
    }

    /// Picks where `path` goes, walking its components below the host
    /// directory. A component that is already taken gets the timestamp
    /// suffix. For the final component "taken" means anything exists there.
    /// For the directories above it, an existing trashed item (it has a
    /// sidecar) or a non-directory is taken, since a new item must never
    /// land inside an older one.
    fn free_destination(&self, path: &Path, stamp: &str) -> crate::Result<PathBuf> {
        let relative = strip_root(path);
        let components: Vec<_> = relative.components().collect();
        let mut destination = self.root.join(&self.hostname);
        for (idx, component) in components.iter().enumerate() {
            let is_last = idx + 1 == components.len();
            let mut candidate = destination.join(component);
            if self.is_taken(&candidate, is_last) {
                candidate = with_suffix(&candidate, stamp);
                // Same-second repeats are refused rather than overwritten.
                if self.is_taken(&candidate, is_last) {
                    return Err(CoreError::AlreadyExists(candidate));
                }
            }
            destination = candidate;
        }
        Ok(destination)
    }

    fn is_taken(&self, candidate: &Path, is_last: bool) -> bool {
        if is_last {
            return self.fs.exists(candidate);
        }
        if self.fs.exists(&sidecar_path(candidate)) {
            return true;
        }
        self.fs
            .symlink_metadata(candidate)
            .is_ok_and(|metadata| !metadata.is_dir())
    }

    /// Reads the sidecar of a trashed item; `None` when there is none.
    pub fn read_metadata(&self, item: &Path) -> crate::Result<Option<TrashMetadata>> {
        let sidecar = sidecar_path(item);
        let contents = match self.fs.read_to_string(&sidecar) {
            Ok(contents) => contents,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|err| CoreError::MetadataCorrupt(sidecar, err))
    }

    fn write_metadata(&self, item: &Path, metadata: &TrashMetadata) -> crate::Result<()> {
        let sidecar = sidecar_path(item);
        let data = serde_json::to_vec_pretty(metadata)
            .map_err(|err| CoreError::MetadataCorrupt(sidecar.clone(), err))?;
        self.fs.write(&sidecar, &data)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Renames `from` to `to`, copying and deleting when they sit on different
/// volumes.
pub(crate) fn relocate<F: FileSystem + ?Sized>(fs: &F, from: &Path, to: &Path) -> crate::Result<()> {
    match fs.rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.is_cross_device() => {
            debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            copy_tree_and_remove(fs, from, to)
        }
        Err(err) => Err(err),
    }
}

/// Copies `from` to `to` depth first, deleting each source entry as soon as
/// its copy is complete. Permission bits are carried over.
///
/// Not atomic: an interruption leaves the finished part at `to` and the rest
/// at `from`.
pub(crate) fn copy_tree_and_remove<F: FileSystem + ?Sized>(
    fs: &F,
    from: &Path,
    to: &Path,
) -> crate::Result<()> {
    let metadata = fs.symlink_metadata(from)?;
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        let target = fs.read_link(from)?;
        fs.symlink(&target, to)?;
        return fs.remove_file(from);
    }

    if file_type.is_dir() {
        fs.create_dir(to)?;
        for child in fs.list_dir(from)? {
            if let Some(name) = child.file_name() {
                copy_tree_and_remove(fs, &child, &to.join(name))?;
            }
        }
        fs.set_permissions(to, metadata.permissions())?;
        return fs.remove_dir(from);
    }

    if !file_type.is_file() {
        return Err(CoreError::io(
            from,
            io::Error::new(io::ErrorKind::Unsupported, "special files cannot be copied"),
        ));
    }
    fs.copy_file(from, to)?;
    fs.remove_file(from)
}
