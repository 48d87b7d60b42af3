use crate::errors::CoreError;
use std::fs::{self, Metadata, Permissions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Filesystem abstraction boundary for the trash core.
///
/// Keeping this trait narrow makes it easy to write deterministic tests and
/// allows alternative backends if the command layer needs them. Every
/// method reports failures as [`CoreError::Io`] naming the offending path.
pub trait FileSystem: Send + Sync {
    /// Returns the current time in wall-clock format.
    fn now(&self) -> SystemTime;

    /// Returns true when path exists. Symlinks are not followed, so a
    /// dangling link still counts as present.
    fn exists(&self, path: &Path) -> bool;

    /// Reads symlink metadata.
    fn symlink_metadata(&self, path: &Path) -> crate::Result<Metadata>;

    /// Creates a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Creates a directory.
    fn create_dir(&self, path: &Path) -> crate::Result<()>;

    /// Writes raw bytes (truncate + replace).
    fn write(&self, path: &Path, data: &[u8]) -> crate::Result<()>;

    /// Reads UTF-8 text.
    fn read_to_string(&self, path: &Path) -> crate::Result<String>;

    /// Removes a file or symlink.
    fn remove_file(&self, path: &Path) -> crate::Result<()>;

    /// Removes an empty directory.
    fn remove_dir(&self, path: &Path) -> crate::Result<()>;

    /// Removes a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Renames/moves a path.
    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Lists directory children as concrete paths, sorted by name.
    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>>;

    /// Copies a regular file, carrying its permission bits over.
    fn copy_file(&self, from: &Path, to: &Path) -> crate::Result<u64>;

    /// Replaces the permission bits of a path.
    fn set_permissions(&self, path: &Path, permissions: Permissions) -> crate::Result<()>;

    /// Reads the target of a symlink.
    fn read_link(&self, path: &Path) -> crate::Result<PathBuf>;

    /// Creates a symlink at `link` pointing to `target`.
    fn symlink(&self, target: &Path, link: &Path) -> crate::Result<()>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn symlink_metadata(&self, path: &Path) -> crate::Result<Metadata> {
        fs::symlink_metadata(path).map_err(|err| CoreError::io(path, err))
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn create_dir(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir(path).map_err(|err| CoreError::io(path, err))
    }

    fn write(&self, path: &Path, data: &[u8]) -> crate::Result<()> {
        fs::write(path, data).map_err(|err| CoreError::io(path, err))
    }

    fn read_to_string(&self, path: &Path) -> crate::Result<String> {
        fs::read_to_string(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        fs::remove_file(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_dir(&self, path: &Path) -> crate::Result<()> {
        fs::remove_dir(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::remove_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()> {
        fs::rename(from, to).map_err(|err| CoreError::io(from, err))
    }

    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
        let mut children = fs::read_dir(path)
            .map_err(|err| CoreError::io(path, err))?
            .map(|entry| entry.map(|v| v.path()))
            .collect::<Result<Vec<PathBuf>, io::Error>>()
            .map_err(|err| CoreError::io(path, err))?;
        children.sort();
        Ok(children)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> crate::Result<u64> {
        fs::copy(from, to).map_err(|err| CoreError::io(from, err))
    }

    fn set_permissions(&self, path: &Path, permissions: Permissions) -> crate::Result<()> {
        fs::set_permissions(path, permissions).map_err(|err| CoreError::io(path, err))
    }

    fn read_link(&self, path: &Path) -> crate::Result<PathBuf> {
        fs::read_link(path).map_err(|err| CoreError::io(path, err))
    }

    fn symlink(&self, target: &Path, link: &Path) -> crate::Result<()> {
        std::os::unix::fs::symlink(target, link).map_err(|err| CoreError::io(link, err))
    }
}

/// Removes a path whatever its kind: directories recursively, files and
/// symlinks directly. Links are never followed.
pub fn remove_entry<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> crate::Result<()> {
    let metadata = fs.symlink_metadata(path)?;
    if metadata.is_dir() {
        fs.remove_dir_all(path)
    } else {
        fs.remove_file(path)
    }
}

/// Total size in bytes of a path, walking directories without following
/// symlinks. Unreadable children count as zero.
pub fn disk_usage<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> crate::Result<u64> {
    let metadata = fs.symlink_metadata(path)?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }
    let mut total = 0;
    for child in fs.list_dir(path)? {
        total += disk_usage(fs, &child).unwrap_or(0);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn exists_sees_dangling_symlinks() {
        let tmp = tempdir().unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(tmp.path().join("missing"), &link).unwrap();

        assert!(RealFileSystem.exists(&link));
        assert!(!RealFileSystem.exists(&tmp.path().join("missing")));
    }

    #[test]
    fn list_dir_is_sorted() {
        let tmp = tempdir().unwrap();
        for name in ["c", "a", "b"] {
            fs::write(tmp.path().join(name), name).unwrap();
        }
        let names: Vec<_> = RealFileSystem
            .list_dir(tmp.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn remove_entry_handles_files_and_trees() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, "x").unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/g"), "yy").unwrap();

        assert_eq!(disk_usage(&RealFileSystem, &dir).unwrap(), 2);

        remove_entry(&RealFileSystem, &file).unwrap();
        remove_entry(&RealFileSystem, &dir).unwrap();
        assert!(!file.exists());
        assert!(!dir.exists());
    }
}
