//! Walking the trash root to find trashed items.
//!
//! An entry is a trashed item exactly when a sidecar sits next to it.
//! Directories without their own sidecar are host/path scaffolding and are
//! walked through; directories with one were trashed as a unit and are
//! never descended into. Unreadable directories are skipped so one bad
//! subtree cannot hide the rest of the trash.

use crate::fs::FileSystem;
use crate::helpers::{is_sidecar, item_for_sidecar, sidecar_path};
use crate::trash::Trash;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Something found while walking the trash root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrashEntry {
    /// An item with its own sidecar.
    Item(PathBuf),
    /// A file or symlink with no sidecar, typically left behind when the
    /// sidecar write failed.
    Orphan(PathBuf),
    /// A sidecar whose item no longer exists.
    StraySidecar(PathBuf),
}

impl TrashEntry {
    pub fn path(&self) -> &Path {
        match self {
            Self::Item(path) | Self::Orphan(path) | Self::StraySidecar(path) => path,
        }
    }
}

/// Lazy depth-first walk over a trash root. Each call to [`Trash::scan`]
/// starts a fresh walk.
pub struct TrashScan<'a, F: FileSystem> {
    fs: &'a F,
    pending_dirs: Vec<PathBuf>,
    ready: VecDeque<TrashEntry>,
}

impl<'a, F: FileSystem> TrashScan<'a, F> {
    fn new(fs: &'a F, root: &Path) -> Self {
        Self {
            fs,
            pending_dirs: vec![root.to_path_buf()],
            ready: VecDeque::new(),
        }
    }

    fn visit_dir(&mut self, dir: &Path) {
        let children = match self.fs.list_dir(dir) {
            Ok(children) => children,
            Err(err) => {
                if !err.is_not_found() {
                    warn!(dir = %dir.display(), error = %err, "skipping unreadable trash directory");
                }
                return;
            }
        };

        let mut subdirs = Vec::new();
        for child in children {
            if is_sidecar(&child) {
                if let Some(item) = item_for_sidecar(&child) {
                    if !self.fs.exists(&item) {
                        self.ready.push_back(TrashEntry::StraySidecar(child));
                    }
                }
                continue;
            }
            if self.fs.exists(&sidecar_path(&child)) {
                self.ready.push_back(TrashEntry::Item(child));
                continue;
            }
            match self.fs.symlink_metadata(&child) {
                Ok(metadata) if metadata.is_dir() => subdirs.push(child),
                Ok(_) => self.ready.push_back(TrashEntry::Orphan(child)),
                Err(err) => debug!(entry = %child.display(), error = %err, "skipping entry"),
            }
        }
        // Reversed so the stack pops them in name order.
        self.pending_dirs.extend(subdirs.into_iter().rev());
    }
}

impl<F: FileSystem> Iterator for TrashScan<'_, F> {
    type Item = TrashEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.ready.pop_front() {
                return Some(entry);
            }
            let dir = self.pending_dirs.pop()?;
            self.visit_dir(&dir);
        }
    }
}

impl<F: FileSystem> Trash<F> {
    /// Starts a walk over everything under the trash root.
    pub fn scan(&self) -> TrashScan<'_, F> {
        TrashScan::new(self.fs(), self.root())
    }

    /// Locations of all trashed items, in traversal order.
    pub fn enumerate(&self) -> Vec<PathBuf> {
        self.scan()
            .filter_map(|entry| match entry {
                TrashEntry::Item(path) => Some(path),
                _ => None,
            })
            .collect()
    }
}
