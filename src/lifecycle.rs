//! List, restore, purge and empty: the recovery and cleanup workflows
//! built on top of the trash index.

use crate::errors::CoreError;
use crate::fs::{disk_usage, remove_entry, FileSystem};
use crate::helpers::sidecar_path;
use crate::index::TrashEntry;
use crate::models::{
    EmptyReport, ItemFailure, ListEntry, Provenance, PurgeReport, PurgedItem, RestoreOutcome,
    TrashMetadata,
};
use crate::trash::{relocate, Trash};
use chrono::{DateTime, Duration, FixedOffset, Local, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

impl<F: FileSystem> Trash<F> {
    /// Every trashed entry with whatever provenance its sidecar provides.
    ///
    /// Entries without a readable sidecar are listed as unknown. Rows come
    /// in traversal order, not by date.
    pub fn list(&self) -> Vec<ListEntry> {
        self.scan()
            .filter_map(|entry| match entry {
                TrashEntry::Item(location) => Some(ListEntry {
                    provenance: self.provenance(&location),
                    size_bytes: disk_usage(self.fs(), &location).ok(),
                    location,
                }),
                TrashEntry::Orphan(location) => Some(ListEntry {
                    provenance: Provenance::Unknown,
                    size_bytes: disk_usage(self.fs(), &location).ok(),
                    location,
                }),
                TrashEntry::StraySidecar(_) => None,
            })
            .collect()
    }

    /// Puts the most recently trashed copy of `original` back where it was.
    ///
    /// Fails with [`CoreError::NotFound`] when nothing in the trash came
    /// from `original`, and with [`CoreError::AlreadyExists`] when the
    /// destination is occupied; the trashed copy is left alone either way.
    pub fn restore(&self, original: &Path) -> crate::Result<RestoreOutcome> {
        let (location, metadata) = self
            .find_latest(original)
            .ok_or_else(|| CoreError::NotFound(original.to_path_buf()))?;
        let destination = metadata.original_path;

        if self.fs().exists(&destination) {
            return Err(CoreError::AlreadyExists(destination));
        }
        if let Some(parent) = destination.parent() {
            self.fs().create_dir_all(parent)?;
        }
        relocate(self.fs(), &location, &destination)?;
        info!(from = %location.display(), to = %destination.display(), "restored from trash");

        let warning = match self.fs().remove_file(&sidecar_path(&location)) {
            Ok(()) => None,
            Err(err) => {
                warn!(item = %location.display(), error = %err, "failed to remove trash metadata");
                Some(err)
            }
        };

        Ok(RestoreOutcome {
            from: location,
            to: destination,
            warning,
        })
    }

    /// Permanently deletes entries trashed more than `retention_days` ago.
    ///
    /// The deletion time comes from the sidecar, or from the entry's
    /// modification time when there is no readable sidecar. A failure on
    /// one entry is recorded and the rest are still evaluated.
    pub fn purge(&self, retention_days: u32) -> PurgeReport {
        let now = DateTime::<Local>::from(self.fs().now()).fixed_offset();
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(retention_days)))
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC.fixed_offset());
        let mut report = PurgeReport {
            cutoff,
            purged: Vec::new(),
            failures: Vec::new(),
        };

        for entry in self.scan() {
            let location = match entry {
                TrashEntry::Item(location) | TrashEntry::Orphan(location) => location,
                TrashEntry::StraySidecar(_) => continue,
            };
            let (original_path, deleted_at) = match self.deletion_time(&location) {
                Ok(found) => found,
                Err(error) => {
                    report.failures.push(ItemFailure { location, error });
                    continue;
                }
            };
            if deleted_at >= cutoff {
                debug!(item = %location.display(), "within retention, keeping");
                continue;
            }
            match self.delete_item(&location) {
                Ok(()) => {
                    info!(item = %location.display(), "purged");
                    report.purged.push(PurgedItem {
                        location,
                        original_path,
                        deleted_at,
                    });
                }
                Err(error) => {
                    warn!(item = %location.display(), error = %error, "purge failed");
                    report.failures.push(ItemFailure { location, error });
                }
            }
        }
        report
    }

    /// Permanently deletes everything in the trash, then prunes the
    /// directories left empty.
    ///
    /// Nothing is touched unless `confirmed` is true; the caller is
    /// responsible for obtaining the confirmation.
    pub fn empty(&self, confirmed: bool) -> EmptyReport {
        let mut report = EmptyReport::default();
        if !confirmed {
            return report;
        }

        for entry in self.scan() {
            let result = match &entry {
                TrashEntry::Item(location) | TrashEntry::Orphan(location) => {
                    self.delete_item(location)
                }
                TrashEntry::StraySidecar(sidecar) => self.fs().remove_file(sidecar),
            };
            match result {
                Ok(()) if matches!(entry, TrashEntry::StraySidecar(_)) => {}
                Ok(()) => report.deleted += 1,
                Err(error) => report.failures.push(ItemFailure {
                    location: entry.path().to_path_buf(),
                    error,
                }),
            }
        }

        report.pruned_dirs = self.prune_empty_dirs(self.root());
        info!(deleted = report.deleted, failed = report.failures.len(), "emptied trash");
        report
    }

    fn provenance(&self, location: &Path) -> Provenance {
        match self.read_metadata(location) {
            Ok(Some(metadata)) => Provenance::Known(metadata),
            Ok(None) => Provenance::Unknown,
            Err(err) => {
                warn!(item = %location.display(), error = %err, "unreadable trash metadata");
                Provenance::Unknown
            }
        }
    }

    /// Latest trashed copy of `original`; ties go to the first one seen.
    fn find_latest(&self, original: &Path) -> Option<(PathBuf, TrashMetadata)> {
        let mut best: Option<(PathBuf, TrashMetadata)> = None;
        for location in self.enumerate() {
            let metadata = match self.read_metadata(&location) {
                Ok(Some(metadata)) if metadata.original_path == original => metadata,
                _ => continue,
            };
            let newer = best
                .as_ref()
                .map_or(true, |(_, current)| metadata.deleted_at > current.deleted_at);
            if newer {
                best = Some((location, metadata));
            }
        }
        best
    }

    fn deletion_time(
        &self,
        location: &Path,
    ) -> crate::Result<(Option<PathBuf>, DateTime<FixedOffset>)> {
        if let Provenance::Known(metadata) = self.provenance(location) {
            return Ok((Some(metadata.original_path), metadata.deleted_at));
        }
        let modified = self
            .fs()
            .symlink_metadata(location)?
            .modified()
            .map_err(|err| CoreError::io(location, err))?;
        Ok((None, DateTime::<Local>::from(modified).fixed_offset()))
    }

    /// Removes an entry and, if present, its sidecar.
    fn delete_item(&self, location: &Path) -> crate::Result<()> {
        remove_entry(self.fs(), location)?;
        let sidecar = sidecar_path(location);
        match self.fs().remove_file(&sidecar) {
            Err(err) if !err.is_not_found() => Err(err),
            _ => Ok(()),
        }
    }

    /// Removes empty directories below `dir`, children before parents.
    /// `dir` itself is kept. Returns how many were removed.
    fn prune_empty_dirs(&self, dir: &Path) -> usize {
        let mut pruned = 0;
        let Ok(children) = self.fs().list_dir(dir) else {
            return 0;
        };
        for child in children {
            let is_dir = self
                .fs()
                .symlink_metadata(&child)
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            pruned += self.prune_empty_dirs(&child);
            let now_empty = self
                .fs()
                .list_dir(&child)
                .map(|c| c.is_empty())
                .unwrap_or(false);
            if now_empty && self.fs().remove_dir(&child).is_ok() {
                pruned += 1;
            }
        }
        pruned
    }
}
