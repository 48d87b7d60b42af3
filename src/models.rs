use crate::errors::CoreError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of classifying a path against the protection rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionStatus {
    pub protected: bool,
    pub reason: String,
}

impl ProtectionStatus {
    pub fn protected(reason: impl Into<String>) -> Self {
        Self {
            protected: true,
            reason: reason.into(),
        }
    }

    pub fn allowed() -> Self {
        Self {
            protected: false,
            reason: String::new(),
        }
    }
}

/// Sidecar record persisted next to every trashed item.
///
/// The field names are a compatibility contract with trash written by other
/// versions; unknown fields are ignored when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashMetadata {
    pub original_path: PathBuf,
    pub deleted_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub is_directory: bool,
}

/// Result of moving a path into the trash.
#[derive(Debug)]
pub struct MoveOutcome {
    /// Final location inside the trash root, after disambiguation.
    pub location: PathBuf,
    /// Set when the item was trashed but its sidecar could not be written.
    pub warning: Option<CoreError>,
}

/// What is known about where a trashed entry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Known(TrashMetadata),
    Unknown,
}

impl Provenance {
    pub fn metadata(&self) -> Option<&TrashMetadata> {
        match self {
            Self::Known(metadata) => Some(metadata),
            Self::Unknown => None,
        }
    }
}

/// One row of a trash listing.
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub location: PathBuf,
    pub provenance: Provenance,
    pub size_bytes: Option<u64>,
}

/// Result of restoring an item to its original location.
#[derive(Debug)]
pub struct RestoreOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
    /// Set when the item came back but its sidecar could not be removed.
    pub warning: Option<CoreError>,
}

/// An entry that could not be processed during a batch operation.
#[derive(Debug)]
pub struct ItemFailure {
    pub location: PathBuf,
    pub error: CoreError,
}

/// An entry removed by a purge.
#[derive(Debug, Clone)]
pub struct PurgedItem {
    pub location: PathBuf,
    pub original_path: Option<PathBuf>,
    pub deleted_at: DateTime<FixedOffset>,
}

#[derive(Debug)]
pub struct PurgeReport {
    pub cutoff: DateTime<FixedOffset>,
    pub purged: Vec<PurgedItem>,
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Default)]
pub struct EmptyReport {
    /// Number of entries permanently deleted.
    pub deleted: usize,
    /// Number of scaffolding directories removed after deletion.
    pub pruned_dirs: usize,
    pub failures: Vec<ItemFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_tolerates_unknown_and_missing_fields() {
        let raw = r#"{
            "original_path": "/home/u/f.txt",
            "deleted_at": "2024-03-01T10:20:30.123456789+02:00",
            "size": 42
        }"#;
        let metadata: TrashMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(metadata.original_path, PathBuf::from("/home/u/f.txt"));
        assert_eq!(metadata.deleted_at.offset().local_minus_utc(), 7200);
        assert!(metadata.hostname.is_empty());
        assert!(!metadata.is_directory);
    }

    #[test]
    fn metadata_uses_contract_field_names() {
        let metadata = TrashMetadata {
            original_path: PathBuf::from("/srv/data"),
            deleted_at: DateTime::parse_from_rfc3339("2024-01-02T03:04:05+00:00").unwrap(),
            hostname: "box".to_string(),
            is_directory: true,
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["original_path"], "/srv/data");
        assert_eq!(value["hostname"], "box");
        assert_eq!(value["is_directory"], true);
        assert!(value["deleted_at"].as_str().unwrap().starts_with("2024-01-02T03:04:05"));
    }
}
