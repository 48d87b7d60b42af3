//! Core of safe-rm: decides whether a path may be removed and, instead of
//! unlinking it, moves it into a trash root from which it can be listed,
//! restored, purged or emptied.
//!
//! Presentation, prompting and argument parsing live in the `safe-rm`
//! binary; nothing here prints or reads the process environment.

pub mod config;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod index;
pub mod lifecycle;
pub mod models;
pub mod protect;
pub mod trash;

pub use config::{Config, ProtectedBehavior, DEFAULT_RETENTION_DAYS};
pub use errors::{CoreError, Result};
pub use fs::{FileSystem, RealFileSystem};
pub use helpers::{
    absolutize,
    local_hostname,
    normalize_path,
    print_size,
    sidecar_path,
    LISTING_TIME_FORMAT,
    SIDECAR_SUFFIX,
};
pub use index::{TrashEntry, TrashScan};
pub use models::{
    EmptyReport,
    ItemFailure,
    ListEntry,
    MoveOutcome,
    ProtectionStatus,
    Provenance,
    PurgeReport,
    PurgedItem,
    RestoreOutcome,
    TrashMetadata,
};
pub use protect::{
    authorize,
    classify,
    is_confirmation,
    ProtectionRules,
    CONFIRMATION_PHRASE,
};
pub use trash::Trash;

/// Re-export a small stable API surface for the command crate.
pub mod prelude {
    pub use crate::{
        config::*,
        errors::{CoreError, Result},
        fs::{FileSystem, RealFileSystem},
        helpers::*,
        models::*,
        protect::*,
        trash::Trash,
    };
}
