//! Error taxonomy of the dataclean core.
//!
//! - NotFound: manifest or snapshot is absent.
//! - Parse: malformed manifest, config document or metadata record.
//! - Transport: export/import/clear/size failures reported by the archive transport.
//! - Io: local filesystem failures around the snapshot root.
//!
//! Best-effort steps (pause/resume, auto-backup) never surface here; see `transport::Step`.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no compose file found in {}", dir.display())]
    ManifestNotFound { dir: PathBuf },

    #[error("compose file {} does not exist", path.display())]
    ComposeFileMissing { path: PathBuf },

    #[error("failed to parse {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("snapshot '{name}' not found")]
    SnapshotNotFound { name: String },

    #[error("invalid snapshot name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid snapshot metadata {}: {source}", path.display())]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to export volume {volume}: {reason}")]
    Export { volume: String, reason: String },

    #[error("failed to import volume {volume}: {reason}")]
    Import { volume: String, reason: String },

    #[error("failed to clear volume {volume}: {reason}")]
    Clear { volume: String, reason: String },

    #[error("failed to query size of volume {volume}: {reason}")]
    SizeQuery { volume: String, reason: String },

    #[error("archive transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Manifest or snapshot absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ManifestNotFound { .. }
                | Error::ComposeFileMissing { .. }
                | Error::SnapshotNotFound { .. }
        )
    }

    /// Failure reported by the archive transport.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Export { .. } | Error::Import { .. } | Error::Clear { .. } | Error::SizeQuery { .. }
        )
    }
}
