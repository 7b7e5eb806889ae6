//! dataclean: snapshot, restore and reset the data volumes of a Docker Compose stack.
//!
//! manifest -> detect -> [Volume] -> SnapshotManager -> ArchiveTransport (per volume)
//!                                                   -> MetadataStore (record written last)

pub mod consts;
pub mod error;
pub mod models;
pub mod classify;
pub mod config;
pub mod detect;
pub mod transport;
pub mod store;
pub mod snapshot;

pub use classify::classify;
pub use config::Config;
pub use detect::{detect, volumes_from_manifest, ComposeManifest, Detection, DirBasename, FixedProjectName, ProjectNameResolver};
pub use error::{Error, Result};
pub use models::{format_size, DatastoreKind, DatastoreSizeInfo, SizeReport, Snapshot, Volume};
pub use snapshot::{CreateOptions, DestructiveReport, RunOptions, SnapshotManager};
pub use store::{sanitize_name, MetadataStore};
pub use transport::{ArchiveTransport, DockerTransport, OfflineTransport, Step};
