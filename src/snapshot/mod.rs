//! Snapshot manager split into submodules:
//! - manager.rs: create/restore/reset/delete/list/get, auto-backup policy.
//! - tags.rs: tag/description/metadata updates (read-modify-write of the record).
//! - retention.rs: age-based cleanup sweep.
//! - report.rs: live volume + catalog size report.
//! - guard.rs: scoped container pause/resume.

mod guard;
mod manager;
mod report;
mod retention;
mod tags;

pub use manager::{
    auto_backup_name, default_snapshot_name, CreateOptions, DestructiveReport, RunOptions,
    SnapshotManager,
};
