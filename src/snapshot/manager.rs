//! Snapshot lifecycle: create / restore / reset / delete / list / get.
//!
//! Multi-volume loops run in detection order and stop at the first transport
//! error; volumes already processed are not rolled back. Containers are resumed
//! on every exit path (PauseGuard). The metadata record is written last, so a
//! directory without a readable record is never listed.

use std::collections::BTreeMap;
use std::fs;

use chrono::{DateTime, Local, Utc};
use log::{debug, info, warn};

use crate::config::Config;
use crate::consts::AUTO_BACKUP_PREFIX;
use crate::error::Result;
use crate::models::{format_size, Snapshot, Volume};
use crate::store::{archive_path, validate_name, MetadataStore};
use crate::transport::{ArchiveTransport, Step};

use super::guard::PauseGuard;

/// Per-invocation switches (passed explicitly, never global).
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Report what would happen; touch neither the transport nor the snapshot root.
    pub dry_run: bool,
    /// Confirmation already given for destructive operations (checked by the CLI).
    pub force: bool,
}

impl RunOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
    /// Carried into the record only; no delta export exists.
    pub incremental: bool,
    pub parent_name: Option<String>,
}

/// What a restore/reset did, including tolerated failures.
#[derive(Debug)]
pub struct DestructiveReport {
    pub dry_run: bool,
    /// Auto-backup: Some when enabled; Succeeded carries the backup snapshot name.
    pub backup: Option<Step<String>>,
    pub pause: Option<Step<()>>,
    pub resume: Option<Step<()>>,
    /// Volumes imported/cleared (or planned, in dry-run).
    pub volumes: Vec<String>,
}

/// `snapshot-YYYY-MM-DD-HHMMSS` (local time).
pub fn default_snapshot_name(now: DateTime<Local>) -> String {
    format!("snapshot-{}", now.format("%Y-%m-%d-%H%M%S"))
}

/// `_<op>-YYYYMMDD-HHMMSS` (local time); the marker keeps it out of retention sweeps.
pub fn auto_backup_name(op: &str, now: DateTime<Local>) -> String {
    format!("{}{}-{}", AUTO_BACKUP_PREFIX, op, now.format("%Y%m%d-%H%M%S"))
}

// Same full name from two services collapses to the first record.
pub(super) fn unique_volumes(volumes: &[Volume]) -> Vec<Volume> {
    let mut out: Vec<Volume> = Vec::with_capacity(volumes.len());
    for v in volumes {
        if !out.iter().any(|o| o.name == v.name) {
            out.push(v.clone());
        }
    }
    out
}

fn merge_tags(defaults: &[String], extra: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in defaults.iter().chain(extra.iter()) {
        if !t.is_empty() && !out.contains(t) {
            out.push(t.clone());
        }
    }
    out
}

pub struct SnapshotManager<'t> {
    pub(super) cfg: Config,
    pub(super) store: MetadataStore,
    pub(super) transport: &'t dyn ArchiveTransport,
}

impl<'t> SnapshotManager<'t> {
    pub fn new(cfg: Config, transport: &'t dyn ArchiveTransport) -> Self {
        let store = MetadataStore::new(cfg.snapshot_dir.clone());
        Self {
            cfg,
            store,
            transport,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Snapshot the given volumes under `name` (an existing snapshot of that name is overwritten).
    pub fn create(
        &self,
        name: &str,
        volumes: &[Volume],
        opts: CreateOptions,
        run: RunOptions,
    ) -> Result<Snapshot> {
        validate_name(name)?;
        let volumes = unique_volumes(volumes);
        let dir = self.store.snapshot_dir(name);
        let tags = merge_tags(&self.cfg.default_tags, &opts.tags);

        let mut snap = Snapshot {
            name: name.to_string(),
            timestamp: Utc::now(),
            volumes: Vec::new(),
            size_bytes: 0,
            size_human: format_size(0),
            path: dir.clone(),
            checksum: None,
            tags,
            description: opts.description.filter(|d| !d.is_empty()),
            metadata: opts.metadata,
            parent_name: opts.parent_name,
            incremental: opts.incremental,
        };

        if run.dry_run {
            info!("create: dry-run '{}' ({} volume(s))", name, volumes.len());
            snap.volumes = volumes;
            return Ok(snap);
        }

        info!("create: '{}' ({} volume(s)) -> {}", name, volumes.len(), dir.display());
        self.store.create_dir(name)?;
        // an overwritten snapshot stays invalid until its new record lands
        self.store.invalidate(name)?;

        let guard = PauseGuard::acquire(self.transport, &volumes);
        let exported = self.export_all(&snap, &volumes);
        let (_pause, _resume) = guard.release();
        let exported = exported?;

        snap.size_bytes = exported.iter().filter_map(|v| v.size_bytes).sum();
        snap.size_human = format_size(snap.size_bytes);
        snap.volumes = exported;
        snap.timestamp = Utc::now();

        self.store.write(&snap)?;
        info!("create: '{}' done, size={}", name, snap.size_human);
        Ok(snap)
    }

    fn export_all(&self, snap: &Snapshot, volumes: &[Volume]) -> Result<Vec<Volume>> {
        let mut out = Vec::with_capacity(volumes.len());
        for vol in volumes {
            let dest = archive_path(&snap.path, &vol.name);
            debug!("create: export {} -> {}", vol.name, dest.display());
            self.transport.export_volume(vol, &dest)?;

            let mut vol = vol.clone();
            match fs::metadata(&dest) {
                Ok(m) => vol.set_size(m.len()),
                Err(e) => warn!("create: cannot stat {}: {}", dest.display(), e),
            }
            out.push(vol);
        }
        Ok(out)
    }

    /// Best-effort `_<op>-…` snapshot of the current state of `volumes`.
    fn auto_backup(&self, op: &str, volumes: &[Volume]) -> Step<String> {
        let name = auto_backup_name(op, Local::now());
        info!("{op}: auto-backup '{}'", name);
        let res = self
            .create(&name, volumes, CreateOptions::default(), RunOptions::default())
            .map(|s| s.name);
        Step::best_effort(res, "auto-backup")
    }

    /// Replace the contents of the snapshot's volumes with its archives.
    pub fn restore(&self, name: &str, run: RunOptions) -> Result<DestructiveReport> {
        let snap = self.store.read(name)?;
        let volumes = snap.volumes.clone();
        let mut report = DestructiveReport {
            dry_run: run.dry_run,
            backup: None,
            pause: None,
            resume: None,
            volumes: volumes.iter().map(|v| v.name.clone()).collect(),
        };
        if run.dry_run {
            info!("restore: dry-run '{}' ({} volume(s))", name, volumes.len());
            return Ok(report);
        }

        if self.cfg.backup_before_restore {
            report.backup = Some(self.auto_backup("pre-restore", &volumes));
        }

        info!("restore: '{}' ({} volume(s))", name, volumes.len());
        let guard = PauseGuard::acquire(self.transport, &volumes);
        let imported = volumes.iter().try_for_each(|vol| {
            let src = archive_path(&snap.path, &vol.name);
            debug!("restore: import {} <- {}", vol.name, src.display());
            self.transport.import_volume(&src, vol)
        });
        let (pause, resume) = guard.release();
        imported?;

        report.pause = Some(pause);
        report.resume = Some(resume);
        info!("restore: '{}' done", name);
        Ok(report)
    }

    /// Wipe the given volumes.
    pub fn reset(&self, volumes: &[Volume], run: RunOptions) -> Result<DestructiveReport> {
        let volumes = unique_volumes(volumes);
        let mut report = DestructiveReport {
            dry_run: run.dry_run,
            backup: None,
            pause: None,
            resume: None,
            volumes: volumes.iter().map(|v| v.name.clone()).collect(),
        };
        if run.dry_run {
            info!("reset: dry-run ({} volume(s))", volumes.len());
            return Ok(report);
        }

        if self.cfg.backup_before_restore {
            report.backup = Some(self.auto_backup("pre-reset", &volumes));
        }

        info!("reset: clearing {} volume(s)", volumes.len());
        let guard = PauseGuard::acquire(self.transport, &volumes);
        let cleared = volumes.iter().try_for_each(|vol| {
            debug!("reset: clear {}", vol.name);
            self.transport.clear_volume(vol)
        });
        let (pause, resume) = guard.release();
        cleared?;

        report.pause = Some(pause);
        report.resume = Some(resume);
        Ok(report)
    }

    /// Remove a snapshot. Removing one that does not exist succeeds.
    pub fn delete(&self, name: &str, run: RunOptions) -> Result<()> {
        if run.dry_run {
            info!("delete: dry-run '{}'", name);
            return validate_name(name);
        }
        self.store.remove(name)?;
        info!("delete: '{}' removed", name);
        Ok(())
    }

    /// All valid snapshots, newest first.
    pub fn list(&self) -> Result<Vec<Snapshot>> {
        self.store.list()
    }

    pub fn get(&self, name: &str) -> Result<Snapshot> {
        self.store.read(name)
    }

    pub fn list_by_tag(&self, tag: &str) -> Result<Vec<Snapshot>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|s| s.has_tag(tag))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_names() {
        let now = Local.with_ymd_and_hms(2024, 1, 15, 14, 30, 52).unwrap();
        assert_eq!(default_snapshot_name(now), "snapshot-2024-01-15-143052");
        assert_eq!(auto_backup_name("pre-restore", now), "_pre-restore-20240115-143052");
    }

    #[test]
    fn tags_merge_without_duplicates() {
        let d = vec!["dev".to_string(), "auto".to_string()];
        let e = vec!["auto".to_string(), "release".to_string(), String::new()];
        assert_eq!(merge_tags(&d, &e), vec!["dev", "auto", "release"]);
    }
}
