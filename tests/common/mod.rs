#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use dataclean::{ArchiveTransport, Config, DatastoreKind, Error, Result, Step, Volume};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("dctest-{prefix}-{pid}-{t}-{id}"))
}

/// Config rooted in a fresh temp dir; auto-backup off unless a test turns it on.
pub fn test_config(root: &Path) -> Config {
    Config::default()
        .with_snapshot_dir(root.join("snapshots"))
        .with_backup_before_restore(false)
}

pub fn pg() -> Volume {
    Volume::new("proj_pgdata", DatastoreKind::Postgres)
        .with_container("proj-db-1")
        .with_mount_path("/var/lib/postgresql/data")
}

pub fn redis() -> Volume {
    Volume::new("proj_redis_data", DatastoreKind::Redis).with_container("proj-cache-1")
}

/// In-memory transport: records every call, writes small fake archives,
/// fails on demand.
#[derive(Default)]
pub struct MockTransport {
    pub calls: Mutex<Vec<String>>,
    pub fail_export: BTreeSet<String>,
    pub fail_import: BTreeSet<String>,
    pub fail_clear: BTreeSet<String>,
    pub sizes: BTreeMap<String, u64>,
    pub pause_fails: bool,
    pub resume_fails: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_export(mut self, volume: &str) -> Self {
        self.fail_export.insert(volume.to_string());
        self
    }

    pub fn failing_import(mut self, volume: &str) -> Self {
        self.fail_import.insert(volume.to_string());
        self
    }

    pub fn failing_clear(mut self, volume: &str) -> Self {
        self.fail_clear.insert(volume.to_string());
        self
    }

    pub fn with_size(mut self, volume: &str, bytes: u64) -> Self {
        self.sizes.insert(volume.to_string(), bytes);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        if let Ok(mut c) = self.calls.lock() {
            c.push(call);
        }
    }
}

impl ArchiveTransport for MockTransport {
    fn export_volume(&self, volume: &Volume, dest: &Path) -> Result<()> {
        self.record(format!("export {}", volume.name));
        if self.fail_export.contains(&volume.name) {
            return Err(Error::Export {
                volume: volume.name.clone(),
                reason: "mock export failure".into(),
            });
        }
        fs::write(dest, format!("archive of {}", volume.name)).map_err(|e| Error::Export {
            volume: volume.name.clone(),
            reason: e.to_string(),
        })
    }

    fn import_volume(&self, src: &Path, volume: &Volume) -> Result<()> {
        self.record(format!("import {}", volume.name));
        if self.fail_import.contains(&volume.name) || !src.is_file() {
            return Err(Error::Import {
                volume: volume.name.clone(),
                reason: format!("cannot import {}", src.display()),
            });
        }
        Ok(())
    }

    fn clear_volume(&self, volume: &Volume) -> Result<()> {
        self.record(format!("clear {}", volume.name));
        if self.fail_clear.contains(&volume.name) {
            return Err(Error::Clear {
                volume: volume.name.clone(),
                reason: "mock clear failure".into(),
            });
        }
        Ok(())
    }

    fn volume_size(&self, volume: &Volume) -> Result<u64> {
        self.record(format!("size {}", volume.name));
        self.sizes.get(&volume.name).copied().ok_or_else(|| Error::SizeQuery {
            volume: volume.name.clone(),
            reason: "no such volume".into(),
        })
    }

    fn pause_containers(&self, _volumes: &[Volume]) -> Step<()> {
        self.record("pause".into());
        if self.pause_fails {
            Step::Ignored("mock pause failure".into())
        } else {
            Step::Succeeded(())
        }
    }

    fn resume_containers(&self, _volumes: &[Volume]) -> Step<()> {
        self.record("resume".into());
        if self.resume_fails {
            Step::Ignored("mock resume failure".into())
        } else {
            Step::Succeeded(())
        }
    }
}
