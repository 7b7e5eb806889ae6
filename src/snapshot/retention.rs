//! Retention sweep.
//!
//! retention_days <= 0 disables the sweep. Otherwise every snapshot older than
//! now - retention_days is deleted, except automatic `_pre-*` backups.
//! A failed delete is logged and the sweep goes on.

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::error::Result;

use super::{RunOptions, SnapshotManager};

impl SnapshotManager<'_> {
    /// Sweep relative to the current time; returns deleted (or, in dry-run, doomed) names.
    pub fn cleanup_old_snapshots(&self, run: RunOptions) -> Result<Vec<String>> {
        self.cleanup_old_snapshots_at(Utc::now(), run)
    }

    pub fn cleanup_old_snapshots_at(&self, now: DateTime<Utc>, run: RunOptions) -> Result<Vec<String>> {
        let days = self.cfg.retention_days;
        if days <= 0 {
            return Ok(Vec::new());
        }
        let cutoff = match Duration::try_days(days).and_then(|d| now.checked_sub_signed(d)) {
            Some(c) => c,
            // window reaches past the calendar: nothing can be older
            None => return Ok(Vec::new()),
        };

        let mut deleted = Vec::new();
        for snap in self.list()? {
            if snap.is_auto_backup() || snap.timestamp >= cutoff {
                continue;
            }
            if run.dry_run {
                deleted.push(snap.name);
                continue;
            }
            match self.store.remove(&snap.name) {
                Ok(()) => deleted.push(snap.name),
                Err(e) => warn!("cleanup: failed to delete '{}' (skipped): {}", snap.name, e),
            }
        }
        info!(
            "cleanup: retention={}d cutoff={} removed={}",
            days,
            cutoff.to_rfc3339(),
            deleted.len()
        );
        Ok(deleted)
    }
}
