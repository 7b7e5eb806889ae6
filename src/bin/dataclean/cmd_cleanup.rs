use anyhow::{Context, Result};

use dataclean::{OfflineTransport, SnapshotManager};

use crate::util::{print_json, Ctx};

/// Retention sweep (retention_days from config/ENV).
pub fn exec(ctx: Ctx, json: bool) -> Result<()> {
    if ctx.cfg.retention_days <= 0 {
        log::info!("cleanup: retention disabled (retention_days <= 0)");
    }
    let mgr = SnapshotManager::new(ctx.cfg.clone(), &OfflineTransport);
    let deleted = mgr
        .cleanup_old_snapshots(ctx.run)
        .context("retention cleanup")?;

    if json {
        return print_json(&deleted);
    }
    let verb = if ctx.run.dry_run { "would delete" } else { "deleted" };
    if deleted.is_empty() {
        ctx.say("cleanup: nothing to delete");
    }
    for n in deleted {
        ctx.say(format!("cleanup: {} {}", verb, n));
    }
    Ok(())
}
