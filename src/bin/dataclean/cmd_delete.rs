use anyhow::{Context, Result};

use dataclean::{OfflineTransport, SnapshotManager};

use crate::util::Ctx;

pub fn exec(ctx: Ctx, name: String) -> Result<()> {
    let mgr = SnapshotManager::new(ctx.cfg.clone(), &OfflineTransport);
    match mgr.get(&name) {
        Ok(s) => ctx.say(format!(
            "Snapshot to delete: {} (created {}, {}, {} volume(s))",
            s.name,
            s.timestamp.to_rfc3339(),
            s.size_human,
            s.volumes.len()
        )),
        Err(e) if e.is_not_found() => log::info!("delete: '{}' does not exist", name),
        Err(e) => log::warn!("delete: '{}' has an unreadable record: {}", name, e),
    }
    ctx.require_force("delete")?;

    mgr.delete(&name, ctx.run)
        .with_context(|| format!("delete snapshot '{}'", name))?;
    if ctx.run.dry_run {
        ctx.say(format!("Dry run: would delete snapshot '{}'", name));
    } else {
        ctx.say(format!("snapshot-delete: OK (name='{}')", name));
    }
    Ok(())
}
