use anyhow::{Context, Result};

use dataclean::SnapshotManager;

use crate::cmd_restore::print_report;
use crate::util::{print_volumes, Ctx};

/// Wipe every detected volume.
pub fn exec(ctx: Ctx) -> Result<()> {
    let d = ctx.detect()?;
    if d.volumes.is_empty() {
        log::warn!("no compose volumes detected in {}", ctx.project_dir.display());
        return Ok(());
    }
    ctx.say(format!("RESET will delete all data in {} volume(s):", d.volumes.len()));
    print_volumes(&ctx, &d.volumes);
    ctx.require_force("reset")?;

    let transport = ctx.transport()?;
    let mgr = SnapshotManager::new(ctx.cfg.clone(), transport.as_ref());
    let report = mgr.reset(&d.volumes, ctx.run).context("reset volumes")?;
    print_report(&ctx, &report);
    if !report.dry_run {
        ctx.say(format!("Reset {} volume(s)", report.volumes.len()));
    }
    Ok(())
}
