use anyhow::{Context, Result};

use dataclean::{DestructiveReport, SnapshotManager, Step};

use crate::util::{print_volumes, Ctx};

/// Replace current volume contents with a snapshot.
pub fn exec(ctx: Ctx, name: String) -> Result<()> {
    let transport = ctx.transport()?;
    let mgr = SnapshotManager::new(ctx.cfg.clone(), transport.as_ref());

    let snap = mgr.get(&name).with_context(|| format!("snapshot '{}'", name))?;
    ctx.say(format!(
        "RESTORE will replace current data with snapshot '{}' (created {}, {}, {} volume(s))",
        snap.name,
        snap.timestamp.to_rfc3339(),
        snap.size_human,
        snap.volumes.len()
    ));
    print_volumes(&ctx, &snap.volumes);
    ctx.require_force("restore")?;

    let report = mgr
        .restore(&name, ctx.run)
        .with_context(|| format!("restore snapshot '{}'", name))?;
    print_report(&ctx, &report);
    if !report.dry_run {
        ctx.say(format!("Restored snapshot: {}", name));
    }
    Ok(())
}

pub fn print_report(ctx: &Ctx, report: &DestructiveReport) {
    if report.dry_run {
        ctx.say("Dry run - no changes made");
        return;
    }
    match &report.backup {
        Some(Step::Succeeded(b)) => ctx.say(format!("  backup of current state: {}", b)),
        Some(other) => ctx.say(format!("  backup of current state: {}", other)),
        None => {}
    }
    if let Some(s) = report.pause.as_ref().filter(|s| !s.is_succeeded()) {
        ctx.say(format!("  stop containers: {}", s));
    }
    if let Some(s) = report.resume.as_ref().filter(|s| !s.is_succeeded()) {
        ctx.say(format!("  start containers: {}", s));
    }
}
