use anyhow::{Context, Result};
use chrono::Local;

use dataclean::snapshot::default_snapshot_name;
use dataclean::{CreateOptions, SnapshotManager};

use crate::util::{parse_kv, print_volumes, Ctx};

/// Create a snapshot of every detected volume.
pub fn exec(
    ctx: Ctx,
    name: Option<String>,
    tags: Vec<String>,
    description: Option<String>,
    meta: Vec<String>,
) -> Result<()> {
    let name = name.unwrap_or_else(|| default_snapshot_name(Local::now()));
    let metadata = parse_kv(&meta)?;

    let d = ctx.detect()?;
    if d.volumes.is_empty() {
        log::warn!("no compose volumes detected in {}", ctx.project_dir.display());
        return Ok(());
    }

    ctx.say(format!("Creating snapshot: {}", name));
    print_volumes(&ctx, &d.volumes);

    let transport = ctx.transport()?;
    let mgr = SnapshotManager::new(ctx.cfg.clone(), transport.as_ref());
    let opts = CreateOptions {
        tags,
        description,
        metadata,
        ..CreateOptions::default()
    };
    let snap = mgr
        .create(&name, &d.volumes, opts, ctx.run)
        .with_context(|| format!("create snapshot '{}'", name))?;

    if ctx.run.dry_run {
        ctx.say("Dry run - no changes made");
        return Ok(());
    }
    ctx.say(format!("snapshot: name={} size={} path={}", snap.name, snap.size_human, snap.path.display()));
    if !snap.tags.is_empty() {
        ctx.say(format!("  tags: {}", snap.tags.join(", ")));
    }
    Ok(())
}
