use anyhow::{Context, Result};

use dataclean::{OfflineTransport, SnapshotManager};

use crate::util::{print_json, print_snapshot, Ctx};

pub fn exec_list(ctx: Ctx, tag: Option<String>, json: bool) -> Result<()> {
    let mgr = SnapshotManager::new(ctx.cfg.clone(), &OfflineTransport);
    let snaps = match tag.as_deref() {
        Some(t) => mgr.list_by_tag(t),
        None => mgr.list(),
    }
    .with_context(|| format!("list snapshots in {}", ctx.cfg.snapshot_dir.display()))?;

    if json {
        return print_json(&snaps);
    }
    if snaps.is_empty() {
        println!("(no snapshots)");
        return Ok(());
    }
    println!("{:<36} {:<25} {:>10} {:>4}  TAGS", "NAME", "CREATED", "SIZE", "VOLS");
    for s in snaps {
        println!(
            "{:<36} {:<25} {:>10} {:>4}  {}",
            s.name,
            s.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            s.size_human,
            s.volumes.len(),
            s.tags.join(",")
        );
    }
    Ok(())
}

pub fn exec_show(ctx: Ctx, name: String, json: bool) -> Result<()> {
    let mgr = SnapshotManager::new(ctx.cfg.clone(), &OfflineTransport);
    let snap = mgr.get(&name).with_context(|| format!("read snapshot '{}'", name))?;
    if json {
        return print_json(&snap);
    }
    print_snapshot(&snap);
    println!(
        "On disk: {}",
        dataclean::format_size(mgr.store().stored_bytes(&snap.name))
    );
    Ok(())
}
