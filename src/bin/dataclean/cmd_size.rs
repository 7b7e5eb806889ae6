use anyhow::{Context, Result};

use dataclean::SnapshotManager;

use crate::util::{print_json, Ctx};

pub fn exec(ctx: Ctx, json: bool) -> Result<()> {
    let d = ctx.detect()?;
    let transport = ctx.transport()?;
    let mgr = SnapshotManager::new(ctx.cfg.clone(), transport.as_ref());
    let report = mgr.size_report(&d.volumes).context("size report")?;

    if json {
        return print_json(&report);
    }
    println!("Volumes: {} total", report.total_size_human);
    for info in report.by_datastore.values() {
        println!(
            "  {:<16} {:>10}  ({} volume(s))",
            info.kind.display_name(),
            info.size_human,
            info.count
        );
    }
    for (name, bytes) in &report.by_volume {
        println!("  - {:<32} {:>10}", name, dataclean::format_size(*bytes));
    }
    println!(
        "Snapshots: {} stored, {}",
        report.snapshot_count,
        dataclean::format_size(report.snapshot_size)
    );
    Ok(())
}
