use anyhow::Result;
use serde_json::json;

use dataclean::DatastoreKind;

use crate::util::{print_json, Ctx};

/// Read-only: what would dataclean operate on?
pub fn exec(ctx: Ctx, as_json: bool) -> Result<()> {
    let d = ctx.detect()?;

    if as_json {
        return print_json(&json!({
            "compose_file": d.manifest_path.display().to_string(),
            "project": d.project,
            "snapshot_dir": ctx.cfg.snapshot_dir.display().to_string(),
            "excluded": ctx.cfg.exclude_volumes,
            "volumes": d.volumes,
        }));
    }

    println!("Compose file: {}", d.manifest_path.display());
    println!("Project:      {}", d.project);
    if d.volumes.is_empty() {
        println!("No snapshot-capable volumes detected.");
        println!("Tip: declare named volumes for data services in the compose file.");
        return Ok(());
    }

    println!("Detected {} snapshot-capable volume(s):", d.volumes.len());
    for kind in DatastoreKind::all() {
        let group: Vec<_> = d.volumes.iter().filter(|v| v.datastore == kind).collect();
        if group.is_empty() {
            continue;
        }
        println!("  {}", kind.display_name());
        for v in group {
            let mut line = format!("    - {}", v.name);
            if let Some(p) = v.mount_path.as_deref() {
                line.push_str(&format!(" -> {}", p));
            }
            if let Some(c) = v.container_name.as_deref() {
                line.push_str(&format!(" (container: {})", c));
            }
            println!("{line}");
        }
    }

    if !ctx.cfg.exclude_volumes.is_empty() {
        println!("Excluded (config): {}", ctx.cfg.exclude_volumes.join(", "));
    }
    let root = &ctx.cfg.snapshot_dir;
    if root.exists() {
        println!("Snapshot directory: {}", root.display());
    } else {
        println!("Snapshot directory: {} (will be created)", root.display());
    }
    Ok(())
}
