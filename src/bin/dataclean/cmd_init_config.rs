use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use dataclean::consts::CONFIG_FILES;

use crate::util::Ctx;

/// Write the effective config (defaults + file + ENV) as a starting point.
pub fn exec(ctx: Ctx, out: Option<PathBuf>) -> Result<()> {
    let path = out.unwrap_or_else(|| ctx.project_dir.join(CONFIG_FILES[0]));
    if path.exists() && !ctx.run.force {
        bail!("{} already exists; use --force to overwrite", path.display());
    }
    if ctx.run.dry_run {
        ctx.say(format!("Dry run: would write {}", path.display()));
        return Ok(());
    }
    // store the snapshot dir relative to the project again when possible
    let mut cfg = ctx.cfg.clone();
    if let Ok(rel) = cfg.snapshot_dir.strip_prefix(&ctx.project_dir) {
        cfg.snapshot_dir = rel.to_path_buf();
    }
    if let Some(f) = cfg.compose_file.as_mut() {
        if let Ok(rel) = f.strip_prefix(&ctx.project_dir) {
            *f = rel.to_path_buf();
        }
    }
    cfg.save(&path)
        .with_context(|| format!("write {}", path.display()))?;
    ctx.say(format!("config: wrote {}", path.display()));
    Ok(())
}
