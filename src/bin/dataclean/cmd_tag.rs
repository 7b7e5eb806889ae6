use anyhow::{Context, Result};

use dataclean::{OfflineTransport, SnapshotManager};

use crate::cli::TagCmd;
use crate::util::{parse_kv, Ctx};

pub fn exec_tag(ctx: Ctx, op: TagCmd) -> Result<()> {
    let mgr = SnapshotManager::new(ctx.cfg.clone(), &OfflineTransport);
    let snap = match op {
        TagCmd::Add { name, tag } => mgr
            .add_tag(&name, &tag)
            .with_context(|| format!("tag '{}' with '{}'", name, tag))?,
        TagCmd::Remove { name, tag } => mgr
            .remove_tag(&name, &tag)
            .with_context(|| format!("untag '{}' from '{}'", tag, name))?,
    };
    ctx.say(format!("{}: tags=[{}]", snap.name, snap.tags.join(", ")));
    Ok(())
}

pub fn exec_describe(ctx: Ctx, name: String, text: String) -> Result<()> {
    let mgr = SnapshotManager::new(ctx.cfg.clone(), &OfflineTransport);
    let snap = mgr
        .update_description(&name, &text)
        .with_context(|| format!("describe '{}'", name))?;
    ctx.say(format!(
        "{}: description={}",
        snap.name,
        snap.description.as_deref().unwrap_or("(none)")
    ));
    Ok(())
}

pub fn exec_annotate(ctx: Ctx, name: String, entries: Vec<String>) -> Result<()> {
    let kv = parse_kv(&entries)?;
    let mgr = SnapshotManager::new(ctx.cfg.clone(), &OfflineTransport);
    let snap = mgr
        .update_metadata(&name, &kv)
        .with_context(|| format!("annotate '{}'", name))?;
    for (k, v) in &snap.metadata {
        ctx.say(format!("{}: {}={}", snap.name, k, v));
    }
    Ok(())
}
