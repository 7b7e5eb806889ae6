use anyhow::{anyhow, bail, Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

use dataclean::detect::{detect, Detection, DirBasename, FixedProjectName, ProjectNameResolver};
use dataclean::{ArchiveTransport, Config, DockerTransport, OfflineTransport, RunOptions, Snapshot, Volume};

use crate::cli::{GlobalOpts, VolumeFilter};

/// Everything a command needs, resolved once per invocation.
pub struct Ctx {
    pub cfg: Config,
    pub project_dir: PathBuf,
    pub resolver: Box<dyn ProjectNameResolver>,
    pub run: RunOptions,
    pub quiet: bool,
}

impl Ctx {
    pub fn load(g: &GlobalOpts) -> Result<Self> {
        let project_dir = g.project_dir.clone();
        let cfg = Config::load(g.config.as_deref(), &project_dir)
            .with_context(|| format!("load config for {}", project_dir.display()))?;
        log::debug!("{}", cfg);
        let resolver: Box<dyn ProjectNameResolver> = match &g.project_name {
            Some(n) if !n.trim().is_empty() => Box::new(FixedProjectName(n.trim().to_string())),
            _ => Box::new(DirBasename),
        };
        Ok(Self {
            cfg,
            project_dir,
            resolver,
            run: RunOptions {
                dry_run: g.dry_run,
                force: g.force,
            },
            quiet: g.quiet,
        })
    }

    /// Apply CLI include/exclude on top of the config (include replaces, exclude adds).
    pub fn with_filter(mut self, f: &VolumeFilter) -> Self {
        if !f.include.is_empty() {
            self.cfg.include_volumes = f.include.clone();
        }
        self.cfg.exclude_volumes.extend(f.exclude.iter().cloned());
        self
    }

    pub fn detect(&self) -> Result<Detection> {
        detect(&self.cfg, &self.project_dir, self.resolver.as_ref())
            .with_context(|| format!("detect volumes in {}", self.project_dir.display()))
    }

    /// Docker for real runs; dry-runs never reach the runtime.
    pub fn transport(&self) -> Result<Box<dyn ArchiveTransport>> {
        if self.run.dry_run {
            return Ok(Box::new(OfflineTransport));
        }
        let t = DockerTransport::connect().context("connect to Docker")?;
        Ok(Box::new(t))
    }

    /// Destructive commands need --force (or --dry-run, which changes nothing).
    pub fn require_force(&self, what: &str) -> Result<()> {
        if self.run.force || self.run.dry_run {
            return Ok(());
        }
        bail!("{what} is destructive; re-run with --force (or --dry-run to preview)")
    }

    pub fn say(&self, line: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", line.as_ref());
        }
    }
}

/// "k=v" entries -> map.
pub fn parse_kv(entries: &[String]) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for e in entries {
        let (k, v) = e
            .split_once('=')
            .ok_or_else(|| anyhow!("metadata entry '{}' must look like key=value", e))?;
        let k = k.trim();
        if k.is_empty() {
            bail!("metadata entry '{}' has an empty key", e);
        }
        out.insert(k.to_string(), v.to_string());
    }
    Ok(out)
}

pub fn print_volumes(ctx: &Ctx, volumes: &[Volume]) {
    for v in volumes {
        ctx.say(format!("  - {} ({})", v.name, v.datastore));
    }
}

pub fn print_snapshot(s: &Snapshot) {
    println!("Snapshot {}", s.name);
    println!("  created     = {}", s.timestamp.to_rfc3339());
    println!("  size        = {} ({} B)", s.size_human, s.size_bytes);
    println!("  path        = {}", s.path.display());
    if let Some(d) = s.description.as_deref() {
        println!("  description = {}", d);
    }
    if !s.tags.is_empty() {
        println!("  tags        = {}", s.tags.join(", "));
    }
    for (k, v) in &s.metadata {
        println!("  meta.{:<7}= {}", k, v);
    }
    if let Some(p) = s.parent_name.as_deref() {
        println!("  parent      = {} (incremental={})", p, s.incremental);
    }
    println!("Volumes: {}", s.volumes.len());
    for v in &s.volumes {
        println!(
            "  - {:<32} {:<8} {}",
            v.name,
            v.datastore.as_str(),
            v.size_human.as_deref().unwrap_or("-")
        );
    }
}

pub fn print_json<T: serde::Serialize>(v: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json output")?;
    println!("{s}");
    Ok(())
}
