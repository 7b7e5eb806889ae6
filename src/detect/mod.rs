//! Volume detection from a compose manifest.
//! - manifest.rs: compose parsing, mount syntax, manifest lookup.
//! - project.rs: project-name resolvers (volume name prefix).
//!
//! Per service, per mount (document order):
//!   skip bind mounts -> skip undeclared references -> include filter -> exclude filter
//!   -> classify(image, mount path, hint[reference]) -> name = "<project>_<reference>".
//! The same reference mounted by two services yields two records.

mod manifest;
mod project;

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::classify::classify;
use crate::config::Config;
use crate::error::Result;
use crate::models::Volume;

pub use manifest::{locate_manifest, ComposeManifest, ComposeService, Mount, MountEntry};
pub use project::{DirBasename, FixedProjectName, ProjectNameResolver};

/// Result of a detection pass.
#[derive(Debug, Clone)]
pub struct Detection {
    pub manifest_path: PathBuf,
    pub project: String,
    pub volumes: Vec<Volume>,
}

/// Locate and parse the manifest for `project_dir`, then extract volumes.
pub fn detect(
    cfg: &Config,
    project_dir: &Path,
    resolver: &dyn ProjectNameResolver,
) -> Result<Detection> {
    let manifest_path = locate_manifest(cfg.compose_file.as_deref(), project_dir)?;
    let manifest = ComposeManifest::from_file(&manifest_path)?;
    let project = resolver.project_name(project_dir);
    let volumes = volumes_from_manifest(&manifest, cfg, &project);
    info!(
        "detect: manifest={}, project={}, volumes={}",
        manifest_path.display(),
        project,
        volumes.len()
    );
    Ok(Detection {
        manifest_path,
        project,
        volumes,
    })
}

/// Pure part of detection: manifest + config + project name -> ordered volumes.
pub fn volumes_from_manifest(manifest: &ComposeManifest, cfg: &Config, project: &str) -> Vec<Volume> {
    let mut out = Vec::new();
    for (service_name, service) in &manifest.services {
        for entry in &service.volumes {
            let mount = match entry.parse() {
                Some(m) => m,
                None => continue,
            };
            if mount.is_bind() {
                continue;
            }
            if !manifest.declares(&mount.reference) {
                debug!(
                    "detect: {}: '{}' not declared in top-level volumes, skipped",
                    service_name, mount.reference
                );
                continue;
            }
            if !cfg.include_volumes.is_empty() && !cfg.include_volumes.contains(&mount.reference) {
                continue;
            }
            if cfg.exclude_volumes.contains(&mount.reference) {
                continue;
            }

            let kind = classify(
                service.image.as_deref(),
                Some(&mount.mount_path),
                cfg.hint_for(&mount.reference),
            );
            let mut vol = Volume::new(format!("{}_{}", project, mount.reference), kind)
                .with_mount_path(mount.mount_path.clone());
            vol.container_name = service.container_name.clone();
            vol.image_name = service.image.clone();
            out.push(vol);
        }
    }
    out
}
