//! Compose manifest: the subset of docker-compose.yaml we care about.
//!
//! Services keep document order (serde_yaml::Mapping is insertion-ordered),
//! so detection output follows the manifest.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::consts::COMPOSE_FILES;
use crate::error::{Error, Result};

/// One service: image, container name and its volume mounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeService {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub volumes: Vec<MountEntry>,
}

/// Short (`ref:/path[:mode]`) or long (`{type, source, target}`) mount syntax.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MountEntry {
    Short(String),
    Long {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        read_only: Option<bool>,
    },
}

/// A parsed mount: volume reference, mount path, optional mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub reference: String,
    pub mount_path: String,
    pub mode: Option<String>,
}

impl Mount {
    /// Bind mounts (host paths) are not managed volumes.
    pub fn is_bind(&self) -> bool {
        self.reference.starts_with('.')
            || self.reference.starts_with('/')
            || self.reference.starts_with('~')
    }
}

impl MountEntry {
    /// None for anonymous volumes (no reference) and malformed entries.
    pub fn parse(&self) -> Option<Mount> {
        match self {
            MountEntry::Short(s) => {
                let mut parts = s.split(':');
                let reference = parts.next()?.trim();
                let mount_path = parts.next()?.trim();
                if reference.is_empty() || mount_path.is_empty() {
                    return None;
                }
                Some(Mount {
                    reference: reference.to_string(),
                    mount_path: mount_path.to_string(),
                    mode: parts.next().map(|m| m.to_string()),
                })
            }
            MountEntry::Long {
                kind,
                source,
                target,
                read_only,
            } => {
                if kind.as_deref().map(|k| k != "volume").unwrap_or(false) {
                    // bind/tmpfs/npipe
                    return None;
                }
                let reference = source.as_deref()?.trim();
                let mount_path = target.as_deref()?.trim();
                if reference.is_empty() || mount_path.is_empty() {
                    return None;
                }
                Some(Mount {
                    reference: reference.to_string(),
                    mount_path: mount_path.to_string(),
                    mode: read_only.filter(|ro| *ro).map(|_| "ro".to_string()),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    services: Option<serde_yaml::Mapping>,
    #[serde(default)]
    volumes: Option<serde_yaml::Mapping>,
}

/// Parsed manifest: ordered services plus the declared named volumes.
#[derive(Debug, Clone, Default)]
pub struct ComposeManifest {
    pub services: Vec<(String, ComposeService)>,
    /// Keys of the top-level `volumes:` section. Empty = section absent or empty.
    pub declared_volumes: Vec<String>,
}

impl ComposeManifest {
    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let raw: RawManifest = if text.trim().is_empty() {
            RawManifest::default()
        } else {
            serde_yaml::from_str(text)?
        };

        let mut services = Vec::new();
        for (k, v) in raw.services.unwrap_or_default() {
            let name = match k.as_str() {
                Some(s) => s.to_string(),
                None => continue,
            };
            let svc: ComposeService = if v.is_null() {
                ComposeService::default()
            } else {
                serde_yaml::from_value(v)?
            };
            services.push((name, svc));
        }

        let declared_volumes = raw
            .volumes
            .unwrap_or_default()
            .keys()
            .filter_map(|k| k.as_str().map(|s| s.to_string()))
            .collect();

        Ok(Self {
            services,
            declared_volumes,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("read {}", path.display()), e))?;
        Self::from_yaml(&text).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether a reference is a managed named volume.
    /// An absent/empty `volumes:` section accepts every named reference.
    pub fn declares(&self, reference: &str) -> bool {
        self.declared_volumes.is_empty() || self.declared_volumes.iter().any(|v| v == reference)
    }
}

/// Explicit path if given (must exist), else the first conventional file in `project_dir`.
pub fn locate_manifest(explicit: Option<&Path>, project_dir: &Path) -> Result<PathBuf> {
    if let Some(p) = explicit {
        if p.is_file() {
            return Ok(p.to_path_buf());
        }
        return Err(Error::ComposeFileMissing {
            path: p.to_path_buf(),
        });
    }
    COMPOSE_FILES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| Error::ManifestNotFound {
            dir: project_dir.to_path_buf(),
        })
}
