//! Configuration for dataclean (one document per project, read once per invocation).
//!
//! Sources, later wins:
//! - defaults (snapshot_dir = .dataclean, backup_before_restore = true);
//! - `--config <path>` or the first of `.dataclean.yaml` / `.dataclean.yml` in the project root;
//! - ENV overrides:
//!   DATACLEAN_COMPOSE_FILE, DATACLEAN_SNAPSHOT_DIR,
//!   DATACLEAN_BACKUP_BEFORE_RESTORE (1|true|yes|on), DATACLEAN_RETENTION_DAYS.
//!
//! Relative paths are anchored at the project root by `Config::load`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::consts::{
    CONFIG_FILES, DEFAULT_SNAPSHOT_DIR, ENV_BACKUP_BEFORE_RESTORE, ENV_COMPOSE_FILE,
    ENV_RETENTION_DAYS, ENV_SNAPSHOT_DIR,
};
use crate::error::{Error, Result};
use crate::models::DatastoreKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compose manifest; auto-detected in the project root if None.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose_file: Option<PathBuf>,

    /// Only these volume references (unprefixed). Empty = all.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_volumes: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_volumes: Vec<String>,

    /// Volume reference (unprefixed) -> datastore kind; overrides classification.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub datastore_hints: BTreeMap<String, DatastoreKind>,

    pub snapshot_dir: PathBuf,

    /// Take an automatic `_pre-*` snapshot before restore/reset.
    pub backup_before_restore: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub default_tags: Vec<String>,

    /// Snapshots older than this are swept by cleanup; <= 0 disables.
    pub retention_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compose_file: None,
            include_volumes: Vec::new(),
            exclude_volumes: Vec::new(),
            datastore_hints: BTreeMap::new(),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            backup_before_restore: true,
            default_tags: Vec::new(),
            retention_days: 0,
        }
    }
}

fn env_bool(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}

impl Config {
    /// Load config for a project: explicit file, else first recognized file, else defaults.
    /// ENV overrides are applied afterwards; relative paths are anchored at `project_dir`.
    pub fn load(explicit: Option<&Path>, project_dir: &Path) -> Result<Self> {
        let cfg = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let found = CONFIG_FILES
                    .iter()
                    .map(|name| project_dir.join(name))
                    .find(|p| p.is_file());
                match found {
                    Some(path) => Self::from_file(&path)?,
                    None => {
                        debug!("config: no config file in {}, using defaults", project_dir.display());
                        Self::default()
                    }
                }
            }
        };
        Ok(cfg.apply_env().anchored(project_dir))
    }

    /// Parse one config document.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("read config {}", path.display()), e))?;
        Self::from_yaml(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document is a valid "all defaults" config.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Write this config as YAML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, yaml).map_err(|e| Error::io(format!("write config {}", path.display()), e))
    }

    /// Apply DATACLEAN_* environment overrides.
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = std::env::var(ENV_COMPOSE_FILE) {
            let s = v.trim();
            if !s.is_empty() {
                self.compose_file = Some(PathBuf::from(s));
            }
        }
        if let Ok(v) = std::env::var(ENV_SNAPSHOT_DIR) {
            let s = v.trim();
            if !s.is_empty() {
                self.snapshot_dir = PathBuf::from(s);
            }
        }
        if let Ok(v) = std::env::var(ENV_BACKUP_BEFORE_RESTORE) {
            self.backup_before_restore = env_bool(&v);
        }
        if let Ok(v) = std::env::var(ENV_RETENTION_DAYS) {
            if let Ok(n) = v.trim().parse::<i64>() {
                self.retention_days = n;
            }
        }
        self
    }

    /// Make relative snapshot_dir/compose_file absolute under `project_dir`.
    pub fn anchored(mut self, project_dir: &Path) -> Self {
        if self.snapshot_dir.is_relative() {
            self.snapshot_dir = project_dir.join(&self.snapshot_dir);
        }
        if let Some(f) = self.compose_file.take() {
            self.compose_file = Some(if f.is_relative() { project_dir.join(f) } else { f });
        }
        self
    }

    /// Hint configured for an unprefixed volume reference.
    pub fn hint_for(&self, reference: &str) -> Option<DatastoreKind> {
        self.datastore_hints.get(reference).copied()
    }

    // Fluent setters

    pub fn with_compose_file<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.compose_file = path.map(Into::into);
        self
    }

    pub fn with_snapshot_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    pub fn with_include(mut self, refs: Vec<String>) -> Self {
        self.include_volumes = refs;
        self
    }

    pub fn with_exclude(mut self, refs: Vec<String>) -> Self {
        self.exclude_volumes = refs;
        self
    }

    pub fn with_hint(mut self, reference: impl Into<String>, kind: DatastoreKind) -> Self {
        self.datastore_hints.insert(reference.into(), kind);
        self
    }

    pub fn with_backup_before_restore(mut self, on: bool) -> Self {
        self.backup_before_restore = on;
        self
    }

    pub fn with_default_tags(mut self, tags: Vec<String>) -> Self {
        self.default_tags = tags;
        self
    }

    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.retention_days = days;
        self
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ \
             compose_file: {}, \
             include: [{}], \
             exclude: [{}], \
             hints: {}, \
             snapshot_dir: {}, \
             backup_before_restore: {}, \
             default_tags: [{}], \
             retention_days: {} \
             }}",
            self.compose_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "auto".to_string()),
            self.include_volumes.join(", "),
            self.exclude_volumes.join(", "),
            self.datastore_hints.len(),
            self.snapshot_dir.display(),
            self.backup_before_restore,
            self.default_tags.join(", "),
            if self.retention_days > 0 {
                format!("{}d", self.retention_days)
            } else {
                "off".to_string()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.snapshot_dir, PathBuf::from(".dataclean"));
        assert!(cfg.backup_before_restore);
        assert_eq!(cfg.retention_days, 0);
        assert!(cfg.include_volumes.is_empty());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg = Config::from_yaml(
            "exclude_volumes: [cache]\ndatastore_hints:\n  blob: mongodb\nretention_days: 7\n",
        )
        .unwrap();
        assert_eq!(cfg.exclude_volumes, vec!["cache".to_string()]);
        assert_eq!(cfg.hint_for("blob"), Some(DatastoreKind::MongoDb));
        assert_eq!(cfg.hint_for("other"), None);
        assert_eq!(cfg.retention_days, 7);
        assert!(cfg.backup_before_restore);
        assert_eq!(cfg.snapshot_dir, PathBuf::from(".dataclean"));
    }

    #[test]
    fn explicit_false_overrides_default() {
        let cfg = Config::from_yaml("backup_before_restore: false\n").unwrap();
        assert!(!cfg.backup_before_restore);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn anchored_keeps_absolute_paths() {
        let abs = std::env::temp_dir().join("snaps");
        let cfg = Config::default()
            .with_snapshot_dir(abs.clone())
            .with_compose_file(Some("stack/compose.yaml"))
            .anchored(Path::new("/work/proj"));
        assert_eq!(cfg.snapshot_dir, abs);
        assert_eq!(cfg.compose_file, Some(PathBuf::from("/work/proj/stack/compose.yaml")));
    }
}
