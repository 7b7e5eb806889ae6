//! Data model: datastore kinds, volumes, snapshot records, size reports.
//!
//! Field names of `Volume`/`Snapshot` are the on-disk metadata.yaml keys; keep them stable.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of data engine behind a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatastoreKind {
    Postgres,
    MySql,
    Redis,
    MongoDb,
    Neo4j,
    Generic,
}

impl DatastoreKind {
    /// All kinds, in classifier/display order.
    pub fn all() -> [DatastoreKind; 6] {
        [
            DatastoreKind::Postgres,
            DatastoreKind::MySql,
            DatastoreKind::Redis,
            DatastoreKind::MongoDb,
            DatastoreKind::Neo4j,
            DatastoreKind::Generic,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatastoreKind::Postgres => "postgres",
            DatastoreKind::MySql => "mysql",
            DatastoreKind::Redis => "redis",
            DatastoreKind::MongoDb => "mongodb",
            DatastoreKind::Neo4j => "neo4j",
            DatastoreKind::Generic => "generic",
        }
    }

    /// Human-readable engine name.
    pub fn display_name(&self) -> &'static str {
        match self {
            DatastoreKind::Postgres => "PostgreSQL",
            DatastoreKind::MySql => "MySQL/MariaDB",
            DatastoreKind::Redis => "Redis",
            DatastoreKind::MongoDb => "MongoDB",
            DatastoreKind::Neo4j => "Neo4j",
            DatastoreKind::Generic => "Generic Volume",
        }
    }
}

// Unknown names (hand-edited records, hints for engines we do not know) degrade to Generic.
impl From<String> for DatastoreKind {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => DatastoreKind::Postgres,
            "mysql" => DatastoreKind::MySql,
            "redis" => DatastoreKind::Redis,
            "mongodb" => DatastoreKind::MongoDb,
            "neo4j" => DatastoreKind::Neo4j,
            _ => DatastoreKind::Generic,
        }
    }
}

impl From<DatastoreKind> for String {
    fn from(k: DatastoreKind) -> Self {
        k.as_str().to_string()
    }
}

impl fmt::Display for DatastoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named volume attached to a compose service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Project-prefixed name as seen by the container runtime.
    pub name: String,
    #[serde(rename = "datastore_type")]
    pub datastore: DatastoreKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// Archive size, filled in after export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
}

impl Volume {
    pub fn new(name: impl Into<String>, datastore: DatastoreKind) -> Self {
        Self {
            name: name.into(),
            datastore,
            container_name: None,
            mount_path: None,
            image_name: None,
            size_bytes: None,
            size_human: None,
        }
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container_name = Some(container.into());
        self
    }

    pub fn with_mount_path(mut self, path: impl Into<String>) -> Self {
        self.mount_path = Some(path.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image_name = Some(image.into());
        self
    }

    pub(crate) fn set_size(&mut self, bytes: u64) {
        self.size_bytes = Some(bytes);
        self.size_human = Some(format_size(bytes));
    }
}

/// Persisted snapshot record (one metadata.yaml per snapshot directory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub size_human: String,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// Reserved for incremental snapshots; carried but never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub incremental: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Snapshot {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Automatic pre-restore/pre-reset backup.
    pub fn is_auto_backup(&self) -> bool {
        self.name.starts_with(crate::consts::AUTO_BACKUP_PREFIX)
    }
}

/// Size aggregate for one datastore kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatastoreSizeInfo {
    #[serde(rename = "type")]
    pub kind: DatastoreKind,
    pub total_size: u64,
    pub size_human: String,
    pub count: usize,
}

/// Live volume sizes plus catalog totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeReport {
    pub total_size: u64,
    pub total_size_human: String,
    pub by_datastore: BTreeMap<String, DatastoreSizeInfo>,
    pub by_volume: BTreeMap<String, u64>,
    pub snapshot_count: usize,
    pub snapshot_size: u64,
}

/// Binary-unit size string: "512 B", "1.5 KB", "2.0 GB".
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let suffix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_binary_units() {
        let cases = [
            (0u64, "0 B"),
            (100, "100 B"),
            (1024, "1.0 KB"),
            (1536, "1.5 KB"),
            (1_048_576, "1.0 MB"),
            (1_572_864, "1.5 MB"),
            (1_073_741_824, "1.0 GB"),
            (1_610_612_736, "1.5 GB"),
        ];
        for (bytes, want) in cases {
            assert_eq!(format_size(bytes), want, "format_size({bytes})");
        }
    }

    #[test]
    fn unknown_kind_name_degrades_to_generic() {
        assert_eq!(DatastoreKind::from("cassandra".to_string()), DatastoreKind::Generic);
        assert_eq!(DatastoreKind::from("MongoDB".to_string()), DatastoreKind::MongoDb);
        assert_eq!(DatastoreKind::Generic.display_name(), "Generic Volume");
    }

    #[test]
    fn volume_record_uses_datastore_type_key() {
        let v = Volume::new("proj_pgdata", DatastoreKind::Postgres).with_container("db");
        let yaml = serde_yaml::to_string(&v).unwrap();
        assert!(yaml.contains("datastore_type: postgres"), "{yaml}");
        assert!(!yaml.contains("mount_path"), "{yaml}");
        let back: Volume = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, v);
    }
}
