//! Fixed names shared by the detector, the metadata store and the manager.

/// Default snapshot root (relative to the project directory).
pub const DEFAULT_SNAPSHOT_DIR: &str = ".dataclean";

/// Per-snapshot metadata record file name.
pub const METADATA_FILE: &str = "metadata.yaml";

/// Extension of one volume archive inside a snapshot directory.
pub const ARCHIVE_EXT: &str = "tar.gz";

/// Config documents probed in the project root, first match wins.
pub const CONFIG_FILES: [&str; 2] = [".dataclean.yaml", ".dataclean.yml"];

/// Compose manifests probed in the project root, first match wins.
pub const COMPOSE_FILES: [&str; 4] = [
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// Marker prefix of automatic backups; retention never removes these.
pub const AUTO_BACKUP_PREFIX: &str = "_";

/// Characters replaced by '_' when turning a volume name into a file name.
pub const UNSAFE_FILENAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Helper image used by the Docker transport to reach volume contents.
pub const DEFAULT_HELPER_IMAGE: &str = "alpine";

// ENV overrides
pub const ENV_COMPOSE_FILE: &str = "DATACLEAN_COMPOSE_FILE";
pub const ENV_SNAPSHOT_DIR: &str = "DATACLEAN_SNAPSHOT_DIR";
pub const ENV_BACKUP_BEFORE_RESTORE: &str = "DATACLEAN_BACKUP_BEFORE_RESTORE";
pub const ENV_RETENTION_DAYS: &str = "DATACLEAN_RETENTION_DAYS";
pub const ENV_HELPER_IMAGE: &str = "DATACLEAN_HELPER_IMAGE";
