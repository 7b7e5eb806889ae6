//! Metadata store: one directory per snapshot under the snapshot root.
//!
//! Layout:
//!   <root>/<name>/metadata.yaml        — the record (written last: its presence marks a complete snapshot)
//!   <root>/<name>/<sanitized>.tar.gz   — one archive per volume
//!
//! The catalog is whatever directories under <root> hold a readable record;
//! plain files and directories without a record are ignored.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::consts::{ARCHIVE_EXT, METADATA_FILE, UNSAFE_FILENAME_CHARS};
use crate::error::{Error, Result};
use crate::models::Snapshot;

/// Replace filesystem-unsafe characters (`/ \ : * ? " < > |`) with '_'.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Archive file of a volume inside a snapshot directory.
pub fn archive_path(snapshot_dir: &Path, volume_name: &str) -> PathBuf {
    snapshot_dir.join(format!("{}.{}", sanitize_name(volume_name), ARCHIVE_EXT))
}

pub fn metadata_path(snapshot_dir: &Path) -> PathBuf {
    snapshot_dir.join(METADATA_FILE)
}

/// Snapshot names become directory names; refuse anything that escapes the root.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("empty name")
    } else if name == "." || name == ".." {
        Some("reserved name")
    } else if name.contains('/') || name.contains('\\') {
        Some("path separators are not allowed")
    } else {
        None
    };
    match reason {
        Some(r) => Err(Error::InvalidName {
            name: name.to_string(),
            reason: r.to_string(),
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create (or reuse) the directory of a snapshot.
    pub fn create_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.snapshot_dir(name);
        fs::create_dir_all(&dir)
            .map_err(|e| Error::io(format!("create snapshot dir {}", dir.display()), e))?;
        Ok(dir)
    }

    /// Write the record into `snap.path` atomically (tmp + rename).
    pub fn write(&self, snap: &Snapshot) -> Result<()> {
        let path = metadata_path(&snap.path);
        let tmp = snap.path.join(format!("{METADATA_FILE}.tmp"));

        let yaml = serde_yaml::to_string(snap).map_err(|source| Error::MetadataParse {
            path: path.clone(),
            source,
        })?;
        {
            let mut f = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp)
                .map_err(|e| Error::io(format!("open {}", tmp.display()), e))?;
            f.write_all(yaml.as_bytes())
                .map_err(|e| Error::io(format!("write {}", tmp.display()), e))?;
            let _ = f.sync_all();
        }
        fs::rename(&tmp, &path).map_err(|e| {
            Error::io(format!("rename {} -> {}", tmp.display(), path.display()), e)
        })?;
        debug!("store: wrote {}", path.display());
        Ok(())
    }

    /// Load the record of one directory. `path` is reset to that directory
    /// so a moved snapshot root keeps working.
    pub fn read_dir(&self, dir: &Path) -> Result<Snapshot> {
        let path = metadata_path(dir);
        let text = fs::read_to_string(&path).map_err(|_| Error::SnapshotNotFound {
            name: dir
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })?;
        let mut snap: Snapshot =
            serde_yaml::from_str(&text).map_err(|source| Error::MetadataParse { path, source })?;
        snap.path = dir.to_path_buf();
        Ok(snap)
    }

    /// Record by snapshot name.
    pub fn read(&self, name: &str) -> Result<Snapshot> {
        if validate_name(name).is_err() {
            return Err(Error::SnapshotNotFound {
                name: name.to_string(),
            });
        }
        self.read_dir(&self.snapshot_dir(name)).map_err(|e| match e {
            Error::SnapshotNotFound { .. } => Error::SnapshotNotFound {
                name: name.to_string(),
            },
            other => other,
        })
    }

    /// All readable records, newest first. Unreadable entries are skipped.
    pub fn list(&self) -> Result<Vec<Snapshot>> {
        let rd = match fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(format!("read_dir {}", self.root.display()), e)),
        };

        let mut dirs: Vec<PathBuf> = Vec::new();
        for entry in rd {
            let entry = entry.map_err(|e| Error::io(format!("read_dir {}", self.root.display()), e))?;
            let p = entry.path();
            if p.is_dir() {
                dirs.push(p);
            }
        }
        dirs.sort();

        let mut out = Vec::with_capacity(dirs.len());
        for dir in dirs {
            match self.read_dir(&dir) {
                Ok(s) => out.push(s),
                Err(e) => debug!("store: skip {}: {}", dir.display(), e),
            }
        }
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    /// Remove a snapshot directory tree. Missing is fine.
    pub fn remove(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let dir = self.snapshot_dir(name);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("remove {}", dir.display()), e)),
        }
    }

    /// Drop the record of a snapshot (archives stay), so it is no longer listed.
    pub fn invalidate(&self, name: &str) -> Result<()> {
        let path = metadata_path(&self.snapshot_dir(name));
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("remove {}", path.display()), e)),
        }
    }

    /// Sum of bytes of all files under a snapshot directory.
    pub fn stored_bytes(&self, name: &str) -> u64 {
        dir_bytes(&self.snapshot_dir(name))
    }
}

fn dir_bytes(dir: &Path) -> u64 {
    let rd = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(_) => return 0,
    };
    let mut total = 0u64;
    for entry in rd.flatten() {
        let p = entry.path();
        match entry.metadata() {
            Ok(m) if m.is_dir() => total += dir_bytes(&p),
            Ok(m) => total += m.len(),
            Err(_) => {}
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_unsafe_only() {
        let cases = [
            ("simple", "simple"),
            ("with-dash", "with-dash"),
            ("with_underscore", "with_underscore"),
            ("with/slash", "with_slash"),
            ("project_pgdata", "project_pgdata"),
            ("my.app.volume", "my.app.volume"),
            ("with:colon*star", "with_colon_star"),
            ("a\\b?c\"d<e>f|g", "a_b_c_d_e_f_g"),
        ];
        for (input, want) in cases {
            assert_eq!(sanitize_name(input), want, "sanitize_name({input:?})");
        }
    }

    #[test]
    fn archive_path_uses_sanitized_name() {
        let p = archive_path(Path::new("/snaps/s1"), "proj/db:data");
        assert_eq!(p, PathBuf::from("/snaps/s1/proj_db_data.tar.gz"));
    }

    #[test]
    fn names_that_escape_the_root_are_rejected() {
        assert!(validate_name("before-migration").is_ok());
        assert!(validate_name("_pre-restore-20240101-000000").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
    }
}
