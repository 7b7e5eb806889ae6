//! Archive transport: the capability that moves volume contents to/from archive
//! files, wipes volumes, measures them and stops/starts their containers.
//!
//! - docker.rs: DockerTransport (docker CLI + helper container, gzip on the host).
//!
//! Transport failures are typed errors. Container pause/resume is best-effort and
//! reports a `Step` instead: a container that is not running is not an error.

mod docker;

use std::fmt;
use std::path::Path;

use log::warn;

use crate::error::{Error, Result};
use crate::models::Volume;

pub use docker::DockerTransport;

pub trait ArchiveTransport {
    /// Write the volume's contents into the archive at `dest`.
    fn export_volume(&self, volume: &Volume, dest: &Path) -> Result<()>;

    /// Clear the volume, then unpack the archive at `src` into it.
    fn import_volume(&self, src: &Path, volume: &Volume) -> Result<()>;

    /// Remove everything inside the volume.
    fn clear_volume(&self, volume: &Volume) -> Result<()>;

    /// Current on-disk size of the volume in bytes.
    fn volume_size(&self, volume: &Volume) -> Result<u64>;

    /// Stop the containers owning these volumes. Never fails the caller.
    fn pause_containers(&self, volumes: &[Volume]) -> Step<()>;

    /// Start the containers owning these volumes. Never fails the caller.
    fn resume_containers(&self, volumes: &[Volume]) -> Step<()>;
}

/// Outcome of a step whose failure may or may not be tolerated.
#[derive(Debug)]
pub enum Step<T> {
    Succeeded(T),
    /// Failed, but the operation carried on.
    Ignored(String),
    /// Failed and aborted the operation.
    Fatal(Error),
}

impl<T> Step<T> {
    /// Downgrade an error to `Ignored`, logging it.
    pub fn best_effort(res: Result<T>, what: &str) -> Self {
        match res {
            Ok(v) => Step::Succeeded(v),
            Err(e) => {
                warn!("{what}: ignored failure: {e}");
                Step::Ignored(e.to_string())
            }
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Step::Succeeded(_))
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Step::Ignored(_))
    }

    pub fn succeeded(&self) -> Option<&T> {
        match self {
            Step::Succeeded(v) => Some(v),
            _ => None,
        }
    }

}

impl<T> fmt::Display for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Succeeded(_) => f.write_str("ok"),
            Step::Ignored(reason) => write!(f, "ignored ({reason})"),
            Step::Fatal(e) => write!(f, "fatal ({e})"),
        }
    }
}

/// Transport for catalog-only commands (list/show/tag/delete): every data
/// operation fails with `TransportUnavailable`, pause/resume are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl OfflineTransport {
    fn unavailable<T>(&self, what: &str) -> Result<T> {
        Err(Error::TransportUnavailable(format!("{what}: no container runtime attached")))
    }
}

impl ArchiveTransport for OfflineTransport {
    fn export_volume(&self, volume: &Volume, _dest: &Path) -> Result<()> {
        self.unavailable(&format!("export {}", volume.name))
    }

    fn import_volume(&self, _src: &Path, volume: &Volume) -> Result<()> {
        self.unavailable(&format!("import {}", volume.name))
    }

    fn clear_volume(&self, volume: &Volume) -> Result<()> {
        self.unavailable(&format!("clear {}", volume.name))
    }

    fn volume_size(&self, volume: &Volume) -> Result<u64> {
        self.unavailable(&format!("size {}", volume.name))
    }

    fn pause_containers(&self, _volumes: &[Volume]) -> Step<()> {
        Step::Ignored("offline".to_string())
    }

    fn resume_containers(&self, _volumes: &[Volume]) -> Step<()> {
        Step::Ignored("offline".to_string())
    }
}

/// Distinct owning container names, first-seen order.
pub fn container_names(volumes: &[Volume]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for v in volumes {
        if let Some(c) = v.container_name.as_deref() {
            if !c.is_empty() && !out.contains(&c) {
                out.push(c);
            }
        }
    }
    out
}
