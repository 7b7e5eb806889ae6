//! Record updates: tags, description, free-form metadata.
//! Each call rewrites the whole record; archives are never touched.

use std::collections::BTreeMap;

use log::info;

use crate::error::Result;
use crate::models::Snapshot;

use super::SnapshotManager;

impl SnapshotManager<'_> {
    /// Add a tag; no-op if already present.
    pub fn add_tag(&self, name: &str, tag: &str) -> Result<Snapshot> {
        let mut snap = self.store.read(name)?;
        if snap.has_tag(tag) {
            return Ok(snap);
        }
        snap.tags.push(tag.to_string());
        self.store.write(&snap)?;
        info!("tag: '{}' +{}", name, tag);
        Ok(snap)
    }

    pub fn remove_tag(&self, name: &str, tag: &str) -> Result<Snapshot> {
        let mut snap = self.store.read(name)?;
        let before = snap.tags.len();
        snap.tags.retain(|t| t != tag);
        if snap.tags.len() != before {
            self.store.write(&snap)?;
            info!("tag: '{}' -{}", name, tag);
        }
        Ok(snap)
    }

    /// Empty text clears the description.
    pub fn update_description(&self, name: &str, description: &str) -> Result<Snapshot> {
        let mut snap = self.store.read(name)?;
        snap.description = if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        };
        self.store.write(&snap)?;
        Ok(snap)
    }

    /// Merge keys: new values win, other keys stay.
    pub fn update_metadata(&self, name: &str, metadata: &BTreeMap<String, String>) -> Result<Snapshot> {
        let mut snap = self.store.read(name)?;
        for (k, v) in metadata {
            snap.metadata.insert(k.clone(), v.clone());
        }
        self.store.write(&snap)?;
        Ok(snap)
    }
}
