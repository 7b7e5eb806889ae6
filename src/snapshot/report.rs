use log::warn;

use crate::error::Result;
use crate::models::{format_size, DatastoreSizeInfo, SizeReport, Volume};

use super::manager::unique_volumes;
use super::SnapshotManager;

impl SnapshotManager<'_> {
    /// Live volume sizes (per volume, per datastore kind) plus catalog totals.
    /// A volume whose size cannot be queried is left out; a volume shared by
    /// several services is measured once.
    pub fn size_report(&self, volumes: &[Volume]) -> Result<SizeReport> {
        let mut report = SizeReport::default();

        for vol in &unique_volumes(volumes) {
            let size = match self.transport.volume_size(vol) {
                Ok(s) => s,
                Err(e) => {
                    warn!("size: {} skipped: {}", vol.name, e);
                    continue;
                }
            };
            report.total_size += size;
            report.by_volume.insert(vol.name.clone(), size);

            let info = report
                .by_datastore
                .entry(vol.datastore.as_str().to_string())
                .or_insert_with(|| DatastoreSizeInfo {
                    kind: vol.datastore,
                    total_size: 0,
                    size_human: String::new(),
                    count: 0,
                });
            info.total_size += size;
            info.count += 1;
        }

        report.total_size_human = format_size(report.total_size);
        for info in report.by_datastore.values_mut() {
            info.size_human = format_size(info.total_size);
        }

        match self.list() {
            Ok(snaps) => {
                report.snapshot_count = snaps.len();
                report.snapshot_size = snaps.iter().map(|s| s.size_bytes).sum();
            }
            Err(e) => warn!("size: snapshot catalog unavailable: {}", e),
        }

        Ok(report)
    }
}
