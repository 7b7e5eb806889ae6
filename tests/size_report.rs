mod common;

use std::fs;

use anyhow::Result;

use common::{pg, redis, test_config, unique_root, MockTransport};
use dataclean::{CreateOptions, DatastoreKind, RunOptions, SnapshotManager, Volume};

#[test]
fn size_report_skips_unmeasurable_volumes() -> Result<()> {
    let root = unique_root("size");
    let t = MockTransport::new()
        .with_size("proj_pgdata", 2048)
        .with_size("proj_redis_data", 1024)
        .with_size("proj_pg2", 1024);
    let mgr = SnapshotManager::new(test_config(&root), &t);

    mgr.create("one", &[pg()], CreateOptions::default(), RunOptions::default())?;
    let stored = mgr.get("one")?.size_bytes;

    let pg2 = Volume::new("proj_pg2", DatastoreKind::Postgres);
    let ghost = Volume::new("proj_ghost", DatastoreKind::MySql);
    let report = mgr.size_report(&[pg(), redis(), pg2, ghost])?;

    assert_eq!(report.total_size, 4096);
    assert_eq!(report.total_size_human, "4.0 KB");
    assert_eq!(report.by_volume.len(), 3);
    assert!(!report.by_volume.contains_key("proj_ghost"));

    let pgs = report.by_datastore.get("postgres").map(|i| (i.count, i.total_size));
    assert_eq!(pgs, Some((2, 3072)));
    assert!(!report.by_datastore.contains_key("mysql"));

    assert_eq!(report.snapshot_count, 1);
    assert_eq!(report.snapshot_size, stored);

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn shared_volume_is_measured_once() -> Result<()> {
    let root = unique_root("size-shared");
    let t = MockTransport::new().with_size("p_shared", 1000);
    let mgr = SnapshotManager::new(test_config(&root), &t);

    let db = Volume::new("p_shared", DatastoreKind::Postgres).with_container("app-db");
    let worker = Volume::new("p_shared", DatastoreKind::Generic).with_container("app-worker");
    let report = mgr.size_report(&[db, worker])?;

    assert_eq!(t.count("size"), 1);
    assert_eq!(report.total_size, 1000);
    assert_eq!(report.total_size, report.by_volume.values().sum::<u64>());
    let pgs = report.by_datastore.get("postgres").map(|i| (i.count, i.total_size));
    assert_eq!(pgs, Some((1, 1000)));
    assert!(!report.by_datastore.contains_key("generic"));

    let _ = fs::remove_dir_all(&root);
    Ok(())
}
