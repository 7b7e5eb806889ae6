mod common;

use std::fs;

use anyhow::Result;

use common::{pg, redis, test_config, unique_root, MockTransport};
use dataclean::{CreateOptions, Error, RunOptions, SnapshotManager, Step};

#[test]
fn restore_with_backup_first() -> Result<()> {
    let root = unique_root("restore");
    let cfg = test_config(&root).with_backup_before_restore(true);
    let t = MockTransport::new();
    let mgr = SnapshotManager::new(cfg, &t);

    mgr.create("base", &[pg(), redis()], CreateOptions::default(), RunOptions::default())?;
    t.calls.lock().map(|mut c| c.clear()).ok();

    let report = mgr.restore("base", RunOptions::default())?;
    let backup = match &report.backup {
        Some(Step::Succeeded(name)) => name.clone(),
        other => panic!("expected a backup, got {:?}", other),
    };
    assert!(backup.starts_with("_pre-restore-"), "{backup}");
    assert!(mgr.get(&backup)?.is_auto_backup());
    assert!(report.pause.as_ref().map_or(false, |s| s.is_succeeded()));
    assert!(report.resume.as_ref().map_or(false, |s| s.is_succeeded()));

    // backup (pause/export/resume) strictly before the imports
    assert_eq!(
        t.calls(),
        vec![
            "pause",
            "export proj_pgdata",
            "export proj_redis_data",
            "resume",
            "pause",
            "import proj_pgdata",
            "import proj_redis_data",
            "resume",
        ]
    );

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn restore_without_backup_and_missing_snapshot() -> Result<()> {
    let root = unique_root("restore-nobackup");
    let t = MockTransport::new();
    let mgr = SnapshotManager::new(test_config(&root), &t);

    mgr.create("base", &[pg()], CreateOptions::default(), RunOptions::default())?;
    let report = mgr.restore("base", RunOptions::default())?;
    assert!(report.backup.is_none());
    assert_eq!(t.count("import"), 1);
    assert_eq!(mgr.list()?.len(), 1);

    let before = t.calls().len();
    assert!(matches!(
        mgr.restore("missing", RunOptions::default()),
        Err(Error::SnapshotNotFound { .. })
    ));
    assert_eq!(t.calls().len(), before, "nothing paused for a missing snapshot");

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn failed_backup_does_not_block_restore() -> Result<()> {
    let root = unique_root("restore-badbackup");
    let cfg = test_config(&root).with_backup_before_restore(true);

    let good = MockTransport::new();
    SnapshotManager::new(cfg.clone(), &good)
        .create("base", &[pg(), redis()], CreateOptions::default(), RunOptions::default())?;

    // exports fail now, imports still work
    let t = MockTransport::new().failing_export("proj_pgdata");
    let mgr = SnapshotManager::new(cfg, &t);
    let report = mgr.restore("base", RunOptions::default())?;

    assert!(report.backup.as_ref().map_or(false, |s| s.is_ignored()));
    assert_eq!(t.count("import"), 2);
    let names: Vec<String> = mgr.list()?.into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["base"]);

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn import_failure_aborts_and_resumes() -> Result<()> {
    let root = unique_root("restore-importfail");
    let cfg = test_config(&root);
    let good = MockTransport::new();
    SnapshotManager::new(cfg.clone(), &good)
        .create("base", &[pg(), redis()], CreateOptions::default(), RunOptions::default())?;

    let t = MockTransport::new().failing_import("proj_pgdata");
    let mgr = SnapshotManager::new(cfg, &t);
    let r = mgr.restore("base", RunOptions::default());
    assert!(matches!(r, Err(Error::Import { .. })));

    // first volume failed: the second one is never touched
    assert_eq!(t.calls(), vec!["pause", "import proj_pgdata", "resume"]);

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn pause_and_resume_failures_are_tolerated() -> Result<()> {
    let root = unique_root("restore-pause");
    let cfg = test_config(&root);
    let t = MockTransport {
        pause_fails: true,
        resume_fails: true,
        ..MockTransport::default()
    };
    let mgr = SnapshotManager::new(cfg, &t);

    mgr.create("base", &[pg()], CreateOptions::default(), RunOptions::default())?;
    let report = mgr.restore("base", RunOptions::default())?;
    assert!(report.pause.as_ref().map_or(false, |s| s.is_ignored()));
    assert!(report.resume.as_ref().map_or(false, |s| s.is_ignored()));

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn reset_clears_after_backup() -> Result<()> {
    let root = unique_root("reset");
    let cfg = test_config(&root).with_backup_before_restore(true);
    let t = MockTransport::new();
    let mgr = SnapshotManager::new(cfg, &t);

    let report = mgr.reset(&[pg(), redis(), pg()], RunOptions::default())?;
    assert_eq!(report.volumes, vec!["proj_pgdata", "proj_redis_data"]);
    let backup = report.backup.as_ref().and_then(|s| s.succeeded()).cloned();
    assert!(backup.map_or(false, |b| b.starts_with("_pre-reset-")));
    assert_eq!(t.count("clear"), 2);
    assert_eq!(t.count("export"), 2);

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn reset_stops_at_first_clear_failure() -> Result<()> {
    let root = unique_root("reset-fail");
    let t = MockTransport::new().failing_clear("proj_pgdata");
    let mgr = SnapshotManager::new(test_config(&root), &t);

    let r = mgr.reset(&[pg(), redis()], RunOptions::default());
    assert!(matches!(r, Err(Error::Clear { .. })));
    assert_eq!(t.calls(), vec!["pause", "clear proj_pgdata", "resume"]);

    let _ = fs::remove_dir_all(&root);
    Ok(())
}
