mod common;

use std::fs;
use std::sync::{Mutex, OnceLock};

use anyhow::Result;

use common::unique_root;
use dataclean::consts::{ENV_BACKUP_BEFORE_RESTORE, ENV_RETENTION_DAYS, ENV_SNAPSHOT_DIR};
use dataclean::{Config, DatastoreKind, Error};

static TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn clear_env() {
    for k in [ENV_BACKUP_BEFORE_RESTORE, ENV_RETENTION_DAYS, ENV_SNAPSHOT_DIR] {
        std::env::remove_var(k);
    }
}

#[test]
fn file_then_env_then_anchor() -> Result<()> {
    let _g = TEST_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
    clear_env();

    let root = unique_root("cfg");
    fs::create_dir_all(&root)?;
    fs::write(
        root.join(".dataclean.yml"),
        "snapshot_dir: backups\nretention_days: 30\ndefault_tags: [dev]\ndatastore_hints:\n  blob: neo4j\n",
    )?;

    let cfg = Config::load(None, &root)?;
    assert_eq!(cfg.snapshot_dir, root.join("backups"));
    assert_eq!(cfg.retention_days, 30);
    assert_eq!(cfg.default_tags, vec!["dev"]);
    assert_eq!(cfg.hint_for("blob"), Some(DatastoreKind::Neo4j));
    assert!(cfg.backup_before_restore);

    std::env::set_var(ENV_RETENTION_DAYS, "3");
    std::env::set_var(ENV_BACKUP_BEFORE_RESTORE, "off");
    let cfg = Config::load(None, &root)?;
    assert_eq!(cfg.retention_days, 3);
    assert!(!cfg.backup_before_restore);

    std::env::set_var(ENV_BACKUP_BEFORE_RESTORE, "YES");
    std::env::set_var(ENV_RETENTION_DAYS, "not-a-number");
    let cfg = Config::load(None, &root)?;
    assert!(cfg.backup_before_restore);
    assert_eq!(cfg.retention_days, 30);

    clear_env();
    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn defaults_save_and_bad_documents() -> Result<()> {
    let _g = TEST_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
    clear_env();

    let root = unique_root("cfg-save");
    fs::create_dir_all(&root)?;

    let cfg = Config::load(None, &root)?;
    assert_eq!(cfg.snapshot_dir, root.join(".dataclean"));

    let written = Config::default()
        .with_exclude(vec!["cache".into()])
        .with_hint("blob", DatastoreKind::MongoDb)
        .with_retention_days(14);
    let path = root.join("custom.yaml");
    written.save(&path)?;
    assert_eq!(Config::from_file(&path)?, written);

    let explicit = Config::load(Some(&path), &root)?;
    assert_eq!(explicit.retention_days, 14);
    assert_eq!(explicit.exclude_volumes, vec!["cache"]);

    fs::write(root.join(".dataclean.yaml"), "retention_days: [1, 2")?;
    assert!(matches!(Config::load(None, &root), Err(Error::ConfigParse { .. })));

    let _ = fs::remove_dir_all(&root);
    Ok(())
}
