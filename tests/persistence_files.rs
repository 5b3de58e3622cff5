//! Filesystem behavior of the persistence layer: atomicity, deterministic
//! ordering, quarantine of corrupt state and the single-generation backup.

use std::fs;

use inventory_harvester::domain::ProductRecord;
use inventory_harvester::infrastructure::PersistenceManager;

fn record(id: &str, name: &str) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        name: name.to_string(),
        category: "Electronics".to_string(),
        inventory: "87".to_string(),
        cost: "$19.99".to_string(),
        modified: "2024-01-03".to_string(),
        updated: "3 days ago".to_string(),
    }
}

#[test]
fn save_then_load_then_save_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products_data.json");
    let manager = PersistenceManager::new(&output, dir.path().join("backups"));

    let records = vec![record("30", "B"), record("4", "A"), record("1024", "C")];
    manager.save(&records, &output).unwrap();
    let first = fs::read(&output).unwrap();

    let loaded = manager.load(&output).unwrap();
    let second_path = dir.path().join("again.json");
    manager.save(&loaded, &second_path).unwrap();
    let second = fs::read(&second_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn records_are_persisted_sorted_by_numeric_id() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products_data.json");
    let manager = PersistenceManager::new(&output, dir.path().join("backups"));

    manager
        .save(&[record("30", "B"), record("4", "A")], &output)
        .unwrap();

    let loaded = manager.load(&output).unwrap();
    let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["4", "30"]);
}

#[test]
fn missing_state_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products_data.json");
    let manager = PersistenceManager::new(&output, dir.path().join("backups"));

    assert!(manager.load(&output).unwrap().is_empty());
}

#[test]
fn corrupt_state_file_is_quarantined_and_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products_data.json");
    fs::write(&output, "[{not valid json").unwrap();

    let manager = PersistenceManager::new(&output, dir.path().join("backups"));
    assert!(manager.load(&output).unwrap().is_empty());

    // The damaged file was copied aside under a timestamped quarantine name.
    let quarantined = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| {
            e.file_name()
                .to_string_lossy()
                .contains("json.corrupt.")
        });
    assert!(quarantined, "expected a quarantine copy of the corrupt file");
    // The original is left in place for the next save to overwrite.
    assert!(output.exists());
}

#[test]
fn failed_write_leaves_previous_contents_intact() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products_data.json");
    let manager = PersistenceManager::new(&output, dir.path().join("backups"));

    manager.save(&[record("1", "Original")], &output).unwrap();
    let before = fs::read(&output).unwrap();

    // Occupy the temporary path with a directory so the write phase fails
    // before the final rename.
    fs::create_dir(dir.path().join("products_data.json.tmp")).unwrap();
    let result = manager.save(&[record("2", "Replacement")], &output);

    assert!(result.is_err());
    assert_eq!(fs::read(&output).unwrap(), before);
}

#[test]
fn canonical_save_keeps_single_generation_backup() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products_data.json");
    let backup_dir = dir.path().join("backups");
    let manager = PersistenceManager::new(&output, &backup_dir);

    manager.save_canonical(&[record("1", "First")]).unwrap();
    manager
        .save_canonical(&[record("1", "First"), record("2", "Second")])
        .unwrap();

    let backup = backup_dir.join("products_data.json.bak");
    assert!(backup.exists());
    let backed_up: Vec<ProductRecord> =
        serde_json::from_str(&fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(backed_up.len(), 1, "backup holds the previous generation");
}

#[test]
fn empty_collection_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products_data.json");
    let manager = PersistenceManager::new(&output, dir.path().join("backups"));

    manager.save(&[], &output).unwrap();
    assert!(!output.exists());
}

#[test]
fn backup_snapshots_use_distinct_names() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products_data.json");
    let manager = PersistenceManager::new(&output, dir.path().join("backups"));

    let records = vec![record("1", "A")];
    let interrupt = manager.timestamped_backup(&records).unwrap();
    let error = manager.error_backup(&records).unwrap();

    assert!(interrupt
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("products_backup_"));
    assert!(error
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("products_error_"));
    assert!(interrupt.exists());
    assert!(error.exists());
}
