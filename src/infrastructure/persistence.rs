//! Atomic, backup-safe persistence of the harvested record collection
//!
//! The canonical output file is never observed in a partially written state:
//! every save serializes to a temporary file in the same directory and
//! renames it over the destination. A single-generation backup of the
//! previous canonical file is kept, and corrupt state files are quarantined
//! instead of blocking startup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::domain::ProductRecord;

/// Reads and writes record snapshots around the canonical output path.
#[derive(Debug, Clone)]
pub struct PersistenceManager {
    output_path: PathBuf,
    backup_dir: PathBuf,
}

impl PersistenceManager {
    pub fn new(output_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Save `records` to the canonical output path.
    pub fn save_canonical(&self, records: &[ProductRecord]) -> Result<()> {
        self.save(records, &self.output_path)
    }

    /// Atomically save `records` to `path`, sorted by numeric id.
    ///
    /// Saving to the canonical output path first copies the existing file to
    /// the single-generation backup slot. Empty collections are not written
    /// so an aborted first run cannot truncate a previous snapshot.
    pub fn save(&self, records: &[ProductRecord], path: &Path) -> Result<()> {
        if records.is_empty() {
            warn!("No records to save, skipping write to {:?}", path);
            return Ok(());
        }

        if path == self.output_path && path.exists() {
            self.copy_to_backup_slot(path)?;
        }

        let mut sorted: Vec<ProductRecord> = records.to_vec();
        sorted.sort_by_key(ProductRecord::sort_key);

        let payload =
            serde_json::to_string_pretty(&sorted).context("failed to serialize records")?;

        let tmp_path = temp_path_for(path);
        fs::write(&tmp_path, payload)
            .with_context(|| format!("failed to write temporary file {:?}", tmp_path))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to move {:?} into place", path))?;

        info!("Saved {} records to {:?}", sorted.len(), path);
        Ok(())
    }

    /// Load a previously persisted snapshot from `path`.
    ///
    /// A missing file yields an empty collection. A corrupt file is copied
    /// aside to a timestamped quarantine name and also yields an empty
    /// collection, so a damaged state file never blocks startup.
    pub fn load(&self, path: &Path) -> Result<Vec<ProductRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read state file {:?}", path))?;

        match serde_json::from_str::<Vec<ProductRecord>>(&content) {
            Ok(records) => {
                info!("Loaded {} existing records from {:?}", records.len(), path);
                Ok(records)
            }
            Err(parse_error) => {
                let quarantine =
                    path.with_extension(format!("json.corrupt.{}", Utc::now().timestamp()));
                warn!(
                    "State file {:?} is corrupt ({}), quarantining to {:?}",
                    path, parse_error, quarantine
                );
                if let Err(copy_error) = fs::copy(path, &quarantine) {
                    warn!("Failed to quarantine corrupt state file: {}", copy_error);
                }
                Ok(Vec::new())
            }
        }
    }

    /// Load from the canonical output path.
    pub fn load_canonical(&self) -> Result<Vec<ProductRecord>> {
        self.load(&self.output_path)
    }

    /// Write an interrupt snapshot under a timestamped name in the backup
    /// directory, leaving the normal backup slot untouched.
    pub fn timestamped_backup(&self, records: &[ProductRecord]) -> Result<PathBuf> {
        let path = self
            .backup_dir
            .join(format!("products_backup_{}.json", Utc::now().timestamp()));
        self.ensure_backup_dir()?;
        self.save(records, &path)?;
        Ok(path)
    }

    /// Write a failure snapshot under a distinct error name so an aborted run
    /// does not clobber the normal backup slot.
    pub fn error_backup(&self, records: &[ProductRecord]) -> Result<PathBuf> {
        let path = self
            .backup_dir
            .join(format!("products_error_{}.json", Utc::now().timestamp()));
        self.ensure_backup_dir()?;
        self.save(records, &path)?;
        Ok(path)
    }

    fn ensure_backup_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.backup_dir)
            .with_context(|| format!("failed to create backup directory {:?}", self.backup_dir))
    }

    fn copy_to_backup_slot(&self, path: &Path) -> Result<()> {
        self.ensure_backup_dir()?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state.json".to_string());
        let backup_path = self.backup_dir.join(format!("{}.bak", file_name));
        fs::copy(path, &backup_path)
            .with_context(|| format!("failed to back up {:?} to {:?}", path, backup_path))?;
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state.json".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}
