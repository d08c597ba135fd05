use anyhow::{Context, Result};
use notekeeper::application::NoteWorkflow;
use notekeeper::config::Config;
use notekeeper::infrastructure::{DirectoryBlobStore, JsonRecordStore};
use std::path::PathBuf;
use tempfile::TempDir;

/// Smallest valid PNG, used as attachment payload
#[allow(dead_code)]
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Test fixture for working with a temporary data directory
#[allow(dead_code)]
pub struct TestDataDir {
    _temp_dir: TempDir,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
}

#[allow(dead_code)]
impl TestDataDir {
    /// Create an empty data directory with a default config file next to it
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let data_dir = temp_dir.path().join("data");
        let config_path = temp_dir.path().join("config.toml");
        let config = Config::create_default(&config_path)?;

        Ok(Self {
            _temp_dir: temp_dir,
            data_dir,
            config_path,
            config,
        })
    }

    pub fn records_path(&self) -> PathBuf {
        self.config.records_path(&self.data_dir)
    }

    pub fn blob_path(&self) -> PathBuf {
        self.config.blob_path(&self.data_dir)
    }

    /// Workflow over the local stores of this directory
    pub fn open_workflow(&self) -> NoteWorkflow<JsonRecordStore, DirectoryBlobStore> {
        NoteWorkflow::new(
            JsonRecordStore::new(self.records_path()),
            DirectoryBlobStore::new(self.blob_path()),
        )
    }

    /// Write an image file outside the blob directory, as a user would pick it
    pub fn image_file(&self, name: &str) -> Result<PathBuf> {
        let path = self._temp_dir.path().join(name);
        std::fs::write(&path, PNG_BYTES).context("Failed to write image fixture")?;
        Ok(path)
    }
}
