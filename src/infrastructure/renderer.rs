// src/infrastructure/renderer.rs
use crate::constants::BROWSER_LAUNCH_DELAY_MS;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::Builder;
use tracing::{debug, instrument};

/// Writes rendered note pages to disk and hands them to the browser
#[derive(Debug, Default)]
pub struct PageRenderer {
    // Keep last temp dir alive to prevent deletion
    _temp_dir: Option<tempfile::TempDir>,
}

impl PageRenderer {
    pub fn new() -> Self {
        Self { _temp_dir: None }
    }

    /// Write the page to `output`, or to a fresh temp directory when absent
    pub fn write_page(&mut self, content: &str, output: Option<&Path>) -> Result<PathBuf> {
        let file_path = match output {
            Some(path) => path.to_path_buf(),
            None => {
                let temp_dir = Builder::new()
                    .prefix("notekeeper-")
                    .rand_bytes(5)
                    .tempdir()
                    .context("Failed to create temporary directory")?;
                let path = temp_dir.path().join("notes.html");
                self._temp_dir = Some(temp_dir);
                path
            }
        };

        File::create(&file_path)
            .with_context(|| format!("Failed to create page at {}", file_path.display()))?
            .write_all(content.as_bytes())
            .context("Failed to write page content")?;

        debug!(?file_path, "Wrote notes page");
        Ok(file_path)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn open_in_browser(&self, path: &Path) -> Result<()> {
        let path_str = path.to_str().context("Failed to convert path to string")?;

        #[cfg(target_os = "macos")]
        {
            std::process::Command::new("open")
                .arg(path_str)
                .spawn()
                .context("Failed to open browser")?;
        }
        #[cfg(target_os = "windows")]
        {
            std::process::Command::new("cmd")
                .args(["/C", "start", path_str])
                .spawn()
                .context("Failed to open browser")?;
        }
        #[cfg(target_os = "linux")]
        {
            std::process::Command::new("xdg-open")
                .arg(path_str)
                .spawn()
                .context("Failed to open browser")?;
        }

        // Keep the temp directory alive until the browser picked the file up
        wait_for_browser(Duration::from_millis(BROWSER_LAUNCH_DELAY_MS)).await;

        Ok(())
    }
}

async fn wait_for_browser(delay: Duration) {
    tokio::time::sleep(delay).await;
}
