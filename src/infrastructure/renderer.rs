// src/infrastructure/renderer.rs
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{Builder, TempDir};
use tracing::{debug, instrument};

use crate::constants::BROWSER_LAUNCH_DELAY_MS;

/// Writes rendered pages to a temp directory and opens them in the default browser
#[derive(Debug, Default)]
pub struct BrowserPreview {
    // Dropping the TempDir deletes the page; keep it for the preview's lifetime
    temp_dir: Option<TempDir>,
}

impl BrowserPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_page(&mut self, html: &str) -> Result<PathBuf> {
        let temp_dir = Builder::new()
            .prefix("personal-notes-")
            .rand_bytes(5)
            .tempdir()
            .context("Failed to create temporary directory")?;

        let file_path = temp_dir.path().join("notes.html");

        File::create(&file_path)
            .with_context(|| format!("Failed to create temp file at {}", file_path.display()))?
            .write_all(html.as_bytes())
            .context("Failed to write page to temporary file")?;

        debug!(path = %file_path.display(), "Wrote preview page");
        self.temp_dir = Some(temp_dir);
        Ok(file_path)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn open(&self, path: &Path) -> Result<()> {
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

        tokio::time::sleep(Duration::from_millis(BROWSER_LAUNCH_DELAY_MS)).await;
        Ok(())
    }
}
