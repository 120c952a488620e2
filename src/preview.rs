use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::sanitize::sanitize_html;

/// Writes the sanitized document to this process's preview file in the temp
/// dir. Each call replaces the previous preview.
pub fn write_preview(html: &str) -> Result<PathBuf> {
    write_preview_in(&std::env::temp_dir(), html)
}

fn write_preview_in(dir: &Path, html: &str) -> Result<PathBuf> {
    let path = dir.join(format!("pitchpage-preview-{}.html", std::process::id()));

    fs::write(&path, sanitize_html(html))
        .with_context(|| format!("Failed to write preview to {}", path.display()))?;

    debug!(path = %path.display(), "preview written");
    Ok(path)
}

fn opener_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Hands the file to the desktop's default browser.
pub fn open_in_browser(path: &Path) -> Result<()> {
    let mut cmd = opener_command(path);
    let status = cmd
        .status()
        .with_context(|| format!("Failed to launch {:?}", cmd.get_program()))?;

    if !status.success() {
        anyhow::bail!("{:?} exited with {}", cmd.get_program(), status);
    }

    info!(path = %path.display(), "preview opened");
    Ok(())
}
