use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$CARTABLE_HOME`, or `~/.cartable`.
pub fn cartable_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CARTABLE_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cartable"))
}

pub fn ensure_cartable_home() -> Result<PathBuf> {
    let dir = cartable_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
