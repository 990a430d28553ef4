//! File-backed project collection: the whole portfolio as one JSON document.

use anyhow::{Context, Result};
use cartable_core::Portfolio;
use std::path::Path;
use tokio::fs;

/// Missing file means an empty portfolio; any other stat failure is an error.
pub async fn load(path: &Path) -> Result<Portfolio> {
    let exists = fs::try_exists(path)
        .await
        .with_context(|| format!("stat {}", path.display()))?;
    if !exists {
        tracing::debug!(path = %path.display(), "no data file yet, starting empty");
        return Ok(Portfolio::new());
    }
    let s = fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let portfolio: Portfolio =
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), projects = portfolio.len(), "loaded");
    Ok(portfolio)
}

/// Write through a sibling temp file and rename it over the target.
pub async fn save(path: &Path, portfolio: &Portfolio) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(portfolio).context("serialize projects")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .await
        .with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    tracing::debug!(path = %path.display(), projects = portfolio.len(), "saved");
    Ok(())
}
