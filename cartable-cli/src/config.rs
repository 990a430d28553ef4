use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_cartable_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSection {
    /// IANA zone used to read dates typed on the command line.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Project collection file, relative to the cartable home unless absolute.
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    /// Tracing filter used when RUST_LOG is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_data_file() -> String {
    "projects.json".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            data_file: default_data_file(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Config {
    pub fn data_path(&self, home: &Path) -> PathBuf {
        let p = PathBuf::from(&self.general.data_file);
        if p.is_absolute() { p } else { home.join(p) }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cartable_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.general.timezone, "UTC");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[general]\ntimezone = \"Europe/Paris\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.general.timezone, "Europe/Paris");
        assert_eq!(cfg.general.data_file, "projects.json");
        assert_eq!(cfg.log.filter, "info");
    }

    #[test]
    fn save_then_load_and_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.log.filter = "cartable_core=debug".to_string();
        save_config_to(&p, &cfg).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);

        assert_eq!(cfg.data_path(dir.path()), dir.path().join("projects.json"));
        cfg.general.data_file = "/srv/cartable/p.json".to_string();
        assert_eq!(cfg.data_path(dir.path()), PathBuf::from("/srv/cartable/p.json"));
    }
}
