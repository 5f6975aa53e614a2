use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "screenplay.json";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileConfig {
    pub env: Option<String>,
    pub variables: HashMap<String, String>,
    pub base_urls: HashMap<String, String>,
    pub dump_dir: Option<String>,
    pub download_dir: Option<String>,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub default_headers: HashMap<String, String>,
}

/// Root of `screenplay.json`. Root-level values apply to every profile and
/// are overridden by the selected profile's own values.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenplayConfig {
    pub profiles: HashMap<String, ProfileConfig>,
    pub default_profile: Option<String>,
    pub env: Option<String>,
    pub variables: HashMap<String, String>,
    pub base_urls: HashMap<String, String>,
    pub dump_dir: Option<String>,
    pub download_dir: Option<String>,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub default_headers: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ScreenplayConfig,
    pub path: PathBuf,
    pub dir: PathBuf,
}

/// Loads `target`, or `target/screenplay.json` when `target` is a directory.
/// A missing file is not an error.
pub fn load_config(target: &Path) -> Result<Option<LoadedConfig>> {
    let resolved = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()
            .context("resolving current directory")?
            .join(target)
    };

    let (path, dir) = if resolved.is_dir() {
        (resolved.join(CONFIG_FILE_NAME), resolved)
    } else {
        let dir = resolved
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| resolved.clone());
        (resolved, dir)
    };

    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: ScreenplayConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config {}", path.display()))?;

    Ok(Some(LoadedConfig { config, path, dir }))
}
