use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::env::VarMap;

/// Reads a dotenv file and merges its entries into `vars`, later keys winning.
pub fn load_env_file(path: &Path, vars: &mut VarMap) -> Result<PathBuf> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading env file {}", path.display()))?;

    for entry in dotenvy::from_read_iter(Cursor::new(content)) {
        let (key, value) = entry.with_context(|| format!("parsing env file {}", path.display()))?;
        vars.insert(key, value);
    }

    Ok(path.to_path_buf())
}
