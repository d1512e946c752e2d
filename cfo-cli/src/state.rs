use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn cfo_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".mini-cfo"))
}

pub fn ensure_cfo_home() -> Result<PathBuf> {
    let dir = cfo_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Default location of the JSON stores. Not created here; the store creates
/// it on first write.
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(cfo_home()?.join("data"))
}

/// Expand a leading `~/` against `$HOME`
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = std::env::var("HOME").context("HOME is not set")?;
            Ok(PathBuf::from(home).join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}
