use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::config::DirectoryConfig;

/// Where the client keeps its logs, its local storage and the offline
/// cache snapshot.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    pub storage_path: PathBuf,
    pub cache_path: PathBuf,
}

pub fn ensure_directories(cfg: &DirectoryConfig) -> Result<ResolvedPaths> {
    let logs_dir = create_dir(Path::new(&cfg.logs_dir))?;
    let data_dir = create_dir(Path::new(&cfg.data_dir))?;
    check_writable(&data_dir)?;

    Ok(ResolvedPaths {
        logs_dir,
        storage_path: data_dir.join(&cfg.storage_filename),
        cache_path: data_dir.join(&cfg.cache_filename),
    })
}

/// Storage and cache files are replaced through temp files created next to
/// them, so the data directory must accept new files.
fn check_writable(dir: &Path) -> Result<()> {
    NamedTempFile::new_in(dir)
        .map(drop)
        .with_context(|| format!("data directory {} is not writable", dir.display()))
}

fn create_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory {}", path.display()))?;
    Ok(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
}
