use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use crate::source::SourceTable;

/// Per-user directory holding extracted export archives
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "icarus-consumables")
                    .context("Could not determine cache directory")?;
                proj_dirs.cache_dir().to_path_buf()
            }
        };

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Extraction directory for an archive, named after its file stem
    pub fn archive_dir(&self, archive: &Path) -> PathBuf {
        let stem = archive
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("export");
        self.cache_dir.join(stem)
    }

    /// Check if an archive was already extracted
    pub fn is_cached(&self, archive: &Path) -> bool {
        find_export_root(&self.archive_dir(archive)).is_some()
    }

    /// Remove a previous extraction so it can be redone
    pub fn clear(&self, archive: &Path) -> Result<()> {
        let dir = self.archive_dir(archive);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove cached export: {:?}", dir))?;
        }
        Ok(())
    }
}

/// Locate the export root below `dir`: the directory holding the consumables table
///
/// Archives usually wrap the export in one or two top-level folders.
pub fn find_export_root(dir: &Path) -> Option<PathBuf> {
    let marker = SourceTable::Consumable.relative_path();
    let mut level = vec![dir.to_path_buf()];

    for _ in 0..3 {
        if let Some(root) = level.iter().find(|d| d.join(marker).is_file()) {
            return Some(root.clone());
        }
        level = level
            .iter()
            .filter_map(|d| fs::read_dir(d).ok())
            .flatten()
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        level.sort();
    }

    None
}
