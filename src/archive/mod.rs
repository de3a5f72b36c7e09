//! Export archives: `.zip` inputs are unpacked once into a cache directory

pub mod cache;
pub mod extract;

pub use cache::*;
pub use extract::*;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ui::{Phase, Ui};

/// Resolve `data` to an export directory, extracting it first if it is an archive
pub fn ensure_export_dir(
    data: &Path,
    cache_dir: Option<PathBuf>,
    force: bool,
    ui: &mut impl Ui,
) -> Result<PathBuf> {
    if data.is_dir() {
        return Ok(find_export_root(data).unwrap_or_else(|| data.to_path_buf()));
    }
    if !data.is_file() {
        bail!("Data path does not exist: {:?}", data);
    }
    if data.extension().map_or(true, |ext| ext != "zip") {
        bail!("Expected an export directory or a .zip archive: {:?}", data);
    }

    let cache = CacheManager::new(cache_dir)?;
    let dest = cache.archive_dir(data);

    if force {
        cache.clear(data)?;
    }
    if cache.is_cached(data) {
        info!(dir = ?dest, "using cached export");
        ui.log(format!("Using cached export in {:?}", dest));
    } else {
        ui.set_phase(Phase::Extracting);
        extract_zip(data, &dest, ui)?;
    }

    find_export_root(&dest).with_context(|| {
        format!(
            "Archive {:?} does not contain {}",
            data,
            crate::source::SourceTable::Consumable.relative_path()
        )
    })
}
