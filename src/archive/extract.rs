use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

use crate::ui::Ui;

/// Extract the `.json` tables of an export archive, keeping their relative paths
///
/// Entries that would land outside `dest_dir` are skipped.
pub fn extract_zip(zip_path: &Path, dest_dir: &Path, ui: &mut impl Ui) -> Result<u64> {
    let file = File::open(zip_path).context("Failed to open zip file")?;
    let reader = BufReader::new(file);
    let mut archive = ZipArchive::new(reader).context("Failed to read zip archive")?;

    fs::create_dir_all(dest_dir).context("Failed to create destination directory")?;

    let total_files = archive.len() as u64;
    let mut extracted = 0;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .context("Failed to read file from archive")?;
        ui.set_progress(i as u64 + 1, total_files, "Extracting");

        let Some(relative) = file.enclosed_name() else {
            debug!(entry = file.name(), "skipping unsafe archive path");
            continue;
        };
        if file.is_dir() || relative.extension().map_or(true, |ext| ext != "json") {
            continue;
        }

        let dest_path = dest_dir.join(&relative);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let mut dest_file = File::create(&dest_path)
            .with_context(|| format!("Failed to create file: {:?}", dest_path))?;

        io::copy(&mut file, &mut dest_file)
            .with_context(|| format!("Failed to extract: {:?}", relative))?;
        extracted += 1;
    }

    ui.clear_progress();
    ui.log(format!("Extracted {} tables", extracted));
    Ok(extracted)
}
