//! Enriched catalog writer.
//!
//! Every call to [`CatalogWriter::persist`] rewrites the whole file from the
//! in-memory accumulator, so the file on disk always holds a header plus one
//! row per product processed so far.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use seoforge_shared::{OutputRow, Result, SeoforgeError};

/// Output catalog header.
pub const OUTPUT_HEADER: [&str; 7] = [
    "SKU",
    "Name",
    "Published",
    "Description",
    "Short description",
    "Price",
    "Image",
];

/// Separator between image URLs in the `Image` column.
const IMAGE_SEPARATOR: &str = ", ";

/// Writes the accumulated output rows to a fixed destination.
#[derive(Debug, Clone)]
pub struct CatalogWriter {
    path: PathBuf,
}

impl CatalogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the destination with the header and every row in `rows`.
    ///
    /// The catalog is written to a sibling temp file, synced, and renamed into
    /// place. On failure the destination keeps its previous contents and the
    /// temp file is removed.
    #[instrument(skip_all, fields(path = %self.path.display(), rows = rows.len()))]
    pub fn persist(&self, rows: &[OutputRow]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SeoforgeError::io(parent, e))?;
        }

        let temp = self.temp_path();
        let result = write_temp(&temp, rows).and_then(|()| {
            // Atomic rename
            std::fs::rename(&temp, &self.path).map_err(|e| SeoforgeError::io(&self.path, e))
        });

        if let Err(e) = result {
            discard_temp(&temp);
            return Err(e);
        }

        debug!("catalog persisted");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.csv".into());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

fn write_temp(temp: &Path, rows: &[OutputRow]) -> Result<()> {
    let mut file = std::fs::File::create(temp).map_err(|e| SeoforgeError::io(temp, e))?;
    write_rows(rows, &mut file)?;
    file.sync_all().map_err(|e| SeoforgeError::io(temp, e))
}

fn discard_temp(temp: &Path) {
    match std::fs::remove_file(temp) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(temp = %temp.display(), error = %e, "failed to remove temp catalog"),
    }
}

/// Write the header and `rows` as CSV to `out`.
///
/// Rows without a description get the description placeholders.
pub fn write_rows<W: Write>(rows: &[OutputRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(OUTPUT_HEADER)?;

    for row in rows {
        let short_description = row.short_description();
        let images = row.images.join(IMAGE_SEPARATOR);
        writer.write_record([
            row.sku.as_str(),
            row.name.as_str(),
            if row.published { "1" } else { "0" },
            row.description_text(),
            short_description.as_str(),
            row.price.as_str(),
            images.as_str(),
        ])?;
    }

    writer
        .flush()
        .map_err(|e| SeoforgeError::Catalog(format!("flush failed: {e}")))?;
    Ok(())
}
