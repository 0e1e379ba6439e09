// ============================================================
// CSV WRITER
// ============================================================
// Persist the augmented table without clobbering earlier results

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::error::{AppError, Result};
use crate::domain::table::AddressTable;

pub const OUTPUT_BASENAME: &str = "geocoded_results";

/// Spreadsheet tools need the BOM to pick UTF-8 over the locale encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output path inside `dir`: the default basename, or a
/// timestamp-suffixed name when the default already exists.
pub fn resolve_output_path(dir: &Path) -> PathBuf {
    let default = dir.join(format!("{}.csv", OUTPUT_BASENAME));
    if !default.exists() {
        return default;
    }
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.csv", OUTPUT_BASENAME, stamp))
}

/// Writes the augmented table as UTF-8 CSV with a byte-order mark.
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the full table into `dir` and return the path actually used.
    pub fn write(&self, table: &AddressTable, dir: &Path) -> Result<PathBuf> {
        let path = resolve_output_path(dir);

        let mut file = File::create(&path).map_err(|e| {
            AppError::IoError(format!("failed to create {}: {}", path.display(), e))
        })?;
        file.write_all(UTF8_BOM)
            .map_err(|e| AppError::IoError(format!("failed to write {}: {}", path.display(), e)))?;

        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(table.output_headers())
            .map_err(|e| AppError::IoError(format!("failed to write CSV headers: {}", e)))?;

        for row in table.rows() {
            let mut record = row.values.clone();
            match row.coordinate {
                Some(coordinate) => {
                    record.push(coordinate.latitude.to_string());
                    record.push(coordinate.longitude.to_string());
                }
                None => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
            writer
                .write_record(&record)
                .map_err(|e| AppError::IoError(format!("failed to write CSV row: {}", e)))?;
        }

        writer
            .flush()
            .map_err(|e| AppError::IoError(format!("failed to flush {}: {}", path.display(), e)))?;
        Ok(path)
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
