// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV reading with encoding detection, augmented-table writing

mod csv_reader;
mod csv_writer;

pub use csv_reader::CsvReader;
pub use csv_writer::{resolve_output_path, CsvWriter, OUTPUT_BASENAME};
