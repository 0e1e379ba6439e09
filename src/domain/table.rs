// ============================================================
// ADDRESS TABLE
// ============================================================
// In-memory model of the spreadsheet being geocoded

use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::geocode::Coordinate;

/// Name of the input column holding the address to geocode.
pub const ADDRESS_COLUMN: &str = "address";

/// One input record. Cell values pass through untouched; the coordinate
/// starts out absent and is set only when the address resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub values: Vec<String>,
    pub coordinate: Option<Coordinate>,
}

/// Ordered rows sharing a fixed header schema. Rows are only ever
/// annotated with a coordinate; none are added, removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressTable {
    headers: Vec<String>,
    address_idx: usize,
    rows: Vec<TableRow>,
}

impl AddressTable {
    /// Build a table from a header row and raw records. Fails when the
    /// `address` column is missing.
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        let address_idx = headers
            .iter()
            .position(|h| h.trim() == ADDRESS_COLUMN)
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "input table has no '{}' column",
                    ADDRESS_COLUMN
                ))
            })?;

        let rows = records
            .into_iter()
            .map(|values| TableRow {
                values,
                coordinate: None,
            })
            .collect();

        Ok(Self {
            headers,
            address_idx,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Address cell of the given row. Rows shorter than the header schema
    /// yield an empty string.
    pub fn address(&self, index: usize) -> &str {
        self.rows
            .get(index)
            .and_then(|row| row.values.get(self.address_idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_coordinate(&mut self, index: usize, coordinate: Coordinate) {
        if let Some(row) = self.rows.get_mut(index) {
            row.coordinate = Some(coordinate);
        }
    }

    /// Output schema: every input column in order plus the two coordinate
    /// columns.
    pub fn output_headers(&self) -> Vec<String> {
        let mut headers = self.headers.clone();
        headers.push("latitude".to_string());
        headers.push("longitude".to_string());
        headers
    }
}
