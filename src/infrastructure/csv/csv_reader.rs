// ============================================================
// CSV READER
// ============================================================
// Load delimited input files with byte-encoding detection

use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use csv::ReaderBuilder;

use crate::domain::error::{AppError, Result};
use crate::domain::table::AddressTable;

/// How many bytes of the file feed the encoding detector.
const ENCODING_SAMPLE_LEN: usize = 100 * 1024;

/// CSV reader with encoding detection
pub struct CsvReader {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read a file and parse it into an address table. Encoding is sniffed
    /// from the leading bytes; the whole file is then decoded with the
    /// detected encoding before parsing.
    pub fn read_file(&self, path: &Path) -> Result<AddressTable> {
        let bytes = fs::read(path)
            .map_err(|e| AppError::IoError(format!("failed to read {}: {}", path.display(), e)))?;
        let content = decode_bytes(&bytes)?;
        self.read_content(&content)
    }

    /// Parse already-decoded CSV content.
    pub fn read_content(&self, content: &str) -> Result<AddressTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("failed to read CSV headers: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("failed to parse CSV row {}: {}", index + 1, e))
            })?;
            records.push(record.iter().map(str::to_string).collect());
        }

        AddressTable::new(headers, records)
    }
}

/// Decode raw file bytes into a string. The encoding is guessed from the
/// first 100KB; a decode that produces replacement characters is treated as
/// corrupt input and aborts the run.
fn decode_bytes(bytes: &[u8]) -> Result<String> {
    let sample_len = bytes.len().min(ENCODING_SAMPLE_LEN);
    let mut detector = EncodingDetector::new();
    detector.feed(&bytes[..sample_len], sample_len == bytes.len());
    let encoding = detector.guess(None, true);

    let (text, used_encoding, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(AppError::EncodingError(format!(
            "input is not valid {} text",
            used_encoding.name()
        )));
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = "name,address\nTower,Tokyo Tower\nStation,Tokyo Station";
        let table = CsvReader::new().read_content(content).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.headers(), &["name", "address"]);
        assert_eq!(table.address(0), "Tokyo Tower");
        assert_eq!(table.address(1), "Tokyo Station");
    }

    #[test]
    fn test_missing_address_column_is_fatal() {
        let content = "name,place\nTower,Tokyo";
        assert!(CsvReader::new().read_content(content).is_err());
    }

    #[test]
    fn test_ragged_row_is_fatal() {
        let content = "name,address\nTower,Tokyo Tower,extra";
        assert!(CsvReader::new().read_content(content).is_err());
    }

    #[test]
    fn test_semicolon_delimiter() {
        let content = "name;address\nTower;Tokyo Tower";
        let table = CsvReader::new()
            .with_delimiter(b';')
            .read_content(content)
            .unwrap();
        assert_eq!(table.address(0), "Tokyo Tower");
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("name,address\nTower,Tokyo Tower".as_bytes());
        let content = decode_bytes(&bytes).unwrap();
        let table = CsvReader::new().read_content(&content).unwrap();
        assert_eq!(table.address(0), "Tokyo Tower");
    }

    #[test]
    fn test_decode_shift_jis() {
        let text = "name,address\n\u{6771}\u{4eac}\u{30bf}\u{30ef}\u{30fc},\u{6771}\u{4eac}\u{90fd}\u{6e2f}\u{533a}\u{829d}\u{516c}\u{5712}4-2-8\n\u{6771}\u{4eac}\u{99c5},\u{6771}\u{4eac}\u{90fd}\u{5343}\u{4ee3}\u{7530}\u{533a}\u{4e38}\u{306e}\u{5185}1-9-1\n";
        let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(text);
        let content = decode_bytes(&encoded).unwrap();
        let table = CsvReader::new().read_content(&content).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.address(0).contains("\u{829d}\u{516c}\u{5712}"));
    }

    #[test]
    fn test_corrupt_bytes_are_fatal() {
        // Valid UTF-8 Japanese fills the detection sample, so the detector
        // commits to UTF-8; a stray continuation byte past the sample then
        // corrupts the full decode.
        let mut bytes = b"name,address\n".to_vec();
        let line = "\u{6771}\u{4eac}\u{30bf}\u{30ef}\u{30fc},\u{6771}\u{4eac}\u{90fd}\u{6e2f}\u{533a}\u{829d}\u{516c}\u{5712}\n".as_bytes();
        while bytes.len() <= ENCODING_SAMPLE_LEN {
            bytes.extend_from_slice(line);
        }
        bytes.push(0x80);
        let err = decode_bytes(&bytes).unwrap_err();
        assert!(matches!(err, AppError::EncodingError(_)));
    }
}
