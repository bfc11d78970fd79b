//! CSV ingestion.
//!
//! The knowledge base is a headerless, comma-delimited CSV with a fixed
//! four-column schema: ExceptionID, ExceptionName, ExceptionCause,
//! ExceptionResolution. Loading is all-or-nothing: a missing file or a row
//! that does not match the schema fails the whole load.

use std::path::Path;

use serde::Deserialize;

use crate::errors::ApiError;
use crate::store::StoredDocument;

/// One row of the source CSV. Immutable once read.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExceptionRecord {
    pub exception_id: String,
    pub exception_name: String,
    pub exception_cause: String,
    pub exception_resolution: String,
}

/// Reads all records from `path`, preserving file order.
pub fn load_records(path: &Path) -> Result<Vec<ExceptionRecord>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .from_path(path)
        .map_err(|err| {
            ApiError::Source(format!("cannot open {}: {}", path.display(), err))
        })?;

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<ExceptionRecord>().enumerate() {
        let record = result.map_err(|err| {
            ApiError::Source(format!(
                "malformed row {} in {}: {}",
                row + 1,
                path.display(),
                err
            ))
        })?;
        records.push(record);
    }

    Ok(records)
}

impl ExceptionRecord {
    /// Converts a record into its stored document, 1:1. The document id is
    /// the CSV id when present, otherwise the 1-based row number.
    pub fn into_document(self, row: usize) -> StoredDocument {
        let doc_id = if self.exception_id.trim().is_empty() {
            format!("row-{}", row + 1)
        } else {
            self.exception_id.clone()
        };

        StoredDocument {
            doc_id,
            exception_name: self.exception_name,
            exception_cause: self.exception_cause,
            exception_resolution: self.exception_resolution,
        }
    }
}

/// Loads the CSV and converts every row into a stored document.
pub fn load_documents(path: &Path) -> Result<Vec<StoredDocument>, ApiError> {
    let records = load_records(path)?;
    Ok(records
        .into_iter()
        .enumerate()
        .map(|(row, record)| record.into_document(row))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_rows_in_order_with_all_fields() {
        let file = write_csv(
            "E1,InvalidProductVariant,variant id missing,validate variant before checkout\n\
             E2,PaymentTimeout,gateway slow,retry with backoff\n\
             E3,StockMismatch,stale cache,invalidate stock cache\n",
        );

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].exception_id, "E1");
        assert_eq!(records[0].exception_name, "InvalidProductVariant");
        assert_eq!(records[1].exception_cause, "gateway slow");
        assert_eq!(records[2].exception_resolution, "invalidate stock cache");
        for record in &records {
            assert!(!record.exception_id.is_empty());
            assert!(!record.exception_name.is_empty());
            assert!(!record.exception_cause.is_empty());
            assert!(!record.exception_resolution.is_empty());
        }
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let err = load_records(Path::new("/nonexistent/exceptions.csv")).unwrap_err();
        assert!(matches!(err, ApiError::Source(_)));
    }

    #[test]
    fn malformed_row_is_a_source_error() {
        let file = write_csv("E1,InvalidProductVariant,variant id missing\n");
        let err = load_records(file.path()).unwrap_err();
        match err {
            ApiError::Source(msg) => assert!(msg.contains("row 1")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn document_id_falls_back_to_row_number() {
        let file = write_csv(",NullPointer,missing null check,add guard clause\n");
        let docs = load_documents(file.path()).unwrap();
        assert_eq!(docs[0].doc_id, "row-1");
        assert_eq!(docs[0].exception_name, "NullPointer");
    }
}
