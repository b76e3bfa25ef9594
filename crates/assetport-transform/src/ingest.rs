//! CSV and JSON ingestion

use std::fs::File;
use std::io::Read;
use std::path::Path;

use assetport_api::{ImportAsset, ValidationError};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::{Result, TransformError};
use crate::mapping::{FieldMapping, map_asset};

/// Read assets from a CSV file with a header row
///
/// Each data row becomes one asset; header names are the input keys.
/// Processing stops at the first invalid row and nothing is returned.
///
/// # Errors
/// Returns [`TransformError::Io`] if the file cannot be opened,
/// [`TransformError::Csv`] if reading fails part way, and a validation error
/// (see [`TransformError::is_validation`]) for bad content.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn assets_from_csv(
    path: impl AsRef<Path>,
    mapping: Option<&FieldMapping>,
) -> Result<Vec<ImportAsset>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let assets = read_csv(file, mapping)?;
    info!(count = assets.len(), "read assets from CSV");
    Ok(assets)
}

/// Read assets from CSV data held by any reader
///
/// # Errors
/// See [`assets_from_csv`].
pub fn assets_from_csv_reader<R: Read>(
    reader: R,
    mapping: Option<&FieldMapping>,
) -> Result<Vec<ImportAsset>> {
    read_csv(reader, mapping)
}

fn read_csv<R: Read>(reader: R, mapping: Option<&FieldMapping>) -> Result<Vec<ImportAsset>> {
    let identity = FieldMapping::new();
    let mapping = mapping.unwrap_or(&identity);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = reader.headers().map_err(csv_content_error)?.clone();

    let mut assets = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(csv_content_error)?;
        let record: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();

        let asset = map_asset(&record, mapping).map_err(|source| TransformError::InvalidRecord {
            record: index + 1,
            source,
        })?;
        assets.push(asset);
    }
    debug!(count = assets.len(), "parsed CSV rows");
    Ok(assets)
}

/// Read assets from a JSON document holding one object or an array of objects
///
/// # Errors
/// Returns a validation error for malformed JSON or any invalid record.
#[instrument(skip_all, fields(bytes = input.as_ref().len()))]
pub fn assets_from_json(
    input: impl AsRef<[u8]>,
    mapping: Option<&FieldMapping>,
) -> Result<Vec<ImportAsset>> {
    let identity = FieldMapping::new();
    let mapping = mapping.unwrap_or(&identity);

    let document: Value = serde_json::from_slice(input.as_ref()).map_err(ValidationError::from)?;
    let records = match document {
        Value::Array(items) => items,
        single => vec![single],
    };

    let mut assets = Vec::with_capacity(records.len());
    for (index, item) in records.into_iter().enumerate() {
        let asset = match item {
            Value::Object(record) => map_asset(&record, mapping),
            _ => Err(ValidationError::Malformed(
                "expected a JSON object for each asset".to_string(),
            )),
        }
        .map_err(|source| TransformError::InvalidRecord {
            record: index + 1,
            source,
        })?;
        assets.push(asset);
    }
    info!(count = assets.len(), "read assets from JSON");
    Ok(assets)
}

/// Classify a CSV error: row problems are content errors, the rest pass through
fn csv_content_error(err: csv::Error) -> TransformError {
    match err.kind() {
        csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. } => {
            TransformError::Validation(ValidationError::Malformed(err.to_string()))
        }
        _ => TransformError::Csv(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_single_object() {
        let assets = assets_from_json(r#"{"id": "x", "foo": "bar"}"#, None).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, "x");
        assert_eq!(assets[0].custom_attributes.len(), 1);
        assert_eq!(assets[0].custom_attributes["foo"], "bar");
    }

    #[test]
    fn test_json_array() {
        let assets = assets_from_json(r#"[{"id": "a"}, {"id": "b"}]"#, None).unwrap();
        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_json_syntax_error_is_validation() {
        let err = assets_from_json("{not json", None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_json_non_object_entry_reports_position() {
        let err = assets_from_json(r#"[{"id": "a"}, 5]"#, None).unwrap_err();
        assert!(matches!(err, TransformError::InvalidRecord { record: 2, .. }));
    }

    #[test]
    fn test_csv_reader_header_mismatch() {
        let data = "id,domain\na,example.com\nb,example.com,extra\n";
        let err = assets_from_csv_reader(data.as_bytes(), None).unwrap_err();
        assert!(err.is_validation());
    }
}
