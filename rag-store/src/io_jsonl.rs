//! JSONL helpers for persisted [`RagRecord`]s, one record per line.

use crate::errors::RagError;
use crate::record::RagRecord;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Reads RagRecord JSONL strictly.
///
/// - Ignores empty lines.
/// - Fails on the first malformed row with [`RagError::Parse`].
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be read.
/// - [`RagError::Parse`] if any line fails deserialization.
pub fn read_all_records(jsonl_path: impl AsRef<Path>) -> Result<Vec<RagRecord>, RagError> {
    info!("Reading RagRecord JSONL: {:?}", jsonl_path.as_ref());

    let file = File::open(jsonl_path.as_ref())?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let r: RagRecord = serde_json::from_str(&line)
            .map_err(|e| RagError::Parse(format!("line {} parse error: {}", i + 1, e)))?;
        out.push(r);
    }

    debug!("Loaded {} RagRecords", out.len());
    Ok(out)
}

/// Writes records as JSONL, replacing the file.
pub fn write_all_records(
    jsonl_path: impl AsRef<Path>,
    records: &[RagRecord],
) -> Result<(), RagError> {
    let file = File::create(jsonl_path.as_ref())?;
    let mut w = BufWriter::new(file);
    for r in records {
        serde_json::to_writer(&mut w, r)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    debug!("Wrote {} RagRecords to {:?}", records.len(), jsonl_path.as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_line_reports_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let good = RagRecord {
            id: "1".into(),
            text: "hello".into(),
            source: "a.txt".into(),
            chunk_index: 0,
            start_char: 0,
            end_char: 5,
            embedding: Some(vec![1.0]),
        };
        write_all_records(&path, std::slice::from_ref(&good)).unwrap();
        let mut body = std::fs::read_to_string(&path).unwrap();
        body.push_str("\n{not json}\n");
        std::fs::write(&path, body).unwrap();

        let err = read_all_records(&path).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }
}
