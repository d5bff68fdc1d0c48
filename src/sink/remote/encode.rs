use crate::domain::LogEntry;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use thiserror::Error;
use uuid::Uuid;

const ESTIMATED_ENTRY_SIZE: usize = 256;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Compression failed: {0}")]
    Compression(#[from] std::io::Error),
    #[error("Batch is empty")]
    EmptyBatch,
}

/// One request body ready to ship.
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    pub id: String,
    pub body: Vec<u8>,
    pub entry_count: usize,
    pub compressed: bool,
}

/// Serializes entries as newline-delimited JSON, gzip-compressed on request.
pub fn encode_batch(entries: &[LogEntry], compress: bool) -> Result<EncodedBatch, EncodeError> {
    if entries.is_empty() {
        return Err(EncodeError::EmptyBatch);
    }

    let mut ndjson = Vec::with_capacity(entries.len() * ESTIMATED_ENTRY_SIZE);
    for entry in entries {
        serde_json::to_writer(&mut ndjson, entry)?;
        ndjson.push(b'\n');
    }

    let body = if compress {
        let mut encoder = GzEncoder::new(Vec::with_capacity(ndjson.len() / 4), Compression::fast());
        encoder.write_all(&ndjson)?;
        encoder.finish()?
    } else {
        ndjson
    };

    Ok(EncodedBatch {
        id: Uuid::new_v4().to_string(),
        body,
        entry_count: entries.len(),
        compressed: compress,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Level, Record};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn entries(n: usize) -> Vec<LogEntry> {
        (0..n)
            .map(|i| {
                let message = format!("entry {i}");
                LogEntry::capture(&Record::new(Level::Info, "app", &message), "", &[])
            })
            .collect()
    }

    #[test]
    fn test_ndjson_one_line_per_entry() {
        let batch = encode_batch(&entries(3), false).unwrap();
        let text = String::from_utf8(batch.body).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(text.ends_with('\n'));
        let json: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(json["message"], "entry 2");
        assert_eq!(batch.entry_count, 3);
        assert!(!batch.compressed);
    }

    #[test]
    fn test_gzip_round_trip() {
        let plain = encode_batch(&entries(20), false).unwrap();
        let compressed = encode_batch(&entries(20), true).unwrap();
        assert!(compressed.compressed);

        let mut decoded = Vec::new();
        GzDecoder::new(compressed.body.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        // Timestamps differ between the two encodings; compare structure only.
        assert_eq!(decoded.iter().filter(|b| **b == b'\n').count(), 20);
        assert_eq!(plain.body.iter().filter(|b| **b == b'\n').count(), 20);
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(encode_batch(&[], false), Err(EncodeError::EmptyBatch)));
    }

    #[test]
    fn test_batch_ids_are_unique() {
        let a = encode_batch(&entries(1), false).unwrap();
        let b = encode_batch(&entries(1), false).unwrap();
        assert_ne!(a.id, b.id);
    }
}
