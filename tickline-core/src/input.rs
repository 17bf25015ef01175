//! Decoding of raw bucket data.
//!
//! The stats source returns a JSON array of `[ts, {env: counts}]` pairs,
//! one per rollup interval, oldest first.

use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::model::Bucket;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bucket data parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_buckets(content: &str) -> Result<Vec<Bucket>, InputError> {
    let buckets: Vec<Bucket> = serde_json::from_str(content)?;
    warn_unsorted(&buckets);
    Ok(buckets)
}

pub fn read_buckets(reader: impl Read) -> Result<Vec<Bucket>, InputError> {
    let buckets: Vec<Bucket> = serde_json::from_reader(reader)?;
    warn_unsorted(&buckets);
    Ok(buckets)
}

pub fn load_buckets(path: &Path) -> Result<Vec<Bucket>, InputError> {
    let content = std::fs::read_to_string(path)?;
    let buckets = parse_buckets(&content)?;
    debug!(path = %path.display(), count = buckets.len(), "loaded bucket data");
    Ok(buckets)
}

// Out-of-order data is passed through as-is; the merger assumes sorted input.
fn warn_unsorted(buckets: &[Bucket]) {
    if let Some(pair) = buckets.windows(2).find(|w| w[0].ts >= w[1].ts) {
        warn!(
            prev = pair[0].ts,
            next = pair[1].ts,
            "bucket timestamps are not strictly ascending"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        [1700000000, {"prod": {"ok": 1, "missed": 0, "timeout": 0, "error": 0, "in_progress": 0}}],
        [1700000060, {}],
        [1700000120, {"prod": {"error": 2}, "dev": {"ok": 3}}]
    ]"#;

    #[test]
    fn test_parse_buckets() {
        let buckets = parse_buckets(SAMPLE).unwrap();
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].ts, 1_700_000_000);
        assert!(buckets[1].envs.is_empty());
        assert_eq!(buckets[2].envs["prod"].error, 2);
        assert_eq!(buckets[2].envs["prod"].ok, 0);
        assert_eq!(buckets[2].envs["dev"].ok, 3);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(parse_buckets("{\"not\": \"a list\"}"), Err(InputError::Json(_))));
        assert!(matches!(parse_buckets("[[1]]"), Err(InputError::Json(_))));
    }

    #[test]
    fn test_unsorted_input_passes_through() {
        let buckets = parse_buckets("[[5, {}], [3, {}]]").unwrap();
        assert_eq!(buckets[0].ts, 5);
        assert_eq!(buckets[1].ts, 3);
    }

    #[test]
    fn test_load_and_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let loaded = load_buckets(file.path()).unwrap();
        assert_eq!(loaded.len(), 3);

        let read = read_buckets(SAMPLE.as_bytes()).unwrap();
        assert_eq!(loaded, read);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_buckets(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(InputError::Io(_))));
    }
}
