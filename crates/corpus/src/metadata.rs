//! Timestamp Accessor - arrival timestamps from metadata sidecars.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use contracts::{ContractError, DataKind, FrameId, SourceId, Timestamp, TimestampSource};
use tracing::trace;

use crate::naming::metadata_file_name;

/// Reads sidecars from disk on every call.
///
/// Memoization belongs to the caller (see the sync engine's per-run cache).
#[derive(Debug, Clone)]
pub struct MetadataReader {
    root: PathBuf,
}

impl MetadataReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the sidecar describing one frame
    pub fn metadata_path(&self, source: &str, kind: DataKind, frame: FrameId) -> PathBuf {
        self.root.join(metadata_file_name(source, kind, frame))
    }

    pub fn read(
        &self,
        source: &str,
        kind: DataKind,
        frame: FrameId,
    ) -> Result<Timestamp, ContractError> {
        let path = self.metadata_path(source, kind, frame);
        let timestamp = read_timestamp(&path, kind)?;
        metrics::counter!("metadata_reads_total", "kind" => kind.token()).increment(1);
        trace!(source, %kind, frame, timestamp, "read arrival timestamp");
        Ok(timestamp)
    }
}

impl TimestampSource for MetadataReader {
    fn arrival_timestamp(
        &mut self,
        source: &SourceId,
        kind: DataKind,
        frame: FrameId,
    ) -> Result<Timestamp, ContractError> {
        self.read(source.as_str(), kind, frame)
    }
}

fn read_timestamp(path: &Path, kind: DataKind) -> Result<Timestamp, ContractError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ContractError::MetadataMissing {
            path: path.to_path_buf(),
        },
        _ => ContractError::Io(e),
    })?;

    let wanted = kind.metadata_line();
    let line = match BufReader::new(file).lines().nth(wanted) {
        Some(Ok(line)) => line,
        Some(Err(e)) => {
            return Err(ContractError::metadata_malformed(
                path,
                format!("cannot read line {wanted}: {e}"),
            ))
        }
        None => {
            return Err(ContractError::metadata_malformed(
                path,
                format!("expected at least {} lines", wanted + 1),
            ))
        }
    };

    parse_timestamp(&line).map_err(|message| ContractError::metadata_malformed(path, message))
}

/// Extract the integer in the second comma-separated field of a sidecar line.
pub fn parse_timestamp(line: &str) -> Result<Timestamp, String> {
    let field = line
        .split(',')
        .nth(1)
        .ok_or_else(|| format!("no second field in line '{line}'"))?
        .trim();

    field
        .parse::<Timestamp>()
        .map_err(|e| format!("'{field}' is not an integer timestamp: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockCorpus;
    use tempfile::TempDir;

    #[test]
    fn test_parse_timestamp_field() {
        assert_eq!(parse_timestamp("Time Of Arrival,1712345678901"), Ok(1712345678901));
        assert_eq!(parse_timestamp("Time Of Arrival, 42 "), Ok(42));
        assert_eq!(parse_timestamp("a,-7,extra"), Ok(-7));
        assert!(parse_timestamp("Time Of Arrival").is_err());
        assert!(parse_timestamp("Time Of Arrival,12.5").is_err());
        assert!(parse_timestamp("Time Of Arrival,").is_err());
    }

    #[test]
    fn test_reads_kind_specific_line() {
        let dir = TempDir::new().unwrap();
        let mock = MockCorpus::new(dir.path());
        mock.add_frame("raspi1", DataKind::Depth, 4, 1_004).unwrap();
        mock.add_frame("raspi1", DataKind::Colour, 4, 998).unwrap();

        let mut reader = MetadataReader::new(dir.path());
        assert_eq!(
            reader
                .arrival_timestamp(&"raspi1".into(), DataKind::Depth, 4)
                .unwrap(),
            1_004
        );
        assert_eq!(reader.read("raspi1", DataKind::Colour, 4).unwrap(), 998);
    }

    #[test]
    fn test_missing_sidecar() {
        let dir = TempDir::new().unwrap();
        let reader = MetadataReader::new(dir.path());
        let err = reader.read("raspi1", DataKind::Depth, 1).unwrap_err();
        assert!(matches!(err, ContractError::MetadataMissing { .. }));
    }

    #[test]
    fn test_truncated_sidecar() {
        let dir = TempDir::new().unwrap();
        let mock = MockCorpus::new(dir.path());
        mock.add_raw("raspi1_depth_metadata_1.txt", "Type,Depth\nFrame Number,1\n")
            .unwrap();

        let reader = MetadataReader::new(dir.path());
        let err = reader.read("raspi1", DataKind::Depth, 1).unwrap_err();
        assert!(matches!(err, ContractError::MetadataMalformed { .. }));
        assert!(err.to_string().contains("expected at least 9 lines"));
    }

    #[test]
    fn test_non_integer_timestamp() {
        let dir = TempDir::new().unwrap();
        let mock = MockCorpus::new(dir.path());
        let mut lines: Vec<String> = (0..8).map(|i| format!("Field {i},{i}")).collect();
        lines[6] = "Time Of Arrival,soon".into();
        mock.add_raw("raspi1_colour_metadata_1.txt", &lines.join("\n"))
            .unwrap();

        let reader = MetadataReader::new(dir.path());
        let err = reader.read("raspi1", DataKind::Colour, 1).unwrap_err();
        assert!(err.is_metadata_error());
        assert!(err.to_string().contains("soon"));
    }
}
