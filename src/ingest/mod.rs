//! Record ingestion: pull raw statuses from a source, adapt them, and
//! store the results.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{GeolearnError, Result};
use crate::record::{RawStatus, RecordAdapter};
use crate::storage::Storage;

/// A pull-based stream of raw statuses.
pub trait RecordSource {
    /// The next raw status, or `None` when the source is exhausted.
    fn next_record(&mut self) -> Result<Option<RawStatus>>;
}

/// Reads one JSON status per line. Unparseable lines are logged and
/// skipped; only losing the file itself aborts ingestion.
#[derive(Debug)]
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line: u64,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a JSON-lines file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            GeolearnError::source(format!(
                "cannot open record file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(JsonLinesSource {
            reader: BufReader::new(file),
            line: 0,
        })
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Wrap an already-open reader.
    pub fn from_reader(reader: R) -> Self {
        JsonLinesSource { reader, line: 0 }
    }
}

impl<R: BufRead> RecordSource for JsonLinesSource<R> {
    fn next_record(&mut self) -> Result<Option<RawStatus>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            self.line += 1;
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawStatus>(trimmed) {
                Ok(status) => return Ok(Some(status)),
                Err(err) => {
                    warn!(line = self.line, error = %err, "skipping malformed record");
                }
            }
        }
    }
}

/// Counters of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Records stored with a region label.
    pub stored: u64,
    /// Records whose coordinate resolved to no region (user kept).
    pub unknown_region: u64,
    /// Records with no usable location signal.
    pub dropped: u64,
    /// Records rejected for a per-record error.
    pub invalid: u64,
}

/// Drain a source through the adapter into the store.
pub fn run_ingest<S: RecordSource>(
    source: &mut S,
    adapter: &RecordAdapter<'_>,
    storage: &Storage,
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    while let Some(raw) = source.next_record()? {
        match adapter.adapt(&raw) {
            Ok(Some(record)) => {
                storage.store(&record)?;
                if record.region.is_some() {
                    stats.stored += 1;
                } else {
                    stats.unknown_region += 1;
                }
            }
            Ok(None) => stats.dropped += 1,
            Err(err) if err.is_per_record() => {
                warn!(record = raw.id, error = %err, "rejecting record");
                stats.invalid += 1;
            }
            Err(err) => return Err(err),
        }
    }
    info!(
        stored = stats.stored,
        unknown_region = stats.unknown_region,
        dropped = stats.dropped,
        invalid = stats.invalid,
        "ingestion finished"
    );
    Ok(stats)
}
