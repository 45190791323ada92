// Record parser: a lazy scan over the delimited source file.
//
// A single bad row never aborts the scan. The only fatal condition here is
// the file being missing or unreadable.
use crate::errors::PipelineError;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::fs::File;

/// Counters exposed after (or during) a scan. `exhausted` flips when the
/// underlying iterator returns `None`; finalize uses it to reject premature
/// calls.
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    pub rows_seen: u64,
    pub malformed: u64,
    pub exhausted: bool,
}

/// One scanned row: either the raw fields, or a structural quarantine when
/// the quote-aware field count does not match the header's.
#[derive(Debug)]
pub enum ScanItem {
    Row(StringRecord),
    Malformed,
}

/// Lazy, single-use iterator over the source rows. Restarting a scan means
/// opening a fresh scanner; there is no rewind state.
pub struct RowScanner {
    records: StringRecordsIntoIter<File>,
    header_len: usize,
    rows_seen: u64,
    malformed: u64,
    exhausted: bool,
}

impl std::fmt::Debug for RowScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowScanner")
            .field("header_len", &self.header_len)
            .field("rows_seen", &self.rows_seen)
            .field("malformed", &self.malformed)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl RowScanner {
    /// Open the source file and read its header row.
    ///
    /// `flexible(true)` makes field-count mismatches data instead of reader
    /// errors, so each mismatched row can be quarantined individually.
    pub fn open(path: &str) -> Result<(Self, StringRecord), PipelineError> {
        let unavailable = |source| PipelineError::SourceUnavailable {
            path: path.to_string(),
            source,
        };
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(unavailable)?;
        let header = rdr.headers().map_err(unavailable)?.clone();
        let header_len = header.len();
        Ok((
            RowScanner {
                records: rdr.into_records(),
                header_len,
                rows_seen: 0,
                malformed: 0,
                exhausted: false,
            },
            header,
        ))
    }

    pub fn stats(&self) -> ScanStats {
        ScanStats {
            rows_seen: self.rows_seen,
            malformed: self.malformed,
            exhausted: self.exhausted,
        }
    }
}

impl Iterator for RowScanner {
    type Item = ScanItem;

    fn next(&mut self) -> Option<ScanItem> {
        match self.records.next() {
            None => {
                self.exhausted = true;
                None
            }
            Some(Ok(rec)) => {
                self.rows_seen += 1;
                if rec.len() == self.header_len {
                    Some(ScanItem::Row(rec))
                } else {
                    self.malformed += 1;
                    Some(ScanItem::Malformed)
                }
            }
            Some(Err(_)) => {
                // Row-level read errors (e.g. invalid UTF-8) are quarantined
                // the same way as a field-count mismatch.
                self.rows_seen += 1;
                self.malformed += 1;
                Some(ScanItem::Malformed)
            }
        }
    }
}
