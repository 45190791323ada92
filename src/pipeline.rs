// Pipeline driver: one sequential pass from file to frozen summary.
//
// raw file -> RowScanner -> Schema::normalize -> Aggregator -> SummaryModel.
// Row-level problems never escape this loop as errors; only file-level and
// contract-level failures propagate.
use crate::aggregate::Aggregator;
use crate::errors::PipelineError;
use crate::normalize::Schema;
use crate::parser::{RowScanner, ScanItem};
use crate::summary::{Diagnostics, SummaryModel};
use crate::types::{QuarantineReason, RowOutcome};
use std::time::Instant;

#[derive(Debug)]
pub struct PipelineRun {
    pub summary: SummaryModel,
    pub diagnostics: Diagnostics,
}

pub fn run_file(path: &str) -> Result<PipelineRun, PipelineError> {
    let started = Instant::now();
    let (mut scanner, header) = RowScanner::open(path)?;
    let schema = Schema::from_header(&header)?;

    let mut agg = Aggregator::new();
    for item in scanner.by_ref() {
        match item {
            ScanItem::Row(row) => match schema.normalize(&row) {
                RowOutcome::Record(rec) => agg.observe(rec),
                RowOutcome::Quarantined(reason) => agg.quarantine(reason),
            },
            ScanItem::Malformed => agg.quarantine(QuarantineReason::MalformedStructure),
        }
    }

    let scan = scanner.stats();
    let summary = agg.finalize(&scan)?;
    let diagnostics = Diagnostics {
        rows_seen: scan.rows_seen,
        valid_rows: summary.valid_count,
        quarantined_malformed: summary.malformed_rows,
        quarantined_invalid_amount: summary.invalid_amount_rows,
        unknown_region_rows: summary.unknown_region_rows,
        elapsed: started.elapsed(),
    };
    Ok(PipelineRun {
        summary,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const HEADER: &str =
        "ACTIONDATE,LEGALENTITYSTATECD,BUSINESSTYPES,FACEVALUEOFDIRECTLOANORLOANGUARANTEE,ORIGINALLOANSUBSIDYCOST";

    fn write_fixture(name: &str, content: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("eidl_pipeline_{}_{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_end_to_end_six_row_fixture() {
        // 3 well-formed rows across two regions and two categories, plus one
        // unknown-region row, one unrecognized-category row, and one
        // structurally malformed row (extra field).
        let content = format!(
            "{HEADER}\n\
             1970-01-01,CA,REGULAR,10000.00,500.00\n\
             1970-01-01,CA,PARTNERSHIP,20000.00,\n\
             1970-01-01,NY,REGULAR,150000.00,7500.00\n\
             1970-01-01,ZZ,REGULAR,5000.00,250.00\n\
             1970-01-01,TX,LLC,30000.00,1500.00\n\
             1970-01-01,NY,REGULAR,30000.00,100.00,oops,extra\n"
        );
        let path = write_fixture("e2e.csv", &content);
        let run = run_file(path.to_str().unwrap()).unwrap();
        let m = &run.summary;

        assert_eq!(m.rows_scanned, 6);
        assert_eq!(m.quarantined_count, 1);
        assert_eq!(m.malformed_rows, 1);
        assert_eq!(m.valid_count, 5);
        assert_eq!(m.unknown_region_rows, 1);
        assert_eq!(m.valid_count + m.quarantined_count, m.rows_scanned);

        // The malformed row's 30,000 must not leak into any sum.
        assert_eq!(m.total_amount, 215_000.0);
        assert_eq!(m.total_subsidy, 9_750.0);
        assert_eq!(m.subsidy_rows, 4);
        assert_eq!(m.median_amount, 20_000.0);

        // Regions: NY 150,000 > CA 30,000 = TX 30,000 (tie broken by code).
        let regions: Vec<(&str, u64, f64)> = m
            .region_buckets
            .iter()
            .map(|b| (b.key.as_str(), b.count, b.total))
            .collect();
        assert_eq!(
            regions,
            vec![("NY", 1, 150_000.0), ("CA", 2, 30_000.0), ("TX", 1, 30_000.0)]
        );
        let region_count: u64 = m.region_buckets.iter().map(|b| b.count).sum();
        assert_eq!(region_count, m.valid_count - m.unknown_region_rows);

        // Categories are lossless: the LLC row is in "other".
        let categories: Vec<(&str, u64, f64)> = m
            .category_buckets
            .iter()
            .map(|b| (b.key.as_str(), b.count, b.total))
            .collect();
        assert_eq!(
            categories,
            vec![
                ("regular", 3, 165_000.0),
                ("other", 1, 30_000.0),
                ("partnership", 1, 20_000.0)
            ]
        );

        // Bands: four loans under $50k, the $150k loan in the open band.
        let bands: Vec<u64> = m.amount_bands.iter().map(|b| b.count).collect();
        assert_eq!(bands, vec![4, 0, 0, 1]);
        let low = &m.amount_bands[0];
        assert_eq!(low.total, 65_000.0);
        assert_eq!(low.mean, 16_250.0);
        assert_eq!(low.min, Some(5_000.0));
        assert_eq!(low.max, Some(30_000.0));
        let open = &m.amount_bands[3];
        assert_eq!(open.mean, 150_000.0);
        assert_eq!(open.min, Some(150_000.0));
        assert_eq!(open.max, Some(150_000.0));

        // Every artifact-facing surface reports the data-quality facts.
        assert!(m.quality_notes.iter().any(|n| n.contains("quarantined")));
        assert!(m.quality_notes.iter().any(|n| n.contains("epoch sentinel")));
        assert_eq!(run.diagnostics.rows_seen, 6);
        assert_eq!(run.diagnostics.valid_rows, 5);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_amount_row_is_quarantined() {
        let content = format!(
            "{HEADER}\n\
             1970-01-01,CA,REGULAR,not-a-number,\n\
             1970-01-01,CA,REGULAR,10000.00,\n"
        );
        let path = write_fixture("badamount.csv", &content);
        let run = run_file(path.to_str().unwrap()).unwrap();
        assert_eq!(run.summary.valid_count, 1);
        assert_eq!(run.summary.invalid_amount_rows, 1);
        assert_eq!(run.summary.total_amount, 10_000.0);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_propagates_immediately() {
        let err = run_file("/no/such/dataset.csv").unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
    }
}
