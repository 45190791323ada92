// Summary model builder: freezes a finished aggregation pass into the one
// structure every report renderer consumes.
use crate::aggregate::{Aggregator, GroupAcc, AMOUNT_BANDS};
use crate::parser::ScanStats;
use crate::util::{average, format_int, median};
use std::cmp::Ordering;
use std::time::Duration;

/// Aggregate statistics for one group key (a jurisdiction or a business
/// type).
#[derive(Debug, Clone)]
pub struct Bucket {
    pub key: String,
    pub count: u64,
    pub total: f64,
    pub mean: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Percent of valid records in this bucket. Quarantined rows are
    /// excluded from every denominator.
    pub share_of_valid: f64,
}

/// One fixed amount range with its published boundaries. Carries the same
/// statistics as the other buckets.
#[derive(Debug, Clone)]
pub struct AmountBand {
    pub label: &'static str,
    /// Inclusive lower bound (`NEG_INFINITY` for the first band).
    pub lower: f64,
    /// Exclusive upper bound; `None` for the open-ended last band.
    pub upper: Option<f64>,
    pub count: u64,
    pub total: f64,
    pub mean: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub share_of_valid: f64,
}

/// The immutable output of one pipeline run. Built once at finalize, then
/// handed by shared reference to every report collaborator.
#[derive(Debug)]
pub struct SummaryModel {
    pub rows_scanned: u64,
    pub valid_count: u64,
    pub quarantined_count: u64,
    pub malformed_rows: u64,
    pub invalid_amount_rows: u64,
    pub unknown_region_rows: u64,

    pub total_amount: f64,
    pub total_subsidy: f64,
    /// Rows that actually carried a subsidy figure; the denominator for
    /// `mean_subsidy`.
    pub subsidy_rows: u64,
    pub mean_amount: f64,
    pub median_amount: f64,
    pub mean_subsidy: f64,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,

    /// Sorted by total amount descending, ties broken by code ascending.
    pub region_buckets: Vec<Bucket>,
    /// Same ordering as the region buckets; counts sum to `valid_count`.
    pub category_buckets: Vec<Bucket>,
    /// Fixed published order.
    pub amount_bands: Vec<AmountBand>,

    pub quality_notes: Vec<String>,
}

/// Run diagnostics for caller-side logging, exposed as plain key/value
/// pairs.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub rows_seen: u64,
    pub valid_rows: u64,
    pub quarantined_malformed: u64,
    pub quarantined_invalid_amount: u64,
    pub unknown_region_rows: u64,
    pub elapsed: Duration,
}

impl Diagnostics {
    pub fn as_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("rows_seen", format_int(self.rows_seen)),
            ("valid_rows", format_int(self.valid_rows)),
            (
                "quarantined_malformed_structure",
                format_int(self.quarantined_malformed),
            ),
            (
                "quarantined_invalid_amount",
                format_int(self.quarantined_invalid_amount),
            ),
            ("rows_unknown_region", format_int(self.unknown_region_rows)),
            ("elapsed_ms", self.elapsed.as_millis().to_string()),
        ]
    }
}

fn share(count: u64, valid: u64) -> f64 {
    if valid == 0 {
        0.0
    } else {
        count as f64 / valid as f64 * 100.0
    }
}

fn to_buckets<I>(groups: I, valid: u64) -> Vec<Bucket>
where
    I: IntoIterator<Item = (String, GroupAcc)>,
{
    let mut buckets: Vec<Bucket> = groups
        .into_iter()
        .map(|(key, acc)| Bucket {
            share_of_valid: share(acc.count, valid),
            mean: average(acc.sum, acc.count),
            count: acc.count,
            total: acc.sum,
            min: acc.min,
            max: acc.max,
            key,
        })
        .collect();
    // Total amount descending; ties broken by key ascending so the order is
    // fully deterministic regardless of accumulation order.
    buckets.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    buckets
}

pub(crate) fn build(agg: &Aggregator, scan: &ScanStats) -> SummaryModel {
    let valid = agg.valid;
    let quarantined = agg.malformed_rows + agg.invalid_amount_rows;

    let region_buckets = to_buckets(
        agg.regions.iter().map(|(k, v)| (k.clone(), v.clone())),
        valid,
    );
    let category_buckets = to_buckets(
        agg.categories
            .iter()
            .map(|(k, v)| (k.label().to_string(), v.clone())),
        valid,
    );
    let amount_bands = AMOUNT_BANDS
        .iter()
        .zip(agg.bands.iter())
        .map(|(def, acc)| AmountBand {
            label: def.label,
            lower: def.lower,
            upper: def.upper,
            count: acc.count,
            total: acc.sum,
            mean: average(acc.sum, acc.count),
            min: acc.min,
            max: acc.max,
            share_of_valid: share(acc.count, valid),
        })
        .collect();

    let mut quality_notes = Vec::new();
    if agg.dates_seen > 0 && agg.dates_epoch == agg.dates_seen {
        quality_notes.push(format!(
            "all {} recorded action dates are the 1970-01-01 epoch sentinel; \
             the field is reported as-is and is unusable for temporal analysis",
            format_int(agg.dates_epoch)
        ));
    }
    if agg.unknown_region_rows > 0 {
        quality_notes.push(format!(
            "{} rows carry a state code outside the 56 recognized jurisdictions; \
             they remain in the global totals but are excluded from regional buckets",
            format_int(agg.unknown_region_rows)
        ));
    }
    if quarantined > 0 {
        quality_notes.push(format!(
            "{} rows quarantined ({} malformed structure, {} invalid amount)",
            format_int(quarantined),
            format_int(agg.malformed_rows),
            format_int(agg.invalid_amount_rows)
        ));
    }

    SummaryModel {
        rows_scanned: scan.rows_seen,
        valid_count: valid,
        quarantined_count: quarantined,
        malformed_rows: agg.malformed_rows,
        invalid_amount_rows: agg.invalid_amount_rows,
        unknown_region_rows: agg.unknown_region_rows,
        total_amount: agg.amount.sum,
        total_subsidy: agg.subsidy_sum,
        subsidy_rows: agg.subsidy_rows,
        mean_amount: average(agg.amount.sum, valid),
        median_amount: median(agg.amounts.clone()),
        mean_subsidy: average(agg.subsidy_sum, agg.subsidy_rows),
        min_amount: agg.amount.min,
        max_amount: agg.amount.max,
        region_buckets,
        category_buckets,
        amount_bands,
        quality_notes,
    }
}
