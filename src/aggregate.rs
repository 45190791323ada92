// Aggregator: one sequential pass over the normalized stream.
//
// A single `Aggregator` value is the only writer during a run. Partial
// states produced from independent chunks can be combined with `merge`;
// every accumulated quantity is associative and commutative, and the median
// is deferred to finalize so merging stays exact.
use crate::errors::PipelineError;
use crate::parser::ScanStats;
use crate::summary::{self, SummaryModel};
use crate::types::{Category, LoanRecord, QuarantineReason};
use std::collections::HashMap;

/// Published amount-range boundaries: inclusive lower, exclusive upper, the
/// last band open-ended.
pub struct AmountBandDef {
    pub label: &'static str,
    pub lower: f64,
    pub upper: Option<f64>,
}

pub const AMOUNT_BANDS: [AmountBandDef; 4] = [
    AmountBandDef {
        label: "<$50,000",
        lower: f64::NEG_INFINITY,
        upper: Some(50_000.0),
    },
    AmountBandDef {
        label: "$50,000–$99,999",
        lower: 50_000.0,
        upper: Some(100_000.0),
    },
    AmountBandDef {
        label: "$100,000–$149,999",
        lower: 100_000.0,
        upper: Some(150_000.0),
    },
    AmountBandDef {
        label: "≥$150,000",
        lower: 150_000.0,
        upper: None,
    },
];

/// Index of the band an amount falls into. Negative amounts (corrections)
/// land in the `<$50,000` band, never a band of their own.
pub fn band_index(amount: f64) -> usize {
    AMOUNT_BANDS
        .iter()
        .position(|b| match b.upper {
            Some(upper) => amount < upper,
            None => true,
        })
        .unwrap_or(AMOUNT_BANDS.len() - 1)
}

/// Running count/sum/min/max for one group.
#[derive(Debug, Default, Clone)]
pub(crate) struct GroupAcc {
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GroupAcc {
    fn observe(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    fn absorb(&mut self, other: &GroupAcc) {
        self.count += other.count;
        self.sum += other.sum;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

#[derive(Debug, Default)]
pub struct Aggregator {
    pub(crate) valid: u64,
    pub(crate) malformed_rows: u64,
    pub(crate) invalid_amount_rows: u64,
    pub(crate) unknown_region_rows: u64,

    pub(crate) amount: GroupAcc,
    /// Every valid amount, kept for the exact sort-based median at finalize.
    pub(crate) amounts: Vec<f64>,
    pub(crate) subsidy_sum: f64,
    pub(crate) subsidy_rows: u64,

    pub(crate) dates_seen: u64,
    pub(crate) dates_epoch: u64,

    pub(crate) regions: HashMap<String, GroupAcc>,
    pub(crate) categories: HashMap<Category, GroupAcc>,
    pub(crate) bands: [GroupAcc; 4],

    finalized: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator::default()
    }

    /// Account for one quarantined row. Quarantined rows never join any
    /// statistical denominator; they are counted and reported only.
    pub fn quarantine(&mut self, reason: QuarantineReason) {
        match reason {
            QuarantineReason::MalformedStructure => self.malformed_rows += 1,
            QuarantineReason::InvalidAmount => self.invalid_amount_rows += 1,
        }
    }

    /// Accumulate one normalized record.
    pub fn observe(&mut self, rec: LoanRecord) {
        self.valid += 1;
        self.amount.observe(rec.amount);
        self.amounts.push(rec.amount);

        if let Some(subsidy) = rec.subsidy_cost {
            self.subsidy_sum += subsidy;
            self.subsidy_rows += 1;
        }

        if let Some(date) = rec.action_date {
            self.dates_seen += 1;
            if date == *crate::normalize::EPOCH_SENTINEL {
                self.dates_epoch += 1;
            }
        }

        match rec.region {
            Some(code) => self.regions.entry(code).or_default().observe(rec.amount),
            None => self.unknown_region_rows += 1,
        }
        self.categories
            .entry(rec.category)
            .or_default()
            .observe(rec.amount);
        self.bands[band_index(rec.amount)].observe(rec.amount);
    }

    /// Fold another partial state into this one. Both sides must still be
    /// pre-finalize states from disjoint row chunks.
    pub fn merge(&mut self, other: Aggregator) {
        self.valid += other.valid;
        self.malformed_rows += other.malformed_rows;
        self.invalid_amount_rows += other.invalid_amount_rows;
        self.unknown_region_rows += other.unknown_region_rows;

        self.amount.absorb(&other.amount);
        self.amounts.extend(other.amounts);
        self.subsidy_sum += other.subsidy_sum;
        self.subsidy_rows += other.subsidy_rows;
        self.dates_seen += other.dates_seen;
        self.dates_epoch += other.dates_epoch;

        for (code, acc) in other.regions {
            self.regions.entry(code).or_default().absorb(&acc);
        }
        for (cat, acc) in other.categories {
            self.categories.entry(cat).or_default().absorb(&acc);
        }
        for (mine, theirs) in self.bands.iter_mut().zip(other.bands.iter()) {
            mine.absorb(theirs);
        }
    }

    /// Freeze the run into a `SummaryModel`.
    ///
    /// Contract errors, both fatal: calling before the scan is exhausted is
    /// `PrematureFinalize`; calling twice is `AlreadyFinalized`.
    pub fn finalize(&mut self, scan: &ScanStats) -> Result<SummaryModel, PipelineError> {
        if !scan.exhausted {
            return Err(PipelineError::PrematureFinalize);
        }
        if self.finalized {
            return Err(PipelineError::AlreadyFinalized);
        }
        self.finalized = true;
        Ok(summary::build(self, scan))
    }
}
