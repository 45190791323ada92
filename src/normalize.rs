// Schema normalizer: maps one raw row to a `LoanRecord` or a quarantine.
//
// Normalization is pure per-row: it never consults or mutates aggregator
// state, so rows could be normalized in any order or in parallel chunks.
use crate::errors::PipelineError;
use crate::types::{Category, LoanRecord, QuarantineReason, RowOutcome};
use crate::util::{parse_date_safe, parse_f64_safe};
use chrono::NaiveDate;
use csv::StringRecord;
use once_cell::sync::Lazy;
use std::collections::HashSet;

const COL_AMOUNT: &str = "FACEVALUEOFDIRECTLOANORLOANGUARANTEE";
const COL_SUBSIDY: &str = "ORIGINALLOANSUBSIDYCOST";
const COL_STATE: &str = "LEGALENTITYSTATECD";
const COL_BUSINESS_TYPE: &str = "BUSINESSTYPES";
const COL_ACTION_DATE: &str = "ACTIONDATE";

/// The 56 recognized jurisdiction codes: 50 states plus DC and the island
/// territories (AS, GU, MP, PR, VI).
pub static VALID_JURISDICTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN",
        "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV",
        "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN",
        "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY", "DC", "AS", "GU", "MP", "PR", "VI",
    ]
    .into_iter()
    .collect()
});

/// The dataset's known-bad ACTIONDATE value. Recorded as-is and surfaced as
/// a quality note; never corrected.
pub static EPOCH_SENTINEL: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());

/// Column positions of the analysis fields, resolved once from the header.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    amount: usize,
    subsidy: usize,
    state: usize,
    business_type: usize,
    action_date: usize,
}

impl Schema {
    pub fn from_header(header: &StringRecord) -> Result<Schema, PipelineError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
        };
        Ok(Schema {
            amount: find(COL_AMOUNT)?,
            subsidy: find(COL_SUBSIDY)?,
            state: find(COL_STATE)?,
            business_type: find(COL_BUSINESS_TYPE)?,
            action_date: find(COL_ACTION_DATE)?,
        })
    }

    /// Coerce one raw row into a `LoanRecord`.
    ///
    /// - An unparseable amount quarantines the row.
    /// - A state code outside the jurisdiction set does NOT quarantine: the
    ///   record keeps `region: None`, stays in the global population, and is
    ///   excluded from regional buckets only.
    /// - Unrecognized business types pool into `Category::Other`.
    /// - The action date is never plausibility-checked.
    pub fn normalize(&self, row: &StringRecord) -> RowOutcome {
        let amount = match parse_f64_safe(row.get(self.amount)) {
            Some(v) => v,
            None => return RowOutcome::Quarantined(QuarantineReason::InvalidAmount),
        };
        let subsidy_cost = parse_f64_safe(row.get(self.subsidy));

        let state = row.get(self.state).unwrap_or("").trim().to_uppercase();
        let region = if VALID_JURISDICTIONS.contains(state.as_str()) {
            Some(state)
        } else {
            None
        };

        let category = Category::from_code(row.get(self.business_type).unwrap_or(""));
        let action_date = parse_date_safe(row.get(self.action_date));

        RowOutcome::Record(LoanRecord {
            amount,
            subsidy_cost,
            region,
            category,
            action_date,
        })
    }
}
