use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

/// One loan that passed normalization. Immutable once built; the aggregator
/// only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRecord {
    /// Face value of the loan. Signed: a negative value is a downstream
    /// correction/adjustment record, not bad data.
    pub amount: f64,
    /// Original loan subsidy cost. Absent is valid; treated as zero when
    /// summing, excluded from per-record subsidy ratios.
    pub subsidy_cost: Option<f64>,
    /// Uppercased state/jurisdiction code, `Some` only when the code is a
    /// member of the recognized 56-jurisdiction set. `None` rows stay in the
    /// global population but are excluded from regional buckets.
    pub region: Option<String>,
    pub category: Category,
    /// Action date as recorded in the source. The dataset carries a known
    /// epoch sentinel (1970-01-01) in this field; it is passed through
    /// untouched and reported as a quality note, never repaired.
    pub action_date: Option<NaiveDate>,
}

/// Why a row was set aside instead of joining the statistical population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineReason {
    /// Field count after quote-aware splitting differs from the header's.
    MalformedStructure,
    /// The amount field is empty or not a number.
    InvalidAmount,
}

/// Result of normalizing one raw row. Quarantine is data, not control flow:
/// the aggregator's bookkeeping consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Record(LoanRecord),
    Quarantined(QuarantineReason),
}

/// Business-type category. The source uses a small fixed vocabulary; any
/// code outside it pools into `Other` so categorical coverage stays
/// lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Regular,
    Proprietorship,
    MinorityOwned,
    Partnership,
    Other,
}

impl Category {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "REGULAR" => Category::Regular,
            "PROPRIETORSHIP" | "SOLE-PROPRIETORSHIP" | "SOLE PROPRIETORSHIP" => {
                Category::Proprietorship
            }
            "MINORITY-OWNED" | "MINORITY OWNED" => Category::MinorityOwned,
            "PARTNERSHIP" => Category::Partnership,
            _ => Category::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Regular => "regular",
            Category::Proprietorship => "proprietorship",
            Category::MinorityOwned => "minority-owned",
            Category::Partnership => "partnership",
            Category::Other => "other",
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StateSummaryRow {
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub state: String,
    #[serde(rename = "LoanCount")]
    #[tabled(rename = "LoanCount")]
    pub loan_count: String,
    #[serde(rename = "TotalAmount")]
    #[tabled(rename = "TotalAmount")]
    pub total_amount: String,
    #[serde(rename = "MeanAmount")]
    #[tabled(rename = "MeanAmount")]
    pub mean_amount: String,
    #[serde(rename = "MinAmount")]
    #[tabled(rename = "MinAmount")]
    pub min_amount: String,
    #[serde(rename = "MaxAmount")]
    #[tabled(rename = "MaxAmount")]
    pub max_amount: String,
    #[serde(rename = "ShareOfLoans")]
    #[tabled(rename = "ShareOfLoans")]
    pub share_of_loans: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BusinessTypeRow {
    #[serde(rename = "BusinessType")]
    #[tabled(rename = "BusinessType")]
    pub business_type: String,
    #[serde(rename = "LoanCount")]
    #[tabled(rename = "LoanCount")]
    pub loan_count: String,
    #[serde(rename = "TotalAmount")]
    #[tabled(rename = "TotalAmount")]
    pub total_amount: String,
    #[serde(rename = "MeanAmount")]
    #[tabled(rename = "MeanAmount")]
    pub mean_amount: String,
    #[serde(rename = "ShareOfLoans")]
    #[tabled(rename = "ShareOfLoans")]
    pub share_of_loans: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AmountBandRow {
    #[serde(rename = "Range")]
    #[tabled(rename = "Range")]
    pub range: String,
    #[serde(rename = "LoanCount")]
    #[tabled(rename = "LoanCount")]
    pub loan_count: String,
    #[serde(rename = "TotalAmount")]
    #[tabled(rename = "TotalAmount")]
    pub total_amount: String,
    #[serde(rename = "MeanAmount")]
    #[tabled(rename = "MeanAmount")]
    pub mean_amount: String,
    #[serde(rename = "ShareOfLoans")]
    #[tabled(rename = "ShareOfLoans")]
    pub share_of_loans: String,
}

/// Headline statistics exported as `summary.json`.
#[derive(Debug, Serialize)]
pub struct ExecutiveSummary {
    pub total_loans: u64,
    pub quarantined_rows: u64,
    pub total_amount: f64,
    pub total_subsidy: f64,
    pub mean_amount: f64,
    pub median_amount: f64,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub states_represented: usize,
    pub top_state: Option<String>,
    pub top_business_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping_pools_unrecognized_codes() {
        assert_eq!(Category::from_code("REGULAR"), Category::Regular);
        assert_eq!(Category::from_code("regular"), Category::Regular);
        assert_eq!(Category::from_code(" Partnership "), Category::Partnership);
        assert_eq!(
            Category::from_code("SOLE-PROPRIETORSHIP"),
            Category::Proprietorship
        );
        assert_eq!(Category::from_code("MINORITY OWNED"), Category::MinorityOwned);
        // Anything else is preserved as a member of the "other" bucket.
        assert_eq!(Category::from_code("LLC"), Category::Other);
        assert_eq!(Category::from_code(""), Category::Other);
    }
}
