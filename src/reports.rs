// Report collaborators: read-only renderers over the frozen summary model.
//
// None of these functions compute statistics. They format fields of the
// `SummaryModel`, so every artifact (CSV, JSON, console, text) agrees with
// every other by construction.
use crate::summary::{Diagnostics, SummaryModel};
use crate::types::{AmountBandRow, BusinessTypeRow, ExecutiveSummary, StateSummaryRow};
use crate::util::{format_int, format_number};

fn format_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format_number(v, 2),
        None => "-".to_string(),
    }
}

fn format_share(pct: f64) -> String {
    format!("{:.1}%", pct)
}

pub fn state_summary(model: &SummaryModel) -> Vec<StateSummaryRow> {
    model
        .region_buckets
        .iter()
        .map(|b| StateSummaryRow {
            state: b.key.clone(),
            loan_count: format_int(b.count),
            total_amount: format_number(b.total, 2),
            mean_amount: format_number(b.mean, 2),
            min_amount: format_opt(b.min),
            max_amount: format_opt(b.max),
            share_of_loans: format_share(b.share_of_valid),
        })
        .collect()
}

pub fn business_type_summary(model: &SummaryModel) -> Vec<BusinessTypeRow> {
    model
        .category_buckets
        .iter()
        .map(|b| BusinessTypeRow {
            business_type: b.key.clone(),
            loan_count: format_int(b.count),
            total_amount: format_number(b.total, 2),
            mean_amount: format_number(b.mean, 2),
            share_of_loans: format_share(b.share_of_valid),
        })
        .collect()
}

pub fn amount_band_summary(model: &SummaryModel) -> Vec<AmountBandRow> {
    model
        .amount_bands
        .iter()
        .map(|b| AmountBandRow {
            range: b.label.to_string(),
            loan_count: format_int(b.count),
            total_amount: format_number(b.total, 2),
            mean_amount: format_number(b.mean, 2),
            share_of_loans: format_share(b.share_of_valid),
        })
        .collect()
}

pub fn executive_summary(model: &SummaryModel) -> ExecutiveSummary {
    ExecutiveSummary {
        total_loans: model.valid_count,
        quarantined_rows: model.quarantined_count,
        total_amount: model.total_amount,
        total_subsidy: model.total_subsidy,
        mean_amount: model.mean_amount,
        median_amount: model.median_amount,
        min_amount: model.min_amount,
        max_amount: model.max_amount,
        states_represented: model.region_buckets.len(),
        top_state: model.region_buckets.first().map(|b| b.key.clone()),
        top_business_type: model.category_buckets.first().map(|b| b.key.clone()),
    }
}

/// Sectioned plain-text report, one artifact per run.
pub fn text_report(model: &SummaryModel, diagnostics: &Diagnostics) -> String {
    let mut lines: Vec<String> = Vec::new();
    let rule = "=".repeat(50);

    lines.push("EIDL LOANS ANALYSIS REPORT".to_string());
    lines.push(rule.clone());
    lines.push(String::new());

    lines.push("EXECUTIVE SUMMARY".to_string());
    lines.push("-".repeat(30));
    lines.push(format!(
        "Total Number of Loans: {}",
        format_int(model.valid_count)
    ));
    lines.push(format!(
        "Total Loan Amount: ${}",
        format_number(model.total_amount, 2)
    ));
    lines.push(format!(
        "Total Subsidy Cost: ${}",
        format_number(model.total_subsidy, 2)
    ));
    lines.push(format!(
        "Average Loan Amount: ${}",
        format_number(model.mean_amount, 2)
    ));
    lines.push(format!(
        "Median Loan Amount: ${}",
        format_number(model.median_amount, 2)
    ));
    lines.push(String::new());

    lines.push("GEOGRAPHIC INSIGHTS".to_string());
    lines.push("-".repeat(30));
    if let Some(top) = model.region_buckets.first() {
        lines.push(format!(
            "Jurisdiction with highest total amount: {} (${}, {} loans)",
            top.key,
            format_number(top.total, 2),
            format_int(top.count)
        ));
    }
    lines.push(format!(
        "Jurisdictions represented: {}",
        model.region_buckets.len()
    ));
    lines.push(String::new());

    lines.push("LOAN AMOUNT INSIGHTS".to_string());
    lines.push("-".repeat(30));
    for band in &model.amount_bands {
        lines.push(format!(
            "Loans {}: {} ({})",
            band.label,
            format_int(band.count),
            format_share(band.share_of_valid)
        ));
    }
    lines.push(String::new());

    lines.push("BUSINESS TYPE INSIGHTS".to_string());
    lines.push("-".repeat(30));
    for bucket in &model.category_buckets {
        lines.push(format!(
            "{}: {} loans, ${}",
            bucket.key,
            format_int(bucket.count),
            format_number(bucket.total, 2)
        ));
    }
    lines.push(String::new());

    // Data-quality issues are never hidden: every run lists its quarantine
    // counts and known dataset defects.
    lines.push("DATA QUALITY".to_string());
    lines.push("-".repeat(30));
    lines.push(format!(
        "Rows scanned: {} ({} valid, {} quarantined)",
        format_int(model.rows_scanned),
        format_int(model.valid_count),
        format_int(model.quarantined_count)
    ));
    for note in &model.quality_notes {
        lines.push(format!("Note: {}", note));
    }
    for (key, value) in diagnostics.as_pairs() {
        lines.push(format!("{} = {}", key, value));
    }
    lines.push(String::new());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::parser::ScanStats;
    use crate::types::{Category, LoanRecord, QuarantineReason};
    use std::time::Duration;

    fn sample_model() -> SummaryModel {
        let mut agg = Aggregator::new();
        for (amount, region, category) in [
            (10_000.0, Some("CA"), Category::Regular),
            (200_000.0, Some("NY"), Category::Partnership),
            (5_000.0, None, Category::Other),
        ] {
            agg.observe(LoanRecord {
                amount,
                subsidy_cost: Some(amount * 0.05),
                region: region.map(str::to_string),
                category,
                action_date: None,
            });
        }
        agg.quarantine(QuarantineReason::MalformedStructure);
        agg.finalize(&ScanStats {
            rows_seen: 4,
            malformed: 1,
            exhausted: true,
        })
        .unwrap()
    }

    fn sample_diagnostics() -> Diagnostics {
        Diagnostics {
            rows_seen: 4,
            valid_rows: 3,
            quarantined_malformed: 1,
            quarantined_invalid_amount: 0,
            unknown_region_rows: 1,
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_rows_mirror_buckets_one_to_one() {
        let model = sample_model();
        assert_eq!(state_summary(&model).len(), model.region_buckets.len());
        assert_eq!(
            business_type_summary(&model).len(),
            model.category_buckets.len()
        );
        assert_eq!(amount_band_summary(&model).len(), 4);

        let top = &state_summary(&model)[0];
        assert_eq!(top.state, "NY");
        assert_eq!(top.total_amount, "200,000.00");
    }

    #[test]
    fn test_executive_summary_headlines() {
        let model = sample_model();
        let exec = executive_summary(&model);
        assert_eq!(exec.total_loans, 3);
        assert_eq!(exec.quarantined_rows, 1);
        assert_eq!(exec.top_state.as_deref(), Some("NY"));
        assert_eq!(exec.states_represented, 2);
    }

    #[test]
    fn test_text_report_carries_data_quality_section() {
        let model = sample_model();
        let text = text_report(&model, &sample_diagnostics());
        assert!(text.contains("DATA QUALITY"));
        assert!(text.contains("1 quarantined"));
        assert!(text.contains("rows_seen = 4"));
        assert!(text.contains("Loans <$50,000"));
    }
}
