// Entry point and high-level CLI flow.
//
// The binary runs the ingestion pipeline once over the EIDL loans dataset
// and hands the frozen summary to each report renderer:
// - three CSV breakdowns (state, business type, amount band),
// - a JSON executive summary,
// - a sectioned plain-text report,
// with markdown previews printed to the console along the way.
mod aggregate;
mod errors;
mod normalize;
mod output;
mod parser;
mod pipeline;
mod reports;
mod summary;
mod types;
mod util;

use std::env;
use std::error::Error;
use util::format_int;

const DEFAULT_DATASET: &str = "DATAACT_EIDL_LOANS_20200401-20200609.csv";

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATASET.to_string());
    if let Err(e) = run(&path) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(path: &str) -> Result<(), Box<dyn Error>> {
    println!("Loading EIDL loans dataset: {}\n", path);
    let outcome = pipeline::run_file(path)?;
    let model = &outcome.summary;

    println!(
        "Processing dataset... ({} rows scanned, {} valid loan records)",
        format_int(model.rows_scanned),
        format_int(model.valid_count)
    );
    println!(
        "Note: {} rows quarantined ({} malformed structure, {} invalid amount).",
        format_int(model.quarantined_count),
        format_int(model.malformed_rows),
        format_int(model.invalid_amount_rows)
    );
    for (key, value) in outcome.diagnostics.as_pairs() {
        println!("  {} = {}", key, value);
    }
    println!("");

    let r1 = reports::state_summary(model);
    let file1 = "report1_state_summary.csv";
    output::write_csv(file1, &r1)?;
    println!("Report 1: Loan Distribution by State/Jurisdiction\n");
    output::preview_table_rows(&r1, 5);
    println!("(Full table exported to {})\n", file1);

    let r2 = reports::business_type_summary(model);
    let file2 = "report2_business_type_summary.csv";
    output::write_csv(file2, &r2)?;
    println!("Report 2: Loan Distribution by Business Type\n");
    output::preview_table_rows(&r2, 5);
    println!("(Full table exported to {})\n", file2);

    let r3 = reports::amount_band_summary(model);
    let file3 = "report3_amount_bands.csv";
    output::write_csv(file3, &r3)?;
    println!("Report 3: Loan Amount Distribution\n");
    output::preview_table_rows(&r3, 4);
    println!("(Full table exported to {})\n", file3);

    let exec = reports::executive_summary(model);
    output::write_json("summary.json", &exec)?;
    println!("Summary stats exported to summary.json");

    let text = reports::text_report(model, &outcome.diagnostics);
    output::write_text("eidl_analysis_report.txt", &text)?;
    println!("Full report exported to eidl_analysis_report.txt");

    if !model.quality_notes.is_empty() {
        println!("\nData quality notes:");
        for note in &model.quality_notes {
            println!("- {}", note);
        }
    }
    Ok(())
}
