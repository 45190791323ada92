// Artifact writers and console previews.
//
// Renderers hand these functions already-formatted rows; nothing here
// computes or rounds a statistic.
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<P, T>(path: P, rows: &[T]) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<P, T>(path: P, value: &T) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
    T: Serialize,
{
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn write_text<P: AsRef<Path>>(path: P, text: &str) -> Result<(), Box<dyn Error>> {
    fs::write(path, text)?;
    Ok(())
}

/// Markdown table of at most `max_rows` rows; `None` when there is nothing
/// to show.
fn render_markdown<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return None;
    }
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_markdown(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Serialize, Tabled)]
    struct Row {
        #[serde(rename = "State")]
        #[tabled(rename = "State")]
        state: String,
        #[serde(rename = "LoanCount")]
        #[tabled(rename = "LoanCount")]
        loan_count: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                state: "CA".to_string(),
                loan_count: "2".to_string(),
            },
            Row {
                state: "NY".to_string(),
                loan_count: "1".to_string(),
            },
        ]
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("eidl_output_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_render_markdown_truncates_and_handles_empty() {
        let table = render_markdown(&rows(), 1).unwrap();
        assert!(table.contains("State"));
        assert!(table.contains("CA"));
        assert!(!table.contains("NY"));
        assert_eq!(render_markdown::<Row>(&[], 5), None);
    }

    #[test]
    fn test_write_csv_serializes_renamed_headers() {
        let path = temp_path("rows.csv");
        write_csv(&path, &rows()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("State,LoanCount"));
        assert!(content.contains("NY,1"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_write_json_is_pretty_printed() {
        let path = temp_path("value.json");
        write_json(&path, &rows()[0]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"State\": \"CA\""));
        fs::remove_file(path).ok();
    }
}
