use crate::model::{AwardTable, RiskGroupedFindings};

/// Column headers of every risk sheet.
pub const COLUMNS: [&str; 3] = ["Name", "Reward", "Issue URL"];

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Represents all tables required to materialise the Excel workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// Lays out one sheet per non-empty risk category, in display order.
///
/// Consecutive rows by the same author only print the name and reward on the
/// first of them; the issue URL is always filled in.
pub fn build_workbook(grouped: &RiskGroupedFindings, awards: &AwardTable) -> WorkbookData {
    let tables = grouped
        .iter()
        .map(|(risk, records)| {
            let mut rows = Vec::with_capacity(records.len());
            let mut previous: Option<&str> = None;
            for record in records {
                let repeated = previous == Some(record.handle.as_str());
                let (name, reward) = if repeated {
                    (String::new(), String::new())
                } else {
                    (
                        record.handle.clone(),
                        format_award(awards.award(&record.handle)),
                    )
                };
                rows.push(vec![name, reward, record.issue_url.clone()]);
                previous = Some(record.handle.as_str());
            }

            SheetTable {
                sheet_name: risk.label().to_string(),
                columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows,
            }
        })
        .collect();

    WorkbookData { tables }
}

/// Renders an award the way the leaderboard shows it: no trailing `.0` on
/// whole amounts.
pub fn format_award(award: f64) -> String {
    format!("{award}")
}
