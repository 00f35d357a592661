use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook};

use crate::error::Result;
use crate::sheet::WorkbookData;

const MIN_COLUMN_WIDTH: f64 = 12.0;
const MAX_COLUMN_WIDTH: f64 = 80.0;

/// Writes the provided workbook data to the given path, replacing any
/// existing file.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }

        for (col_idx, header) in table.columns.iter().enumerate() {
            let widest = table
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or_default();
            let width = (widest as f64 + 2.0).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
            worksheet.set_column_width(col_idx as u16, width)?;
        }

        let columns: Vec<TableColumn> = table
            .columns
            .iter()
            .map(|header| TableColumn::new().set_header(header))
            .collect();
        let mut excel_table = Table::new();
        excel_table.set_autofilter(true).set_columns(&columns);

        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = if table.rows.is_empty() {
            1
        } else {
            table.rows.len() as u32
        };
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}
