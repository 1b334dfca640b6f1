use std::path::Path;

use rust_xlsxwriter::{Format, Table, Workbook, Worksheet};

use crate::ple::sales::error::Result;
use crate::ple::sales::report::{ReportCell, SheetTable, WorkbookData};

/// Writes every table of the report to the given path, one sheet per table.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let units_format = Format::new().set_num_format("#,##0.##");

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;
        write_table(worksheet, table, &units_format)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &SheetTable, units_format: &Format) -> Result<()> {
    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = col_idx as u16;
            match cell {
                ReportCell::Text(value) => {
                    worksheet.write_string(row_num, col_num, value)?;
                }
                ReportCell::Number(value) => {
                    worksheet.write_number_with_format(row_num, col_num, *value, units_format)?;
                }
                ReportCell::Empty => {}
            }
        }
    }

    if table.columns.is_empty() {
        return Ok(());
    }

    let mut excel_table = Table::new();
    excel_table.set_autofilter(true);
    let col_end = (table.columns.len() as u16).saturating_sub(1);
    let row_end = if table.rows.is_empty() {
        1
    } else {
        table.rows.len() as u32
    };
    worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    Ok(())
}
