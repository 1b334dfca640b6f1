use std::io::Write;
use std::path::Path;

use crate::ple::sales::error::Result;
use crate::ple::sales::report::SheetTable;

/// Writes a single table as CSV with a header row.
pub fn write_table(path: &Path, table: &SheetTable) -> Result<()> {
    let writer = csv::Writer::from_path(path)?;
    write_table_to(writer, table)
}

/// Writes a single table as CSV into any writer.
pub fn write_table_to<W: Write>(mut writer: csv::Writer<W>, table: &SheetTable) -> Result<()> {
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
