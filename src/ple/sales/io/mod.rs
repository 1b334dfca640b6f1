pub mod csv_write;
pub mod excel_read;
pub mod excel_write;
pub mod json_write;
