#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ple_sales::alias::AliasTable;
use rust_xlsxwriter::Workbook;

/// A cell written into a fixture sheet.
#[derive(Clone, Copy)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

pub use Cell::{Blank, Number as N, Text as T};

pub type Sheet = (&'static str, Vec<Vec<Cell>>);

pub fn build_workbook(sheets: &[Sheet]) -> Workbook {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("sheet name");
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (row_num, col_num) = (row_idx as u32, col_idx as u16);
                match cell {
                    Cell::Text(value) => {
                        worksheet
                            .write_string(row_num, col_num, *value)
                            .expect("string cell");
                    }
                    Cell::Number(value) => {
                        worksheet
                            .write_number(row_num, col_num, *value)
                            .expect("number cell");
                    }
                    Cell::Blank => {}
                }
            }
        }
    }
    workbook
}

pub fn write_workbook(dir: &Path, file_name: &str, sheets: &[Sheet]) -> PathBuf {
    let path = dir.join(file_name);
    build_workbook(sheets).save(&path).expect("fixture written");
    path
}

pub fn tractor_yearly() -> Sheet {
    (
        "Tractor Unit Sales",
        vec![
            vec![T("PLE Tractor Unit Sales")],
            vec![T("Region"), N(2022.0), N(2023.0)],
            vec![T("North America"), N(100.0), N(120.0)],
            vec![T("EMEA"), Blank, N(50.0)],
            vec![T(" ncsa "), N(5.0), T("n/a")],
        ],
    )
}

pub fn mower_yearly() -> Sheet {
    (
        "Mower Unit Sales",
        vec![
            vec![T("PLE Mower Unit Sales")],
            vec![T("Region"), T("2022"), T("2023"), T("Total")],
            vec![T("Eur"), N(10.0), N(20.0), N(30.0)],
            vec![T("World"), N(100.0), N(200.0), N(300.0)],
        ],
    )
}

pub fn mower_monthly() -> Sheet {
    (
        "Mower Unit Sales",
        vec![
            vec![T("PLE Mower Unit Sales by Month")],
            vec![T("Month"), T("SA"), T("Eur"), T("World")],
            vec![T("2019-01-01"), N(10.0), N(20.0), N(30.0)],
            vec![T("2019-02-01"), N(5.0), Blank, N(5.0)],
            vec![T("2020-01-01"), N(7.0), N(8.0), N(15.0)],
        ],
    )
}

pub fn tractor_monthly() -> Sheet {
    (
        "Tractor Unit Sales",
        vec![
            vec![T("PLE Tractor Unit Sales by Month")],
            vec![T("Month"), T("SA"), T("China")],
            vec![T("2019-01-01"), N(3.0), N(4.0)],
            vec![T("2020-01-01"), N(6.0), Blank],
        ],
    )
}

/// Aliases covering every label used by the yearly fixtures.
pub fn fixture_aliases() -> AliasTable {
    AliasTable::from_pairs([
        ("NCSA", "North America"),
        ("North America", "North America"),
        ("EMEA", "EMEA"),
        ("Eur", "Europe"),
        ("World", "World"),
    ])
    .expect("alias table")
}
