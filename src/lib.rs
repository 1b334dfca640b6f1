//! Core library for the ple-sales command line application.
//!
//! The library loads the PLE tractor and mower unit-sales workbook and derives
//! the figures shown on the sales dashboard. Responsibilities are kept narrow
//! and composable: workbook adapters live under [`ple::sales::io`], the data
//! representations inside [`ple::sales::model`], region normalisation in
//! [`ple::sales::alias`], record selection in [`ple::sales::filter`], the
//! grouping and year-over-year logic in [`ple::sales::aggregate`], and the
//! load/view/export orchestration under [`ple::sales::session`] and
//! [`ple::sales::export`].

pub mod ple;

pub use ple::sales::{
    LoadError, Result, SalesError, aggregate, alias, error, export, filter, io, kpi, model,
    report, session,
};
