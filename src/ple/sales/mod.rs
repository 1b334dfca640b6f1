pub mod aggregate;
pub mod alias;
pub mod error;
pub mod export;
pub mod filter;
pub mod io;
pub mod kpi;
pub mod model;
pub mod report;
pub mod session;

pub use error::{LoadError, Result, SalesError};
