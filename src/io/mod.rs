//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - band and series exports (CSV) (`export`)
//! - forecast JSON read/write (`forecast`)

pub mod export;
pub mod forecast;
pub mod ingest;

pub use export::*;
pub use forecast::*;
pub use ingest::*;
