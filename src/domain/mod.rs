//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observed data (`Observation`, `TimeSeries`, `MarketSession`)
//! - simulation outputs (`PathMatrix`, `FanBand`, `FanBands`)
//! - model selection and run configuration (`ModelKind`, `ForecastConfig`, ...)

pub mod types;

pub use types::*;
