//! Series preparation.
//!
//! - business-day calendar helpers (`calendar`)
//! - gap filling, split adjustment and currency conversion (`preprocess`)

pub mod calendar;
pub mod preprocess;

pub use calendar::*;
pub use preprocess::*;
