//! Stochastic price models.
//!
//! Both models implement the same fit-then-sample capability
//! (`ForecastModel`) so the pipeline can stay generic:
//!
//! - `RandomWalkModel`: geometric random walk on simple returns
//! - `MeanRevertingModel`: AR(1) on log-normalized levels with linear drift
//!
//! Random draws go through a `ShockSource`, which lets callers seed the
//! generator or substitute a deterministic source.

pub mod mean_reverting;
pub mod model;
pub mod random_walk;
pub mod shock;
pub mod simulate;

pub use mean_reverting::*;
pub use model::*;
pub use random_walk::*;
pub use shock::*;
pub use simulate::*;
