//! `probwave` library crate.
//!
//! Fits simple stochastic price models (a geometric random walk and a
//! mean-reverting AR(1) on log prices) to a cleaned daily series, simulates
//! future paths and summarizes them as fan chart quantile bands.
//!
//! The binary (`probwave`) is a thin wrapper around this library so the
//! whole pipeline can be driven and tested in-process.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fan;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
