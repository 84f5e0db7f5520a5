//! Seeded, optionally parallel path simulation.
//!
//! Each simulation row owns an independent `StdRng` stream derived from the
//! run seed and the row index. Rows never share a generator, so the result is
//! identical whether rows run sequentially or on the rayon pool.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::PathMatrix;
use crate::error::ForecastError;
use crate::models::model::{ForecastModel, validate_sample_args};
use crate::models::shock::RngShocks;

/// Seed offset between consecutive simulation rows.
const ROW_SEED_STRIDE: u64 = 7_919;

fn row_seed(seed: u64, row: usize) -> u64 {
    seed.wrapping_add((row as u64).wrapping_mul(ROW_SEED_STRIDE))
}

/// Sample `(num_simulations, num_days)` paths with one seeded stream per row.
pub fn simulate(
    model: &dyn ForecastModel,
    num_days: usize,
    num_simulations: usize,
    seed: u64,
    parallel: bool,
) -> Result<PathMatrix, ForecastError> {
    let len = validate_sample_args(num_days, num_simulations)?;
    if !model.is_fitted() {
        return Err(ForecastError::ModelNotFitted);
    }

    let run_row = |(i, row): (usize, &mut [f64])| -> Result<(), ForecastError> {
        let mut shocks = RngShocks::new(StdRng::seed_from_u64(row_seed(seed, i)));
        model.simulate_path(&mut shocks, row)
    };

    let mut data = vec![0.0; len];
    if parallel {
        data.par_chunks_mut(num_days)
            .enumerate()
            .try_for_each(&run_row)?;
    } else {
        data.chunks_mut(num_days)
            .enumerate()
            .try_for_each(&run_row)?;
    }

    debug!(num_days, num_simulations, seed, parallel, model = ?model.kind(), "simulated paths");
    PathMatrix::new(num_simulations, num_days, data)
}
