//! Reporting utilities: band checkpoints and formatted terminal output.

pub mod format;

pub use format::*;

/// Forecast days (0-based) worth tabulating: first, quartiles and last.
pub fn checkpoint_days(num_days: usize) -> Vec<usize> {
    if num_days == 0 {
        return Vec::new();
    }
    let last = num_days - 1;
    let mut days: Vec<usize> = [0, last / 4, last / 2, (3 * last) / 4, last].to_vec();
    days.dedup();
    days
}
