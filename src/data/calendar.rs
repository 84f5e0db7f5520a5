//! Business-day calendar (Monday to Friday, no holidays).

use chrono::{Datelike, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `n` business days strictly after `anchor`.
///
/// These label the columns of a path matrix sampled from that anchor.
pub fn business_days_after(anchor: NaiveDate, n: usize) -> Vec<NaiveDate> {
    anchor
        .iter_days()
        .skip(1)
        .filter(|d| is_business_day(*d))
        .take(n)
        .collect()
}
