//! Calendar helpers for month-stepped schedules.

use chrono::{Datelike, NaiveDate};

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_next.pred_opt().map(|last| last.day())
}

/// Moves `anchor` forward by `months` calendar months and lands on `day`, clamped
/// to the length of the target month. The offset is always taken from `anchor`,
/// so a short month never drags later dates backwards.
pub fn month_offset_on_day(anchor: NaiveDate, months: u32, day: u32) -> Option<NaiveDate> {
    let start = anchor.year().checked_mul(12)? + anchor.month0() as i32;
    let index = start.checked_add(i32::try_from(months).ok()?)?;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let clamped = day.min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn offset_clamps_without_drift() {
        let anchor = date(2024, 1, 31);
        assert_eq!(month_offset_on_day(anchor, 1, 31), Some(date(2024, 2, 29)));
        assert_eq!(month_offset_on_day(anchor, 2, 31), Some(date(2024, 3, 31)));
        assert_eq!(month_offset_on_day(anchor, 3, 31), Some(date(2024, 4, 30)));
    }

    #[test]
    fn offset_forces_day_and_crosses_years() {
        let anchor = date(2024, 11, 3);
        assert_eq!(month_offset_on_day(anchor, 0, 15), Some(date(2024, 11, 15)));
        assert_eq!(month_offset_on_day(anchor, 2, 15), Some(date(2025, 1, 15)));
        assert_eq!(month_offset_on_day(anchor, 24, 3), Some(date(2026, 11, 3)));
    }
}
