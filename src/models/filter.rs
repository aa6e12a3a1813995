//! Filter sentinel helpers
//!
//! The month, year and yearly-transactions filters are plain integers where
//! `-1` means "no filter applied". Any other value, in range or not, is taken
//! literally.

/// Sentinel meaning "no filter applied"
pub const UNSET: i32 = -1;

pub fn is_unset(value: i32) -> bool {
    value == UNSET
}

/// The filter value, or `None` when no filter is applied
pub fn selection(value: i32) -> Option<i32> {
    if is_unset(value) {
        None
    } else {
        Some(value)
    }
}

/// Whether a month filter admits `month` (1-12)
pub fn month_admits(filter: i32, month: u32) -> bool {
    selection(filter).map_or(true, |wanted| i64::from(wanted) == i64::from(month))
}

/// Whether a year filter admits `year`
pub fn year_admits(filter: i32, year: i32) -> bool {
    selection(filter).map_or(true, |wanted| wanted == year)
}
