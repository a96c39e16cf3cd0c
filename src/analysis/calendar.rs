//! Active selling days: every day in the range except ordinary Sundays.
//! Dec 24 and Dec 31 stay even when they fall on a Sunday — the stores open
//! for Christmas and New Year's Eve trade.

use chrono::{Datelike, NaiveDate, Weekday};

/// Whether a day counts toward the selling calendar.
pub fn is_active_day(day: NaiveDate) -> bool {
    if day.weekday() != Weekday::Sun {
        return true;
    }
    day.month() == 12 && (day.day() == 24 || day.day() == 31)
}

/// Ordered active days in [start, end], inclusive. Empty when start > end.
pub fn active_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        if is_active_day(day) {
            days.push(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}
