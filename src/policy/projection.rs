// 📈 Month-End Projection - linear extrapolation of month-to-date spend

use crate::expense::YearMonth;
use crate::money::Money;
use chrono::{Datelike, NaiveDate};

/// `(spent / day) * days_in_month`, to the nearest cent.
///
/// `day` is today's day-of-month when `month` is the current month; any other
/// month (past or future) counts as fully elapsed, so its projection is the
/// amount already spent.
pub fn project_month_end(spent: Money, month: YearMonth, today: NaiveDate) -> Money {
    let days_in_month = month.days_in_month() as i128;
    let day = if month.contains(today) {
        today.day() as i128
    } else {
        days_in_month
    };

    if day == 0 {
        return spent;
    }

    let scaled = spent.cents() as i128 * days_in_month;
    // round half away from zero
    let half = day / 2;
    let cents = if scaled >= 0 {
        (scaled + half) / day
    } else {
        (scaled - half) / day
    };
    // saturate at the Money range rather than truncate
    let cents = i64::try_from(cents).unwrap_or(if cents < 0 { i64::MIN } else { i64::MAX });
    Money::from_cents(cents)
}
