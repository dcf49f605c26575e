//! The lazy billing-period roll for quota counters.
//!
//! Counters are never reset by a scheduled job. Instead, every quota check applies [`roll_if_new_period`] to the
//! stored counters inside the same transaction that performs the increment, so a roll can never race with a
//! reservation or happen twice.

use chrono::{DateTime, Datelike, Utc};

use crate::db_types::QuotaCounters;

/// Two instants fall in the same billing period when they share a calendar month (and year).
pub fn same_billing_period(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Returns the counters as they should read at `now`: unchanged if `now` is still in the stored period, zeroed with
/// `last_reset = now` otherwise. Pure; the caller decides whether to persist the result.
pub fn roll_if_new_period(counters: QuotaCounters, now: DateTime<Utc>) -> QuotaCounters {
    if same_billing_period(counters.last_reset, now) {
        counters
    } else {
        QuotaCounters { loads_posted: 0, bids_placed: 0, last_reset: now }
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn counters(loads: i64, bids: i64, last_reset: DateTime<Utc>) -> QuotaCounters {
        QuotaCounters { loads_posted: loads, bids_placed: bids, last_reset }
    }

    #[test]
    fn same_month_is_a_noop() {
        let c = counters(1, 3, at(2024, 6, 1));
        assert_eq!(roll_if_new_period(c, at(2024, 6, 30)), c);
    }

    #[test]
    fn new_month_zeroes_counters() {
        let c = counters(1, 3, at(2024, 6, 30));
        let now = at(2024, 7, 1);
        let rolled = roll_if_new_period(c, now);
        assert_eq!(rolled, counters(0, 0, now));
    }

    #[test]
    fn year_boundary_rolls() {
        let c = counters(5, 2, at(2024, 12, 31));
        let now = at(2025, 1, 1);
        assert_eq!(roll_if_new_period(c, now), counters(0, 0, now));
    }

    #[test]
    fn same_month_of_different_year_rolls() {
        // June 2023 vs June 2024 is a different period even though the month number matches
        let c = counters(1, 1, at(2023, 6, 15));
        let now = at(2024, 6, 15);
        assert_eq!(roll_if_new_period(c, now), counters(0, 0, now));
    }

    #[test]
    fn roll_is_idempotent() {
        let now = at(2024, 8, 2);
        let once = roll_if_new_period(counters(1, 3, at(2024, 7, 31)), now);
        let twice = roll_if_new_period(once, now);
        assert_eq!(once, twice);
    }
}
