// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a UTC timestamp for storage.
///
/// Always six fractional digits and a `Z` suffix, so stored values compare
/// lexically in chronological order.
pub fn format_db_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to the precision kept in the database.
pub fn now_db() -> DateTime<Utc> {
    let now = Utc::now();
    let micros = now.timestamp_micros();
    DateTime::from_timestamp_micros(micros).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_timestamp_is_fixed_width() {
        let whole = DateTime::from_timestamp(1_704_103_200, 0).unwrap();
        let fractional = DateTime::from_timestamp(1_704_103_200, 500_000_000).unwrap();

        let a = format_db_timestamp(whole);
        let b = format_db_timestamp(fractional);

        assert_eq!(a, "2024-01-01T10:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_now_db_has_no_sub_micro_precision() {
        let now = now_db();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000, 0);
    }
}
