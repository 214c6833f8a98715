//! Quota and expiration policy.
//!
//! Pure functions over a single [`Account`]; safe to call from any number of
//! threads over a shared snapshot.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta};

use crate::account::Account;

/// Why an account is or isn't blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Already blocked; nothing to do.
    AlreadyBlocked,
    /// Quota or expiration disabled, or no usable creation date.
    Unmanaged,
    /// Within quota and not expired.
    Active,
    /// Combined usage reached the quota.
    QuotaExceeded { used: u64, limit: u64 },
    /// The expiration instant has passed.
    Expired { expired_at: NaiveDateTime },
}

impl Verdict {
    #[inline]
    pub fn should_block(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. } | Self::Expired { .. })
    }
}

/// Decide whether `account` must be blocked at `now`.
pub fn evaluate(account: &Account, now: NaiveDateTime) -> bool {
    verdict(account, now).should_block()
}

/// Like [`evaluate`], but says why.
pub fn verdict(account: &Account, now: NaiveDateTime) -> Verdict {
    if account.blocked {
        return Verdict::AlreadyBlocked;
    }
    if account.max_download_bytes <= 0 || account.expiration_days <= 0 {
        return Verdict::Unmanaged;
    }
    let Some(created) = account
        .account_creation_date
        .as_deref()
        .and_then(parse_creation_date)
    else {
        return Verdict::Unmanaged;
    };

    let limit = account.max_download_bytes.unsigned_abs();
    let used = account.used_bytes();
    if used >= limit {
        return Verdict::QuotaExceeded { used, limit };
    }

    // An expiry beyond the calendar range never arrives.
    let expires_at = TimeDelta::try_days(account.expiration_days)
        .and_then(|days| created.checked_add_signed(days));
    match expires_at {
        Some(expired_at) if now >= expired_at => Verdict::Expired { expired_at },
        _ => Verdict::Active,
    }
}

/// Parse a creation date as written by the panel.
///
/// Accepts `YYYY-MM-DD` (midnight), a naive ISO-8601 date-time, or RFC 3339
/// with an offset (converted to local time). Anything else is `None`.
pub fn parse_creation_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str) -> NaiveDateTime {
        parse_creation_date(date).unwrap()
    }

    fn managed(limit: i64, days: i64, created: &str) -> Account {
        Account {
            max_download_bytes: limit,
            expiration_days: days,
            account_creation_date: Some(created.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn expires_after_configured_days() {
        let acc = managed(1 << 30, 10, "2024-01-01");
        assert!(evaluate(&acc, at("2024-01-12")));
        assert!(!evaluate(&acc, at("2024-01-09")));
        // Boundary: exactly creation + 10 days.
        assert!(evaluate(&acc, at("2024-01-11")));
        assert!(matches!(
            verdict(&acc, at("2024-01-12")),
            Verdict::Expired { .. }
        ));
    }

    #[test]
    fn quota_counts_upload_and_download() {
        let mut acc = managed(1000, 30, "2024-01-01");
        acc.upload_bytes = 400;
        acc.download_bytes = 400;
        let now = at("2024-01-02");
        assert!(!evaluate(&acc, now));

        acc.upload_bytes += 201;
        assert!(evaluate(&acc, now));
        assert_eq!(
            verdict(&acc, now),
            Verdict::QuotaExceeded {
                used: 1001,
                limit: 1000
            }
        );

        acc.upload_bytes = 600;
        assert!(evaluate(&acc, now), "reaching the quota exactly blocks");
    }

    #[test]
    fn disabled_quota_or_expiry_is_never_blocked() {
        let far_future = at("2999-01-01");
        for (limit, days) in [(0, 10), (1000, 0), (-1, 10), (1000, -5), (0, 0)] {
            let mut acc = managed(limit, days, "2000-01-01");
            acc.upload_bytes = u64::MAX;
            assert!(!evaluate(&acc, far_future), "limit={limit} days={days}");
            assert_eq!(verdict(&acc, far_future), Verdict::Unmanaged);
        }
    }

    #[test]
    fn blocked_accounts_are_skipped() {
        let mut acc = managed(1, 1, "2000-01-01");
        acc.download_bytes = 10;
        acc.blocked = true;
        assert!(!evaluate(&acc, at("2999-01-01")));
        assert_eq!(verdict(&acc, at("2999-01-01")), Verdict::AlreadyBlocked);
    }

    #[test]
    fn missing_or_garbage_creation_date_is_unmanaged() {
        let mut acc = managed(1, 1, "not a date");
        acc.download_bytes = 10;
        assert!(!evaluate(&acc, at("2999-01-01")));

        acc.account_creation_date = None;
        assert!(!evaluate(&acc, at("2999-01-01")));
    }

    #[test]
    fn creation_date_formats() {
        assert_eq!(
            parse_creation_date("2024-03-05"),
            NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(
            parse_creation_date("2024-03-05T10:20:30"),
            NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(10, 20, 30))
        );
        assert!(parse_creation_date("2024-03-05T10:20:30Z").is_some());
        assert!(parse_creation_date("05/03/2024").is_none());
        assert!(parse_creation_date("").is_none());
    }

    #[test]
    fn huge_expiration_never_expires() {
        let acc = managed(1000, i64::MAX, "2024-01-01");
        assert_eq!(verdict(&acc, at("2999-01-01")), Verdict::Active);
    }
}
