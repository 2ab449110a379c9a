//! Pure lease-timing functions, per §4.3. No state, no I/O — these are the
//! functions P2 (freshness) and the "over-long timeout" / "stale timestamp"
//! scenarios in §8 are checked against directly.

/// `locked_time + max_timeout` — the absolute ceiling a lease may not cross,
/// regardless of what timeout the client requested.
#[must_use]
pub fn max_expiration(locked_time_ms: i64, max_timeout_ms: i64) -> i64 {
    locked_time_ms + max_timeout_ms
}

/// Why a requested expiration could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    /// `requested_timeout_ms > max_timeout_ms`.
    ExceedsMaxTimeout,
    /// The computed expiration already lies in the past relative to `now_ms`
    /// — the caller's `locked_time` anchor was too stale.
    AlreadyExpired,
}

/// Compute the expiration instant for a new lease.
///
/// 1. `requested_timeout_ms == 0` substitutes `default_timeout_ms`.
/// 2. `requested_timeout_ms > max_timeout_ms` is rejected.
/// 3. `locked_time_ms + requested_timeout_ms` must not already be in the
///    past relative to `now_ms` — a lease cannot be born expired.
///
/// # Errors
///
/// Returns [`PolicyViolation`] for either rejection above.
pub fn compute_expiration(
    locked_time_ms: i64,
    default_timeout_ms: i64,
    max_timeout_ms: i64,
    requested_timeout_ms: i64,
    now_ms: i64,
) -> Result<i64, PolicyViolation> {
    let timeout_ms = if requested_timeout_ms == 0 { default_timeout_ms } else { requested_timeout_ms };

    if timeout_ms > max_timeout_ms {
        return Err(PolicyViolation::ExceedsMaxTimeout);
    }

    let expiration_ms = locked_time_ms + timeout_ms;
    if now_ms > expiration_ms {
        return Err(PolicyViolation::AlreadyExpired);
    }

    Ok(expiration_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_substitutes_default() {
        let exp = compute_expiration(1_000, 30_000, 60_000, 0, 1_000).unwrap();
        assert_eq!(exp, 31_000);
    }

    #[test]
    fn over_long_timeout_is_rejected() {
        let err = compute_expiration(1_000, 30_000, 60_000, 90_000, 1_000).unwrap_err();
        assert_eq!(err, PolicyViolation::ExceedsMaxTimeout);
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let now = 1_000_001_000_i64;
        let err = compute_expiration(now - 1_000_000_000, 30_000, 60_000, 1_000, now).unwrap_err();
        assert_eq!(err, PolicyViolation::AlreadyExpired);
    }

    #[test]
    fn max_expiration_is_locked_time_plus_max_timeout() {
        assert_eq!(max_expiration(1_000, 60_000), 61_000);
    }

    #[test]
    fn requested_timeout_exactly_at_ceiling_is_allowed() {
        let exp = compute_expiration(1_000, 30_000, 60_000, 60_000, 1_000).unwrap();
        assert_eq!(exp, 61_000);
    }

    #[test]
    fn expiration_exactly_now_is_allowed_not_already_expired() {
        // now_ms > exp triggers rejection; now_ms == exp must be allowed.
        let exp = compute_expiration(0, 30_000, 60_000, 1_000, 1_000).unwrap();
        assert_eq!(exp, 1_000);
    }
}
