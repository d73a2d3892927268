//! Replay window enforcement.
//!
//! The check is one-sided: a request passes when
//! `arrival - declared <= ttl`. Timestamps declared in the future always pass.

use chrono::Utc;

/// TTL applied when a gate is configured with zero.
pub const DEFAULT_TTL_MILLIS: i64 = 800;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Whether a request declared at `declared_millis` is still fresh.
///
/// Saturating arithmetic keeps absurd timestamps from wrapping around into
/// the accepted range.
pub fn validate(arrival_millis: i64, declared_millis: i64, ttl_millis: i64) -> bool {
    arrival_millis.saturating_sub(declared_millis) <= ttl_millis
}

/// TTL plus the arrival time captured once when the request entered the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityWindow {
    ttl_millis: i64,
    arrival_millis: i64,
}

impl SecurityWindow {
    pub fn open(ttl_millis: i64, arrival_millis: i64) -> Self {
        Self {
            ttl_millis,
            arrival_millis,
        }
    }

    pub fn ttl_millis(&self) -> i64 {
        self.ttl_millis
    }

    pub fn arrival_millis(&self) -> i64 {
        self.arrival_millis
    }

    /// Age of a request declared at `declared_millis`. Negative when declared
    /// in the future.
    pub fn elapsed_millis(&self, declared_millis: i64) -> i64 {
        self.arrival_millis.saturating_sub(declared_millis)
    }

    pub fn admits(&self, declared_millis: i64) -> bool {
        validate(self.arrival_millis, declared_millis, self.ttl_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECLARED: i64 = 1600344748887;

    #[test]
    fn test_ttl_crossed() {
        assert!(!validate(1600344749688, DECLARED, 800));
    }

    #[test]
    fn test_ttl_boundary_inclusive() {
        assert!(validate(1600344749687, DECLARED, 800));
    }

    #[test]
    fn test_future_timestamp_passes() {
        assert!(validate(DECLARED, DECLARED + 60_000, 800));
        assert!(validate(DECLARED, DECLARED + 1, 0));
    }

    #[test]
    fn test_zero_ttl_only_admits_same_millisecond() {
        assert!(validate(DECLARED, DECLARED, 0));
        assert!(!validate(DECLARED + 1, DECLARED, 0));
    }

    #[test]
    fn test_matches_definition_over_grid() {
        for ttl in [0_i64, 1, 799, 800, 801, 10_000] {
            for elapsed in [-5_000_i64, -1, 0, 1, 799, 800, 801, 9_999, 10_000, 10_001] {
                let arrival = DECLARED + elapsed;
                assert_eq!(
                    validate(arrival, DECLARED, ttl),
                    elapsed <= ttl,
                    "ttl={ttl} elapsed={elapsed}"
                );
            }
        }
    }

    #[test]
    fn test_extreme_declared_time_is_rejected() {
        assert!(!validate(DECLARED, i64::MIN, 800));
        assert!(validate(DECLARED, i64::MAX, 800));
    }

    #[test]
    fn test_security_window() {
        let window = SecurityWindow::open(800, 1600344749688);
        assert_eq!(window.elapsed_millis(DECLARED), 801);
        assert!(!window.admits(DECLARED));
        assert!(window.admits(DECLARED + 1));
        assert_eq!(window.ttl_millis(), 800);
        assert_eq!(window.arrival_millis(), 1600344749688);
    }

    #[test]
    fn test_now_millis_is_set() {
        assert!(now_millis() > DECLARED);
    }
}
