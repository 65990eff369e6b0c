//! Trailing time window used for retweet eviction

/// Trailing window length, configured in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowDuration {
    minutes: u64,
}

impl WindowDuration {
    /// Returns `None` for a zero-minute window.
    pub fn from_minutes(minutes: u64) -> Option<Self> {
        if minutes == 0 {
            None
        } else {
            Some(Self { minutes })
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        s.trim().parse::<u64>().ok().and_then(Self::from_minutes)
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn duration_secs(&self) -> i64 {
        (self.minutes as i64).saturating_mul(60)
    }

    /// `now - created_at < D`; a record exactly `D` old is expired.
    pub fn is_live(&self, created_at: i64, now: i64) -> bool {
        now - created_at < self.duration_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_window_rejected() {
        assert!(WindowDuration::from_minutes(0).is_none());
        assert!(WindowDuration::from_str("0").is_none());
        assert!(WindowDuration::from_str("abc").is_none());
        assert!(WindowDuration::from_str("-3").is_none());
    }

    #[test]
    fn test_parse_with_whitespace() {
        let window = WindowDuration::from_str(" 15\n").unwrap();
        assert_eq!(window.minutes(), 15);
        assert_eq!(window.duration_secs(), 900);
    }

    #[test]
    fn test_liveness_boundary() {
        let window = WindowDuration::from_minutes(5).unwrap();
        let now = 10_000;

        assert!(window.is_live(now - 4 * 60, now));
        assert!(window.is_live(now - 299, now));
        assert!(!window.is_live(now - 300, now));
        assert!(!window.is_live(now - 6 * 60, now));
    }
}
