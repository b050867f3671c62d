/// Bearer credential issued by the carrier's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub exp_unix_ts: u64, // UNIX TIMESTAMP
}

impl Token {
    pub fn new(value: String, exp_unix_ts: u64) -> Self {
        Self { value, exp_unix_ts }
    }

    /// Usable when it outlives `now` by more than the safety margin.
    pub fn is_fresh(&self, now: u64, safety_margin_seconds: u64) -> bool {
        now.saturating_add(safety_margin_seconds) < self.exp_unix_ts
    }

    /// Seconds left until nominal expiry, zero once expired.
    pub fn remaining_seconds(&self, now: u64) -> u64 {
        self.exp_unix_ts.saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_respects_safety_margin() {
        let token = Token::new("t".into(), 1_000);
        assert!(token.is_fresh(699, 300));
        assert!(!token.is_fresh(700, 300));
        assert!(!token.is_fresh(1_200, 300));
        assert_eq!(token.remaining_seconds(400), 600);
        assert_eq!(token.remaining_seconds(2_000), 0);
    }
}
