//! Metrics emitted by this crate
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! application installs a recorder.

/// Label values
pub mod labels {
    /// Operation admitted by the limiter
    pub const OUTCOME_ALLOWED: &str = "allowed";
    /// Operation refused by the limiter
    pub const OUTCOME_DENIED: &str = "denied";
    /// Admitted operation dropped without reporting
    pub const OUTCOME_ABANDONED: &str = "abandoned";
}

/// Counters
pub mod counters {
    /// Limiter admission decision
    pub fn admission(outcome: &'static str) {
        ::metrics::counter!("kv_options_limiter_admissions_total", "outcome" => outcome)
            .increment(1);
    }

    /// Configuration translated into client options
    pub fn options_translated() {
        ::metrics::counter!("kv_options_translations_total").increment(1);
    }
}
