use serde::{Deserialize, Serialize};

/// One subscription whose rollover step failed; it is retried on the next sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolloverFailure {
    pub subscription_id: i64,
    pub user_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolloverReport {
    pub due: usize,
    pub rolled_over: usize,
    /// Rows another sweep advanced between selection and update.
    pub skipped: usize,
    pub failures: Vec<RolloverFailure>,
}
