use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageMetric {
    pub current: i64,
    /// `None` = unlimited
    pub limit: Option<i64>,
}

impl UsageMetric {
    pub fn new(current: i64, limit: Option<i64>) -> Self {
        Self { current, limit }
    }

    pub fn remaining(&self) -> Option<i64> {
        self.limit.map(|l| (l - self.current).max(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageStats {
    pub period_month: String,
    pub plan_slug: String,
    pub messages: UsageMetric,
    pub posts: UsageMetric,
    pub products: UsageMetric,
    pub staff: UsageMetric,
    /// 距离当前计费周期结束的天数（向上取整，最小为 0）
    pub days_until_reset: i64,
}
