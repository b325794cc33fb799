use crate::entities::{SubscriptionStatus, plan_entity as plans, user_subscription_entity as us};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub plan_slug: String,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionResponse {
    pub fn new(sub: us::Model, plan: &plans::Model) -> Self {
        Self {
            id: sub.id,
            user_id: sub.user_id,
            plan_id: sub.plan_id,
            plan_slug: plan.slug.clone(),
            plan_name: plan.name.clone(),
            status: sub.status,
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
            cancel_at_period_end: sub.cancel_at_period_end,
            cancelled_at: sub.cancelled_at,
            next_billing_date: sub.next_billing_date,
            created_at: sub.created_at,
        }
    }
}
