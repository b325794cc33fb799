use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, DeriveActiveEnum, EnumIter)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "past_due")]
    PastDue,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::PastDue => write!(f, "past_due"),
        }
    }
}

/// 用户订阅（当前与历史）
/// 说明:
/// - 同一用户最多一条 status = active（部分唯一索引保证）
/// - 换套餐时旧记录置为 expired，插入新记录，不原地修改 plan_id
/// - cancel / reactivate 只切换 cancel_at_period_end
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Whether the billing period has elapsed at `now` and the row is due for rollover.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.current_period_end <= now
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plans::Entity",
        from = "Column::PlanId",
        to = "super::plans::Column::Id"
    )]
    Plan,
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sub(status: SubscriptionStatus, end: DateTime<Utc>) -> Model {
        Model {
            id: 1,
            user_id: 7,
            plan_id: 1,
            status,
            current_period_start: end - Duration::days(30),
            current_period_end: end,
            cancel_at_period_end: false,
            cancelled_at: None,
            next_billing_date: Some(end),
            created_at: end - Duration::days(30),
            updated_at: end - Duration::days(30),
        }
    }

    #[test]
    fn due_once_period_end_has_passed() {
        let now = Utc::now();
        assert!(sub(SubscriptionStatus::Active, now).is_due(now));
        assert!(sub(SubscriptionStatus::Active, now - Duration::hours(1)).is_due(now));
        assert!(!sub(SubscriptionStatus::Active, now + Duration::hours(1)).is_due(now));
    }

    #[test]
    fn archived_rows_are_never_due() {
        let now = Utc::now();
        assert!(!sub(SubscriptionStatus::Expired, now - Duration::days(3)).is_due(now));
        assert!(!sub(SubscriptionStatus::Cancelled, now - Duration::days(3)).is_due(now));
    }
}
