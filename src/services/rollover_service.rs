use crate::entities::{SubscriptionStatus, user_subscription_entity as us};
use crate::error::AppResult;
use crate::models::{RolloverFailure, RolloverReport};
use crate::services::UsageService;
use crate::utils::add_months;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// Billing-period rollover sweep.
///
/// Every active subscription whose period has ended gets its usage counters
/// reset and its period advanced by exactly one month. The one-month step is
/// applied regardless of the plan's billing cycle, and the reset targets the
/// calendar-month usage record rather than a period-aligned one.
#[derive(Clone)]
pub struct RolloverService {
    pool: DatabaseConnection,
}

impl RolloverService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn run(&self) -> AppResult<RolloverReport> {
        self.run_at(Utc::now()).await
    }

    /// Sweeps subscriptions due at `now`. A failing subscription is logged and
    /// recorded in the report; the rest of the sweep continues.
    pub async fn run_at(&self, now: DateTime<Utc>) -> AppResult<RolloverReport> {
        let due = us::Entity::find()
            .filter(us::Column::Status.eq(SubscriptionStatus::Active))
            .filter(us::Column::CurrentPeriodEnd.lte(now))
            .order_by_asc(us::Column::Id)
            .all(&self.pool)
            .await?;

        let mut report = RolloverReport {
            due: due.len(),
            ..Default::default()
        };

        for sub in due {
            let (subscription_id, user_id) = (sub.id, sub.user_id);
            match self.roll_over(sub, now).await {
                Ok(true) => report.rolled_over += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    log::error!(
                        "Rollover failed for user {user_id} (subscription {subscription_id}): {e:?}"
                    );
                    report.failures.push(RolloverFailure {
                        subscription_id,
                        user_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Returns `false` when the row is no longer due on the re-read inside the
    /// transaction.
    async fn roll_over(&self, sub: us::Model, now: DateTime<Utc>) -> AppResult<bool> {
        // 先在事务外确保当月用量记录存在：Postgres 上唯一索引冲突会使事务失效，
        // 事务内的插入冲突无法再回读
        UsageService::get_or_create_in(&self.pool, sub.user_id, now).await?;

        let txn = self.pool.begin().await?;

        // 事务内重新读取，避免并发 sweep 重复推进
        let Some(sub) = us::Entity::find_by_id(sub.id).one(&txn).await? else {
            return Ok(false);
        };
        if !sub.is_due(now) {
            log::debug!(
                "Subscription {} no longer due, skipping rollover",
                sub.id
            );
            return Ok(false);
        }

        UsageService::reset_in(&txn, sub.user_id, now).await?;

        // 固定推进一个月（不看套餐的 billing_cycle）
        let new_start = sub.current_period_end;
        let new_end = add_months(new_start, 1);
        let mut am = sub.into_active_model();
        am.current_period_start = Set(new_start);
        am.current_period_end = Set(new_end);
        am.next_billing_date = Set(Some(new_end));
        am.updated_at = Set(now);
        am.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}
