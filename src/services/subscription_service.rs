use crate::entities::{SubscriptionStatus, plan_entity as plans, user_subscription_entity as us};
use crate::error::{AppError, AppResult};
use crate::services::CatalogService;
use crate::utils::add_months;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// Source of truth for which plan a user is on and its billing period.
#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
    free_plan_slug: String,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection, free_plan_slug: impl Into<String>) -> Self {
        Self {
            pool,
            free_plan_slug: free_plan_slug.into(),
        }
    }

    /// Most recently created subscription for the user.
    ///
    /// Users with no row at all get a free-plan subscription with a one-month
    /// period starting now, so this read may write.
    pub async fn get_active(&self, user_id: i64) -> AppResult<us::Model> {
        if let Some(sub) = Self::latest(&self.pool, user_id).await? {
            return Ok(sub);
        }

        let plan = CatalogService::find_plan_by_slug_in(&self.pool, &self.free_plan_slug).await?;
        match Self::insert_active(&self.pool, user_id, &plan, 1, Utc::now()).await {
            Ok(sub) => {
                log::info!("Created default '{}' subscription for user {user_id}", plan.slug);
                Ok(sub)
            }
            Err(e) => {
                // 并发首次访问时另一请求已插入，唯一索引冲突后重新读取
                match Self::latest(&self.pool, user_id).await? {
                    Some(sub) => Ok(sub),
                    None => Err(e),
                }
            }
        }
    }

    /// Switches the user to `plan_id`: every existing row is archived as
    /// `expired` and a fresh active row is inserted, in one transaction.
    pub async fn create(&self, user_id: i64, plan_id: i64) -> AppResult<us::Model> {
        let txn = self.pool.begin().await?;
        let plan = CatalogService::find_plan_in(&txn, plan_id).await?;
        let now = Utc::now();

        us::Entity::update_many()
            .set(us::ActiveModel {
                status: Set(SubscriptionStatus::Expired),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(us::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let sub =
            Self::insert_active(&txn, user_id, &plan, plan.billing_cycle.months(), now).await?;
        txn.commit().await?;

        log::info!("User {user_id} switched to plan '{}'", plan.slug);
        Ok(sub)
    }

    /// 在当前周期结束时取消（不改变状态与周期）
    pub async fn cancel(&self, user_id: i64) -> AppResult<us::Model> {
        let sub = self.require_active(user_id).await?;
        let mut am = sub.into_active_model();
        am.cancel_at_period_end = Set(true);
        am.cancelled_at = Set(Some(Utc::now()));
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        log::info!("User {user_id} subscription set to cancel at period end");
        Ok(updated)
    }

    pub async fn reactivate(&self, user_id: i64) -> AppResult<us::Model> {
        let sub = self.require_active(user_id).await?;
        let mut am = sub.into_active_model();
        am.cancel_at_period_end = Set(false);
        am.cancelled_at = Set(None);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        log::info!("User {user_id} subscription reactivated");
        Ok(updated)
    }

    pub async fn plan_of(&self, sub: &us::Model) -> AppResult<plans::Model> {
        CatalogService::find_plan_in(&self.pool, sub.plan_id).await
    }

    async fn require_active(&self, user_id: i64) -> AppResult<us::Model> {
        let sub = self.get_active(user_id).await?;
        if !sub.is_active() {
            return Err(AppError::InvalidState(format!(
                "User {user_id} has no active subscription (latest is {})",
                sub.status
            )));
        }
        Ok(sub)
    }

    async fn latest<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<Option<us::Model>> {
        let sub = us::Entity::find()
            .filter(us::Column::UserId.eq(user_id))
            .order_by_desc(us::Column::CreatedAt)
            .order_by_desc(us::Column::Id)
            .one(conn)
            .await?;
        Ok(sub)
    }

    async fn insert_active<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        plan: &plans::Model,
        months: u32,
        now: DateTime<Utc>,
    ) -> AppResult<us::Model> {
        let period_end = add_months(now, months);
        let sub = us::ActiveModel {
            user_id: Set(user_id),
            plan_id: Set(plan.id),
            status: Set(SubscriptionStatus::Active),
            current_period_start: Set(now),
            current_period_end: Set(period_end),
            cancel_at_period_end: Set(false),
            cancelled_at: Set(None),
            next_billing_date: Set(Some(period_end)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(sub)
    }
}
