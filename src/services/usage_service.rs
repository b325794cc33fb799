use crate::entities::usage_record_entity as ur;
use crate::error::{AppError, AppResult};
use crate::external::ProductCounter;
use crate::models::{UsageCounter, UsageMetric, UsageStats};
use crate::services::{EntitlementService, SubscriptionService};
use crate::utils::{days_until, period_month};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, Set,
};
use std::sync::Arc;

/// Per-user, per-calendar-month consumption counters.
///
/// `check` followed by `increment` is not atomic: two concurrent callers for the
/// same user can both pass the check and end up over quota. Callers that need
/// a hard ceiling use [`UsageService::try_consume`] instead.
#[derive(Clone)]
pub struct UsageService {
    pool: DatabaseConnection,
    entitlements: EntitlementService,
    subscriptions: SubscriptionService,
    products: Arc<dyn ProductCounter>,
}

impl UsageService {
    pub fn new(
        pool: DatabaseConnection,
        entitlements: EntitlementService,
        subscriptions: SubscriptionService,
        products: Arc<dyn ProductCounter>,
    ) -> Self {
        Self {
            pool,
            entitlements,
            subscriptions,
            products,
        }
    }

    /// 获取当月用量记录（不存在则初始化）
    pub async fn get_or_create_current(&self, user_id: i64) -> AppResult<ur::Model> {
        Self::get_or_create_in(&self.pool, user_id, Utc::now()).await
    }

    pub(crate) async fn get_or_create_in<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<ur::Model> {
        let month = period_month(now);
        if let Some(m) = Self::find_record(conn, user_id, &month).await? {
            return Ok(m);
        }

        let inserted = ur::ActiveModel {
            user_id: Set(user_id),
            period_month: Set(month.clone()),
            messages_received: Set(0),
            posts_created: Set(0),
            current_staff_count: Set(0),
            last_reset_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await;

        match inserted {
            Ok(m) => Ok(m),
            // (user_id, period_month) 唯一索引冲突：并发请求已创建
            Err(e) => Self::find_record(conn, user_id, &month)
                .await?
                .ok_or(AppError::DatabaseError(e)),
        }
    }

    /// Read-then-write increment of one counter.
    pub async fn increment(&self, user_id: i64, counter: UsageCounter) -> AppResult<ur::Model> {
        let record = self.get_or_create_current(user_id).await?;
        let now = Utc::now();
        let mut am = record.clone().into_active_model();
        match counter {
            UsageCounter::Messages => am.messages_received = Set(record.messages_received + 1),
            UsageCounter::Posts => am.posts_created = Set(record.posts_created + 1),
        }
        am.updated_at = Set(now);
        let updated = am.update(&self.pool).await?;
        Ok(updated)
    }

    /// Passes when the counter is below its effective limit or the limit is unlimited.
    pub async fn check(&self, user_id: i64, counter: UsageCounter) -> AppResult<()> {
        let kind = counter.limit_kind();
        let limits = self.entitlements.resolve(user_id).await?;
        let Some(limit) = limits.limit_for(kind) else {
            return Ok(());
        };
        let record = self.get_or_create_current(user_id).await?;
        if Self::value_of(&record, counter) >= limit {
            return Err(AppError::limit_exceeded(kind, limit));
        }
        Ok(())
    }

    /// Atomic increment-if-below-limit.
    ///
    /// The comparison and the increment happen in one UPDATE, so concurrent
    /// callers can never push the counter past the limit.
    pub async fn try_consume(&self, user_id: i64, counter: UsageCounter) -> AppResult<()> {
        let kind = counter.limit_kind();
        let limits = self.entitlements.resolve(user_id).await?;
        let limit = limits.limit_for(kind);
        let record = self.get_or_create_current(user_id).await?;
        let column = Self::column_of(counter);

        let mut update = ur::Entity::update_many()
            .col_expr(column, Expr::col(column).add(1))
            .col_expr(ur::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(ur::Column::Id.eq(record.id));
        if let Some(limit) = limit {
            update = update.filter(column.lt(limit));
        }
        let result = update.exec(&self.pool).await?;

        if result.rows_affected == 0 {
            // 只有带上限的情况下才可能更新 0 行
            return Err(AppError::limit_exceeded(kind, limit.unwrap_or_default()));
        }
        Ok(())
    }

    /// Zeroes message and post counters on the current calendar-month record.
    /// `period_month` is left as is.
    pub async fn reset(&self, user_id: i64) -> AppResult<ur::Model> {
        Self::reset_in(&self.pool, user_id, Utc::now()).await
    }

    pub(crate) async fn reset_in<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<ur::Model> {
        let record = Self::get_or_create_in(conn, user_id, now).await?;
        let mut am = record.into_active_model();
        am.messages_received = Set(0);
        am.posts_created = Set(0);
        am.last_reset_at = Set(Some(now));
        am.updated_at = Set(now);
        let updated = am.update(conn).await?;
        Ok(updated)
    }

    /// Records the staff count reported by the staff-management side.
    pub async fn sync_staff_count(&self, user_id: i64, count: i32) -> AppResult<ur::Model> {
        if count < 0 {
            return Err(AppError::ValidationError(
                "Staff count cannot be negative".into(),
            ));
        }
        let record = self.get_or_create_current(user_id).await?;
        let mut am = record.into_active_model();
        am.current_staff_count = Set(count);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        Ok(updated)
    }

    pub async fn stats_for(&self, user_id: i64) -> AppResult<UsageStats> {
        let limits = self.entitlements.resolve(user_id).await?;
        let sub = self.subscriptions.get_active(user_id).await?;
        let record = self.get_or_create_current(user_id).await?;
        let product_count = self.products.count_products(user_id).await?;

        Ok(UsageStats {
            period_month: record.period_month.clone(),
            plan_slug: limits.plan_slug.clone(),
            messages: UsageMetric::new(
                Self::value_of(&record, UsageCounter::Messages),
                limits.max_messages,
            ),
            posts: UsageMetric::new(
                Self::value_of(&record, UsageCounter::Posts),
                limits.max_posts,
            ),
            products: UsageMetric::new(product_count, limits.max_products),
            staff: UsageMetric::new(
                i64::from(record.current_staff_count),
                Some(limits.max_staff),
            ),
            days_until_reset: days_until(sub.current_period_end, Utc::now()),
        })
    }

    pub fn value_of(record: &ur::Model, counter: UsageCounter) -> i64 {
        match counter {
            UsageCounter::Messages => i64::from(record.messages_received),
            UsageCounter::Posts => i64::from(record.posts_created),
        }
    }

    fn column_of(counter: UsageCounter) -> ur::Column {
        match counter {
            UsageCounter::Messages => ur::Column::MessagesReceived,
            UsageCounter::Posts => ur::Column::PostsCreated,
        }
    }

    async fn find_record<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        month: &str,
    ) -> AppResult<Option<ur::Model>> {
        let record = ur::Entity::find()
            .filter(ur::Column::UserId.eq(user_id))
            .filter(ur::Column::PeriodMonth.eq(month))
            .one(conn)
            .await?;
        Ok(record)
    }
}
