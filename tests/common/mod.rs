#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, Set,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use storefront_billing::AppResult;
use storefront_billing::config::BillingConfig;
use storefront_billing::entities::{
    SubscriptionStatus, user_subscription_entity as us,
};
use storefront_billing::external::{PaymentGateway, ProductCounter};
use storefront_billing::services::{BillingService, UsageService};

#[derive(Default)]
pub struct FakeProducts {
    counts: Mutex<HashMap<i64, i64>>,
}

impl FakeProducts {
    pub fn set(&self, user_id: i64, count: i64) {
        self.counts.lock().unwrap().insert(user_id, count);
    }
}

#[async_trait]
impl ProductCounter for FakeProducts {
    async fn count_products(&self, user_id: i64) -> AppResult<i64> {
        Ok(self.counts.lock().unwrap().get(&user_id).copied().unwrap_or(0))
    }
}

pub struct FakePayments {
    approve: bool,
    pub charges: Mutex<Vec<(i64, String)>>,
}

impl FakePayments {
    pub fn charged(&self) -> Vec<(i64, String)> {
        self.charges.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn authorize(&self, amount_cents: i64, description: &str) -> AppResult<bool> {
        self.charges
            .lock()
            .unwrap()
            .push((amount_cents, description.to_string()));
        Ok(self.approve)
    }
}

pub struct TestApp {
    pub pool: DatabaseConnection,
    pub billing: BillingService,
    pub products: Arc<FakeProducts>,
    pub payments: Arc<FakePayments>,
}

pub async fn setup() -> TestApp {
    setup_with_payments(true).await
}

/// In-memory SQLite with migrations and the default catalog.
pub async fn setup_with_payments(approve: bool) -> TestApp {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    // 单连接：内存库的所有语句共享同一个连接
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let pool = Database::connect(opts)
        .await
        .expect("Failed to create test database");
    Migrator::up(&pool, None)
        .await
        .expect("Failed to run migrations");

    let products = Arc::new(FakeProducts::default());
    let payments = Arc::new(FakePayments {
        approve,
        charges: Mutex::new(Vec::new()),
    });
    let billing = BillingService::new(
        pool.clone(),
        &BillingConfig::default(),
        products.clone(),
        payments.clone(),
    );
    billing
        .catalog()
        .seed_defaults()
        .await
        .expect("Failed to seed catalog");

    TestApp {
        pool,
        billing,
        products,
        payments,
    }
}

impl TestApp {
    pub async fn plan_id(&self, slug: &str) -> i64 {
        self.billing
            .catalog()
            .find_plan_by_slug(slug)
            .await
            .expect("plan seeded")
            .id
    }

    pub async fn addon_id(&self, slug: &str) -> i64 {
        self.billing
            .catalog()
            .find_addon_by_slug(slug)
            .await
            .expect("addon seeded")
            .id
    }

    /// Overwrites the current month's counters.
    pub async fn set_usage(&self, user_id: i64, messages: i32, posts: i32) {
        let record = self
            .billing
            .usage()
            .get_or_create_current(user_id)
            .await
            .unwrap();
        let mut am = record.into_active_model();
        am.messages_received = Set(messages);
        am.posts_created = Set(posts);
        am.update(&self.pool).await.unwrap();
    }

    pub async fn usage_of(&self, user_id: i64) -> (i64, i64) {
        let record = self
            .billing
            .usage()
            .get_or_create_current(user_id)
            .await
            .unwrap();
        (
            UsageService::value_of(&record, storefront_billing::models::UsageCounter::Messages),
            UsageService::value_of(&record, storefront_billing::models::UsageCounter::Posts),
        )
    }

    pub async fn subscriptions_of(&self, user_id: i64) -> Vec<us::Model> {
        us::Entity::find()
            .filter(us::Column::UserId.eq(user_id))
            .all(&self.pool)
            .await
            .unwrap()
    }

    pub async fn active_count(&self, user_id: i64) -> usize {
        self.subscriptions_of(user_id)
            .await
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .count()
    }

    /// Moves the active subscription's period so it ends at `end`.
    pub async fn set_period(&self, subscription_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) {
        let sub = us::Entity::find_by_id(subscription_id)
            .one(&self.pool)
            .await
            .unwrap()
            .unwrap();
        let mut am = sub.into_active_model();
        am.current_period_start = Set(start);
        am.current_period_end = Set(end);
        am.next_billing_date = Set(Some(end));
        am.update(&self.pool).await.unwrap();
    }
}
