use crate::config::BillingConfig;
use crate::error::{AppError, AppResult};
use crate::external::{PaymentGateway, ProductCounter};
use crate::models::*;
use crate::services::{
    AddonService, CatalogService, EntitlementService, RolloverService, SubscriptionService,
    UsageService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Entry point used by the web layer and background tasks.
///
/// Wires the catalog, the three ledgers, the entitlement resolver and the
/// rollover sweep together, and hosts the limit-enforcement dispatch.
#[derive(Clone)]
pub struct BillingService {
    catalog: CatalogService,
    subscriptions: SubscriptionService,
    addons: AddonService,
    entitlements: EntitlementService,
    usage: UsageService,
    rollover: RolloverService,
    products: Arc<dyn ProductCounter>,
    payments: Arc<dyn PaymentGateway>,
}

impl BillingService {
    pub fn new(
        pool: DatabaseConnection,
        config: &BillingConfig,
        products: Arc<dyn ProductCounter>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        let catalog = CatalogService::new(pool.clone());
        let subscriptions = SubscriptionService::new(pool.clone(), config.free_plan_slug.clone());
        let addons = AddonService::new(
            pool.clone(),
            catalog.clone(),
            subscriptions.clone(),
            payments.clone(),
        );
        let entitlements = EntitlementService::new(subscriptions.clone(), addons.clone());
        let usage = UsageService::new(
            pool.clone(),
            entitlements.clone(),
            subscriptions.clone(),
            products.clone(),
        );
        let rollover = RolloverService::new(pool);
        Self {
            catalog,
            subscriptions,
            addons,
            entitlements,
            usage,
            rollover,
            products,
            payments,
        }
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn usage(&self) -> &UsageService {
        &self.usage
    }

    pub fn rollover(&self) -> &RolloverService {
        &self.rollover
    }

    pub async fn resolve_limits(&self, user_id: i64) -> AppResult<EffectiveLimits> {
        self.entitlements.resolve(user_id).await
    }

    /// Pre-action check for a quota-consuming operation.
    pub async fn check_limit(&self, user_id: i64, kind: LimitKind) -> AppResult<()> {
        if let Some(counter) = kind.counter() {
            return self.usage.check(user_id, counter).await;
        }
        match kind {
            LimitKind::Product => {
                let limits = self.entitlements.resolve(user_id).await?;
                let Some(max) = limits.max_products else {
                    return Ok(());
                };
                let count = self.products.count_products(user_id).await?;
                if count >= max {
                    return Err(AppError::limit_exceeded(kind, max));
                }
                Ok(())
            }
            // 员工数量限制暂未实现，始终放行
            _ => Ok(()),
        }
    }

    pub async fn record_consumption(&self, user_id: i64, counter: UsageCounter) -> AppResult<()> {
        self.usage.increment(user_id, counter).await?;
        Ok(())
    }

    /// Check and record in one atomic step.
    pub async fn try_consume(&self, user_id: i64, counter: UsageCounter) -> AppResult<()> {
        self.usage.try_consume(user_id, counter).await
    }

    pub async fn get_usage_stats(&self, user_id: i64) -> AppResult<UsageStats> {
        self.usage.stats_for(user_id).await
    }

    pub async fn sync_staff_count(&self, user_id: i64, count: i32) -> AppResult<()> {
        self.usage.sync_staff_count(user_id, count).await?;
        Ok(())
    }

    pub async fn get_subscription(&self, user_id: i64) -> AppResult<SubscriptionResponse> {
        let sub = self.subscriptions.get_active(user_id).await?;
        let plan = self.subscriptions.plan_of(&sub).await?;
        Ok(SubscriptionResponse::new(sub, &plan))
    }

    /// Moves the user onto `plan_id`. Upgrades and downgrades are the same
    /// operation; no price comparison is made.
    pub async fn change_plan(&self, user_id: i64, plan_id: i64) -> AppResult<SubscriptionResponse> {
        let plan = self.catalog.find_plan(plan_id).await?;
        if plan.price_cents > 0 {
            let description = format!("User {user_id} subscribes to {}", plan.slug);
            if !self
                .payments
                .authorize(plan.price_cents, &description)
                .await?
            {
                return Err(AppError::PaymentDeclined(description));
            }
        }
        let sub = self.subscriptions.create(user_id, plan.id).await?;
        Ok(SubscriptionResponse::new(sub, &plan))
    }

    pub async fn upgrade(&self, user_id: i64, plan_id: i64) -> AppResult<SubscriptionResponse> {
        self.change_plan(user_id, plan_id).await
    }

    pub async fn downgrade(&self, user_id: i64, plan_id: i64) -> AppResult<SubscriptionResponse> {
        self.change_plan(user_id, plan_id).await
    }

    pub async fn cancel(&self, user_id: i64) -> AppResult<SubscriptionResponse> {
        let sub = self.subscriptions.cancel(user_id).await?;
        let plan = self.subscriptions.plan_of(&sub).await?;
        Ok(SubscriptionResponse::new(sub, &plan))
    }

    pub async fn reactivate(&self, user_id: i64) -> AppResult<SubscriptionResponse> {
        let sub = self.subscriptions.reactivate(user_id).await?;
        let plan = self.subscriptions.plan_of(&sub).await?;
        Ok(SubscriptionResponse::new(sub, &plan))
    }

    pub async fn list_plans(&self) -> AppResult<Vec<PlanResponse>> {
        self.catalog.list_plans().await
    }

    /// 当前套餐可购买的增值包
    pub async fn list_available_addons(&self, user_id: i64) -> AppResult<Vec<AddonResponse>> {
        let sub = self.subscriptions.get_active(user_id).await?;
        let plan = self.subscriptions.plan_of(&sub).await?;
        self.catalog.list_addons(Some(&plan.slug)).await
    }

    pub async fn purchase_addon(
        &self,
        user_id: i64,
        req: PurchaseAddonRequest,
    ) -> AppResult<UserAddonResponse> {
        self.addons.purchase(user_id, req).await
    }

    pub async fn cancel_addon(
        &self,
        user_id: i64,
        user_addon_id: i64,
    ) -> AppResult<UserAddonResponse> {
        self.addons.cancel(user_id, user_addon_id).await
    }

    pub async fn list_user_addons(&self, user_id: i64) -> AppResult<Vec<UserAddonResponse>> {
        self.addons.list_for_user(user_id).await
    }

    pub async fn run_period_rollover(&self) -> AppResult<RolloverReport> {
        self.rollover.run().await
    }
}
