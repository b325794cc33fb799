use crate::entities::{
    AddonBillingCycle, UserAddonStatus, addon_entity as addons, user_addon_entity as ua,
};
use crate::error::{AppError, AppResult};
use crate::external::PaymentGateway;
use crate::models::{PurchaseAddonRequest, UserAddonResponse};
use crate::services::{CatalogService, SubscriptionService};
use crate::utils::add_months;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;

/// Ledger of add-ons a user has purchased. Rows are never deleted.
#[derive(Clone)]
pub struct AddonService {
    pool: DatabaseConnection,
    catalog: CatalogService,
    subscriptions: SubscriptionService,
    payments: Arc<dyn PaymentGateway>,
}

impl AddonService {
    pub fn new(
        pool: DatabaseConnection,
        catalog: CatalogService,
        subscriptions: SubscriptionService,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            pool,
            catalog,
            subscriptions,
            payments,
        }
    }

    /// 购买增值包
    ///
    /// 逻辑:
    /// 1. 校验数量与增值包是否上架
    /// 2. 校验用户当前套餐可以购买该增值包
    /// 3. 扣款（price_cents * quantity），被拒则中止
    /// 4. 写入 active 记录；按月计费的设置下次续费时间
    pub async fn purchase(
        &self,
        user_id: i64,
        req: PurchaseAddonRequest,
    ) -> AppResult<UserAddonResponse> {
        if req.quantity < 1 {
            return Err(AppError::ValidationError(
                "Quantity must be at least 1".into(),
            ));
        }

        let addon = self.catalog.find_addon(req.addon_id).await?;
        if !addon.is_active {
            return Err(AppError::ValidationError(format!(
                "Addon '{}' is no longer available",
                addon.slug
            )));
        }

        let sub = self.subscriptions.get_active(user_id).await?;
        let plan = self.subscriptions.plan_of(&sub).await?;
        if !addon.is_available_for(&plan.slug) {
            return Err(AppError::ValidationError(format!(
                "Addon '{}' is not available for the '{}' plan",
                addon.slug, plan.slug
            )));
        }

        let amount = addon.price_cents * i64::from(req.quantity);
        let description = format!(
            "User {user_id} buys {} x {}",
            req.quantity, addon.slug
        );
        if !self.payments.authorize(amount, &description).await? {
            return Err(AppError::PaymentDeclined(description));
        }

        let now = Utc::now();
        let next_renewal_date = match addon.billing_cycle {
            AddonBillingCycle::Monthly => Some(add_months(now, 1)),
            AddonBillingCycle::OneTime => None,
        };
        let grant = ua::ActiveModel {
            user_id: Set(user_id),
            addon_id: Set(addon.id),
            quantity_purchased: Set(req.quantity),
            status: Set(UserAddonStatus::Active),
            purchased_at: Set(now),
            next_renewal_date: Set(next_renewal_date),
            expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "User {user_id} purchased addon '{}' x{} (grant {})",
            addon.slug,
            req.quantity,
            grant.id
        );
        Ok(UserAddonResponse::new(grant, &addon))
    }

    /// Cancels a grant. It stops counting toward limits immediately; `expires_at`
    /// records when the paid term would have ended.
    pub async fn cancel(&self, user_id: i64, user_addon_id: i64) -> AppResult<UserAddonResponse> {
        let (grant, addon) = ua::Entity::find_by_id(user_addon_id)
            .filter(ua::Column::UserId.eq(user_id))
            .find_also_related(addons::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User addon {user_addon_id} not found")))?;
        let addon = addon
            .ok_or_else(|| AppError::NotFound(format!("Addon {} not found", grant.addon_id)))?;

        if grant.status != UserAddonStatus::Active {
            return Err(AppError::InvalidState(format!(
                "User addon {user_addon_id} is already {}",
                grant.status
            )));
        }

        let now = Utc::now();
        let expires_at = grant.next_renewal_date.unwrap_or(now);
        let mut am = grant.into_active_model();
        am.status = Set(UserAddonStatus::Cancelled);
        am.expires_at = Set(Some(expires_at));
        am.updated_at = Set(now);
        let updated = am.update(&self.pool).await?;

        log::info!("User {user_id} cancelled addon grant {user_addon_id}");
        Ok(UserAddonResponse::new(updated, &addon))
    }

    /// 用户全部增值包记录（含已取消），新的在前
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<UserAddonResponse>> {
        let rows = ua::Entity::find()
            .filter(ua::Column::UserId.eq(user_id))
            .order_by_desc(ua::Column::Id)
            .find_also_related(addons::Entity)
            .all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(grant, addon)| addon.map(|a| UserAddonResponse::new(grant, &a)))
            .collect())
    }

    /// Active grants joined with their catalog rows.
    pub async fn active_grants(&self, user_id: i64) -> AppResult<Vec<(ua::Model, addons::Model)>> {
        let rows = ua::Entity::find()
            .filter(ua::Column::UserId.eq(user_id))
            .filter(ua::Column::Status.eq(UserAddonStatus::Active))
            .find_also_related(addons::Entity)
            .all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(grant, addon)| addon.map(|a| (grant, a)))
            .collect())
    }
}
