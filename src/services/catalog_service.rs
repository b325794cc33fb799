use crate::database::seed::{default_addons, default_plans};
use crate::entities::{addon_entity as addons, plan_entity as plans};
use crate::error::{AppError, AppResult};
use crate::models::{AddonResponse, PlanResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Read path over the plan and add-on catalogs.
///
/// Catalog rows change rarely and out-of-band, so nothing is cached here;
/// every lookup goes to storage.
#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 获取上架套餐（按展示顺序）
    pub async fn list_plans(&self) -> AppResult<Vec<PlanResponse>> {
        let list = plans::Entity::find()
            .filter(plans::Column::IsActive.eq(true))
            .order_by_asc(plans::Column::DisplayOrder)
            .order_by_asc(plans::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// Looks a plan up by id, including soft-deleted ones still referenced by subscriptions.
    pub async fn find_plan(&self, plan_id: i64) -> AppResult<plans::Model> {
        Self::find_plan_in(&self.pool, plan_id).await
    }

    pub(crate) async fn find_plan_in<C: ConnectionTrait>(
        conn: &C,
        plan_id: i64,
    ) -> AppResult<plans::Model> {
        plans::Entity::find_by_id(plan_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Plan {plan_id} not found")))
    }

    pub async fn find_plan_by_slug(&self, slug: &str) -> AppResult<plans::Model> {
        Self::find_plan_by_slug_in(&self.pool, slug).await
    }

    pub(crate) async fn find_plan_by_slug_in<C: ConnectionTrait>(
        conn: &C,
        slug: &str,
    ) -> AppResult<plans::Model> {
        plans::Entity::find()
            .filter(plans::Column::Slug.eq(slug))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Plan '{slug}' not found")))
    }

    /// 获取上架增值包；传入 plan_slug 时只返回该套餐可购买的
    pub async fn list_addons(&self, plan_slug: Option<&str>) -> AppResult<Vec<AddonResponse>> {
        let list = addons::Entity::find()
            .filter(addons::Column::IsActive.eq(true))
            .order_by_asc(addons::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list
            .into_iter()
            .filter(|a| plan_slug.is_none_or(|slug| a.is_available_for(slug)))
            .map(Into::into)
            .collect())
    }

    pub async fn find_addon(&self, addon_id: i64) -> AppResult<addons::Model> {
        addons::Entity::find_by_id(addon_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Addon {addon_id} not found")))
    }

    pub async fn find_addon_by_slug(&self, slug: &str) -> AppResult<addons::Model> {
        addons::Entity::find()
            .filter(addons::Column::Slug.eq(slug))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Addon '{slug}' not found")))
    }

    /// Inserts the default catalog rows whose slug is missing. Existing rows are
    /// left untouched, so this is safe to run on every start.
    pub async fn seed_defaults(&self) -> AppResult<usize> {
        let mut inserted = 0usize;
        for (slug, plan) in default_plans() {
            let exists = plans::Entity::find()
                .filter(plans::Column::Slug.eq(slug))
                .one(&self.pool)
                .await?
                .is_some();
            if !exists {
                plan.insert(&self.pool).await?;
                inserted += 1;
            }
        }
        for (slug, addon) in default_addons() {
            let exists = addons::Entity::find()
                .filter(addons::Column::Slug.eq(slug))
                .one(&self.pool)
                .await?
                .is_some();
            if !exists {
                addon.insert(&self.pool).await?;
                inserted += 1;
            }
        }
        if inserted > 0 {
            log::info!("Seeded {inserted} catalog rows");
        }
        Ok(inserted)
    }
}
