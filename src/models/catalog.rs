use crate::entities::{
    AddonBillingCycle, BillingCycle, UserAddonStatus, addon_entity as addons, plan_entity as plans,
    user_addon_entity as ua,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub price_cents: i64,
    pub billing_cycle: BillingCycle,
    pub max_products: Option<i32>,
    pub max_posts_per_month: Option<i32>,
    pub max_messages_per_month: Option<i32>,
    pub max_staff_users: i32,
    pub has_custom_domain: bool,
    pub has_theme_access: bool,
    pub branding_removed: bool,
}

impl From<plans::Model> for PlanResponse {
    fn from(m: plans::Model) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            name: m.name,
            price_cents: m.price_cents,
            billing_cycle: m.billing_cycle,
            max_products: m.max_products,
            max_posts_per_month: m.max_posts_per_month,
            max_messages_per_month: m.max_messages_per_month,
            max_staff_users: m.max_staff_users,
            has_custom_domain: m.has_custom_domain,
            has_theme_access: m.has_theme_access,
            branding_removed: m.branding_removed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub addon_type: String,
    pub price_cents: i64,
    pub billing_cycle: AddonBillingCycle,
    pub provides_quantity: i32,
    pub available_for_plans: Vec<String>,
}

impl From<addons::Model> for AddonResponse {
    fn from(m: addons::Model) -> Self {
        let available_for_plans = m.applicable_plans();
        Self {
            id: m.id,
            slug: m.slug,
            name: m.name,
            addon_type: m.addon_type,
            price_cents: m.price_cents,
            billing_cycle: m.billing_cycle,
            provides_quantity: m.provides_quantity,
            available_for_plans,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseAddonRequest {
    pub addon_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAddonResponse {
    pub id: i64,
    pub addon_id: i64,
    pub addon_slug: String,
    pub addon_type: String,
    pub quantity_purchased: i32,
    pub status: UserAddonStatus,
    pub purchased_at: DateTime<Utc>,
    pub next_renewal_date: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserAddonResponse {
    pub fn new(grant: ua::Model, addon: &addons::Model) -> Self {
        Self {
            id: grant.id,
            addon_id: grant.addon_id,
            addon_slug: addon.slug.clone(),
            addon_type: addon.addon_type.clone(),
            quantity_purchased: grant.quantity_purchased,
            status: grant.status,
            purchased_at: grant.purchased_at,
            next_renewal_date: grant.next_renewal_date,
            expires_at: grant.expires_at,
        }
    }
}
