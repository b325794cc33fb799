//! Default catalog inserted on first start.

use crate::entities::{
    AddonBillingCycle, AddonType, BillingCycle, addon_entity as addons, plan_entity as plans,
};
use chrono::Utc;
use sea_orm::Set;
use serde_json::json;

struct PlanSeed {
    slug: &'static str,
    name: &'static str,
    price_cents: i64,
    max_products: Option<i32>,
    max_posts: Option<i32>,
    max_messages: Option<i32>,
    max_staff: i32,
    custom_domain: bool,
    theme_access: bool,
    branding_removed: bool,
}

const PLANS: [PlanSeed; 4] = [
    PlanSeed {
        slug: "free",
        name: "Free",
        price_cents: 0,
        max_products: Some(10),
        max_posts: Some(30),
        max_messages: Some(50),
        max_staff: 1,
        custom_domain: false,
        theme_access: false,
        branding_removed: false,
    },
    PlanSeed {
        slug: "starter",
        name: "Starter",
        price_cents: 1900,
        max_products: Some(100),
        max_posts: Some(100),
        max_messages: Some(500),
        max_staff: 2,
        custom_domain: false,
        theme_access: true,
        branding_removed: false,
    },
    PlanSeed {
        slug: "pro",
        name: "Pro",
        price_cents: 4900,
        max_products: None,
        max_posts: None,
        max_messages: Some(2000),
        max_staff: 5,
        custom_domain: true,
        theme_access: true,
        branding_removed: true,
    },
    PlanSeed {
        slug: "business",
        name: "Business",
        price_cents: 9900,
        max_products: None,
        max_posts: None,
        max_messages: None,
        max_staff: 20,
        custom_domain: true,
        theme_access: true,
        branding_removed: true,
    },
];

pub fn default_plans() -> Vec<(&'static str, plans::ActiveModel)> {
    let now = Utc::now();
    PLANS
        .iter()
        .enumerate()
        .map(|(order, p)| {
            let model = plans::ActiveModel {
                slug: Set(p.slug.to_string()),
                name: Set(p.name.to_string()),
                price_cents: Set(p.price_cents),
                billing_cycle: Set(BillingCycle::Monthly),
                max_products: Set(p.max_products),
                max_posts_per_month: Set(p.max_posts),
                max_messages_per_month: Set(p.max_messages),
                max_staff_users: Set(p.max_staff),
                has_custom_domain: Set(p.custom_domain),
                has_theme_access: Set(p.theme_access),
                branding_removed: Set(p.branding_removed),
                is_active: Set(true),
                display_order: Set(order as i32),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            (p.slug, model)
        })
        .collect()
}

pub fn default_addons() -> Vec<(&'static str, addons::ActiveModel)> {
    let now = Utc::now();
    // (slug, 名称, 类型, 单价(美分), 每份额度, 可购买的套餐)
    let rows: [(&'static str, &str, AddonType, i64, i32, serde_json::Value); 4] = [
        (
            "message-pack",
            "Message Pack",
            AddonType::MessagePack,
            500,
            100,
            json!(["free", "starter", "pro"]),
        ),
        (
            "staff-seat",
            "Extra Staff Seat",
            AddonType::StaffSeat,
            300,
            1,
            json!(["starter", "pro", "business"]),
        ),
        (
            "product-pack",
            "Product Pack",
            AddonType::ProductPack,
            400,
            50,
            json!(["free", "starter"]),
        ),
        (
            "posts-pack",
            "Posts Pack",
            AddonType::PostsPack,
            300,
            50,
            json!(["free", "starter"]),
        ),
    ];
    rows.into_iter()
        .map(|(slug, name, kind, price, quantity, plans)| {
            let model = addons::ActiveModel {
                slug: Set(slug.to_string()),
                name: Set(name.to_string()),
                addon_type: Set(kind.as_str().to_string()),
                price_cents: Set(price),
                billing_cycle: Set(AddonBillingCycle::Monthly),
                provides_quantity: Set(quantity),
                available_for_plans: Set(plans),
                is_active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            (slug, model)
        })
        .collect()
}
