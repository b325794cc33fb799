use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, DeriveActiveEnum, EnumIter)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AddonBillingCycle {
    #[sea_orm(string_value = "one_time")]
    OneTime,
    #[sea_orm(string_value = "monthly")]
    Monthly,
}

impl std::fmt::Display for AddonBillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddonBillingCycle::OneTime => write!(f, "one_time"),
            AddonBillingCycle::Monthly => write!(f, "monthly"),
        }
    }
}

/// Which effective limit an add-on extends.
///
/// Stored as plain text so a row written by a newer catalog (an add-on type this
/// build does not know) is still loadable; see [`Model::kind`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AddonType {
    MessagePack,
    StaffSeat,
    ProductPack,
    PostsPack,
}

impl AddonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonType::MessagePack => "message_pack",
            AddonType::StaffSeat => "staff_seat",
            AddonType::ProductPack => "product_pack",
            AddonType::PostsPack => "posts_pack",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "message_pack" => Some(AddonType::MessagePack),
            "staff_seat" => Some(AddonType::StaffSeat),
            "product_pack" => Some(AddonType::ProductPack),
            "posts_pack" => Some(AddonType::PostsPack),
            _ => None,
        }
    }
}

impl std::fmt::Display for AddonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "addons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub addon_type: String,
    pub price_cents: i64,
    pub billing_cycle: AddonBillingCycle,
    /// 每份增加的额度
    pub provides_quantity: i32,
    /// JSON 数组，元素为套餐 slug
    pub available_for_plans: Json,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Typed add-on kind; `None` for a type string this build does not handle.
    pub fn kind(&self) -> Option<AddonType> {
        AddonType::parse(&self.addon_type)
    }

    pub fn applicable_plans(&self) -> Vec<String> {
        self.available_for_plans
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_available_for(&self, plan_slug: &str) -> bool {
        self.applicable_plans().iter().any(|s| s == plan_slug)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_addons::Entity")]
    UserAddons,
}

impl Related<super::user_addons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAddons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn addon(addon_type: &str, plans: serde_json::Value) -> Model {
        Model {
            id: 1,
            slug: "message-pack".into(),
            name: "Message Pack".into(),
            addon_type: addon_type.into(),
            price_cents: 500,
            billing_cycle: AddonBillingCycle::Monthly,
            provides_quantity: 100,
            available_for_plans: plans,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_known_types_and_rejects_unknown() {
        assert_eq!(addon("message_pack", json!([])).kind(), Some(AddonType::MessagePack));
        assert_eq!(addon("staff_seat", json!([])).kind(), Some(AddonType::StaffSeat));
        assert_eq!(addon("storage_pack", json!([])).kind(), None);
    }

    #[test]
    fn plan_availability_reads_json_array() {
        let a = addon("posts_pack", json!(["free", "starter"]));
        assert!(a.is_available_for("starter"));
        assert!(!a.is_available_for("pro"));

        let malformed = addon("posts_pack", json!({"plans": "free"}));
        assert!(malformed.applicable_plans().is_empty());
    }
}
