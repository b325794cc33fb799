use crate::entities::{AddonType, plan_entity as plans};
use serde::{Deserialize, Serialize};

/// Resource a pre-action check guards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    Product,
    Post,
    Message,
    Staff,
}

impl LimitKind {
    /// Usage counter tracked for this kind; products and staff are counted elsewhere.
    pub fn counter(&self) -> Option<UsageCounter> {
        match self {
            LimitKind::Post => Some(UsageCounter::Posts),
            LimitKind::Message => Some(UsageCounter::Messages),
            LimitKind::Product | LimitKind::Staff => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LimitKind::Product => "Product",
            LimitKind::Post => "Monthly post",
            LimitKind::Message => "Monthly message",
            LimitKind::Staff => "Staff seat",
        }
    }

    pub fn remediation(&self) -> &'static str {
        match self {
            LimitKind::Product => "a product pack",
            LimitKind::Post => "a posts pack",
            LimitKind::Message => "a message pack",
            LimitKind::Staff => "a staff seat",
        }
    }
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitKind::Product => write!(f, "product"),
            LimitKind::Post => write!(f, "post"),
            LimitKind::Message => write!(f, "message"),
            LimitKind::Staff => write!(f, "staff"),
        }
    }
}

/// Monthly consumption counters kept in the usage ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UsageCounter {
    Messages,
    Posts,
}

impl UsageCounter {
    pub fn limit_kind(&self) -> LimitKind {
        match self {
            UsageCounter::Messages => LimitKind::Message,
            UsageCounter::Posts => LimitKind::Post,
        }
    }
}

/// Plan limits plus active add-on capacity, resolved for one user at one instant.
///
/// `None` means unlimited. Staff seats are never unlimited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectiveLimits {
    pub plan_slug: String,
    pub max_products: Option<i64>,
    pub max_posts: Option<i64>,
    pub max_messages: Option<i64>,
    pub max_staff: i64,
    pub has_custom_domain: bool,
    pub has_theme_access: bool,
    pub branding_removed: bool,
}

impl EffectiveLimits {
    pub fn from_plan(plan: &plans::Model) -> Self {
        Self {
            plan_slug: plan.slug.clone(),
            max_products: plan.max_products.map(i64::from),
            max_posts: plan.max_posts_per_month.map(i64::from),
            max_messages: plan.max_messages_per_month.map(i64::from),
            max_staff: i64::from(plan.max_staff_users),
            has_custom_domain: plan.has_custom_domain,
            has_theme_access: plan.has_theme_access,
            branding_removed: plan.branding_removed,
        }
    }

    /// Adds capacity from one active add-on grant. Unlimited limits stay unlimited;
    /// staff seats always add.
    pub fn apply_addon(&mut self, kind: AddonType, quantity: i64) {
        fn extend(limit: &mut Option<i64>, quantity: i64) {
            if let Some(l) = limit {
                *l += quantity;
            }
        }

        match kind {
            AddonType::MessagePack => extend(&mut self.max_messages, quantity),
            AddonType::PostsPack => extend(&mut self.max_posts, quantity),
            AddonType::ProductPack => extend(&mut self.max_products, quantity),
            AddonType::StaffSeat => self.max_staff += quantity,
        }
    }

    pub fn limit_for(&self, kind: LimitKind) -> Option<i64> {
        match kind {
            LimitKind::Product => self.max_products,
            LimitKind::Post => self.max_posts,
            LimitKind::Message => self.max_messages,
            LimitKind::Staff => Some(self.max_staff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BillingCycle;
    use chrono::Utc;

    fn plan(max_messages: Option<i32>, max_products: Option<i32>) -> plans::Model {
        plans::Model {
            id: 1,
            slug: "free".into(),
            name: "Free".into(),
            price_cents: 0,
            billing_cycle: BillingCycle::Monthly,
            max_products,
            max_posts_per_month: Some(30),
            max_messages_per_month: max_messages,
            max_staff_users: 1,
            has_custom_domain: false,
            has_theme_access: true,
            branding_removed: false,
            is_active: true,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn message_pack_extends_finite_limit() {
        let mut limits = EffectiveLimits::from_plan(&plan(Some(50), Some(10)));
        limits.apply_addon(AddonType::MessagePack, 100);
        assert_eq!(limits.max_messages, Some(150));
        assert_eq!(limits.max_products, Some(10));
    }

    #[test]
    fn unlimited_stays_unlimited() {
        let mut limits = EffectiveLimits::from_plan(&plan(None, None));
        limits.apply_addon(AddonType::MessagePack, 100);
        limits.apply_addon(AddonType::ProductPack, 25);
        assert_eq!(limits.max_messages, None);
        assert_eq!(limits.max_products, None);
    }

    #[test]
    fn staff_seats_always_add() {
        let mut limits = EffectiveLimits::from_plan(&plan(None, None));
        limits.apply_addon(AddonType::StaffSeat, 2);
        assert_eq!(limits.max_staff, 3);
        assert_eq!(limits.limit_for(LimitKind::Staff), Some(3));
    }

    #[test]
    fn only_posts_and_messages_have_counters() {
        assert_eq!(LimitKind::Post.counter(), Some(UsageCounter::Posts));
        assert_eq!(LimitKind::Message.counter(), Some(UsageCounter::Messages));
        assert_eq!(LimitKind::Product.counter(), None);
        assert_eq!(LimitKind::Staff.counter(), None);
        assert_eq!(UsageCounter::Posts.limit_kind(), LimitKind::Post);
    }

    #[test]
    fn feature_flags_come_from_plan() {
        let mut limits = EffectiveLimits::from_plan(&plan(Some(50), None));
        for kind in [
            AddonType::MessagePack,
            AddonType::StaffSeat,
            AddonType::ProductPack,
            AddonType::PostsPack,
        ] {
            limits.apply_addon(kind, 1);
        }
        assert!(!limits.has_custom_domain);
        assert!(limits.has_theme_access);
    }
}
