pub mod addons;
pub mod plans;
pub mod usage_records;
pub mod user_addons;
pub mod user_subscriptions;

pub use addons as addon_entity;
pub use plans as plan_entity;
pub use usage_records as usage_record_entity;
pub use user_addons as user_addon_entity;
pub use user_subscriptions as user_subscription_entity;

pub use addons::{AddonBillingCycle, AddonType};
pub use plans::BillingCycle;
pub use user_addons::UserAddonStatus;
pub use user_subscriptions::SubscriptionStatus;
