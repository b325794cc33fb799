use crate::error::AppResult;
use crate::models::EffectiveLimits;
use crate::services::{AddonService, SubscriptionService};

/// Composes the active subscription, its plan and active add-on grants into one
/// [`EffectiveLimits`] view.
///
/// Resolved fresh on every call; nothing is cached.
#[derive(Clone)]
pub struct EntitlementService {
    subscriptions: SubscriptionService,
    addons: AddonService,
}

impl EntitlementService {
    pub fn new(subscriptions: SubscriptionService, addons: AddonService) -> Self {
        Self {
            subscriptions,
            addons,
        }
    }

    pub async fn resolve(&self, user_id: i64) -> AppResult<EffectiveLimits> {
        let sub = self.subscriptions.get_active(user_id).await?;
        let plan = self.subscriptions.plan_of(&sub).await?;
        let mut limits = EffectiveLimits::from_plan(&plan);

        for (grant, addon) in self.addons.active_grants(user_id).await? {
            match addon.kind() {
                Some(kind) => {
                    let quantity =
                        i64::from(addon.provides_quantity) * i64::from(grant.quantity_purchased);
                    limits.apply_addon(kind, quantity);
                }
                None => {
                    // 未知类型（配置错误）- 忽略，不影响其它额度
                    log::warn!(
                        "Ignoring addon '{}' with unknown type '{}' for user {user_id}",
                        addon.slug,
                        addon.addon_type
                    );
                }
            }
        }

        Ok(limits)
    }
}
