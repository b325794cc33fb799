mod common;

use chrono::{Months, Utc};
use sea_orm::{ActiveModelTrait, Set};
use storefront_billing::AppError;
use storefront_billing::entities::{BillingCycle, SubscriptionStatus, plan_entity as plans};
use storefront_billing::utils::add_months;

#[tokio::test]
async fn first_access_creates_free_subscription() {
    let app = common::setup().await;

    let sub = app.billing.get_subscription(7).await.unwrap();

    assert_eq!(sub.plan_slug, "free");
    assert_eq!(sub.status, SubscriptionStatus::Active);
    assert_eq!(
        sub.current_period_end,
        sub.current_period_start
            .checked_add_months(Months::new(1))
            .unwrap()
    );
    assert_eq!(sub.next_billing_date, Some(sub.current_period_end));
    assert_eq!(app.active_count(7).await, 1);

    // 第二次读取不会再创建
    let again = app.billing.get_subscription(7).await.unwrap();
    assert_eq!(again.id, sub.id);
    assert_eq!(app.subscriptions_of(7).await.len(), 1);
}

#[tokio::test]
async fn changing_plan_twice_leaves_one_active_row() {
    let app = common::setup().await;
    let pro = app.plan_id("pro").await;

    let first = app.billing.change_plan(1, pro).await.unwrap();
    assert_eq!(app.active_count(1).await, 1);
    let second = app.billing.change_plan(1, pro).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(app.active_count(1).await, 1);
    let rows = app.subscriptions_of(1).await;
    let first_row = rows.iter().find(|s| s.id == first.id).unwrap();
    assert_eq!(first_row.status, SubscriptionStatus::Expired);
    let current = app.billing.get_subscription(1).await.unwrap();
    assert_eq!(current.id, second.id);
    assert_eq!(current.plan_slug, "pro");
}

#[tokio::test]
async fn upgrade_then_downgrade_archives_every_previous_row() {
    let app = common::setup().await;
    let starter = app.plan_id("starter").await;
    let business = app.plan_id("business").await;

    app.billing.get_subscription(3).await.unwrap();
    app.billing.upgrade(3, business).await.unwrap();
    let current = app.billing.downgrade(3, starter).await.unwrap();

    let rows = app.subscriptions_of(3).await;
    assert_eq!(rows.len(), 3);
    for row in rows {
        if row.id == current.id {
            assert_eq!(row.status, SubscriptionStatus::Active);
        } else {
            assert_eq!(row.status, SubscriptionStatus::Expired);
        }
    }
}

#[tokio::test]
async fn unknown_plan_is_not_found_and_changes_nothing() {
    let app = common::setup().await;
    let before = app.billing.get_subscription(2).await.unwrap();

    let err = app.billing.change_plan(2, 9_999).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    let after = app.billing.get_subscription(2).await.unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn paid_plan_is_charged_and_free_plan_is_not() {
    let app = common::setup().await;
    let pro = app.plan_id("pro").await;
    let free = app.plan_id("free").await;

    app.billing.change_plan(4, pro).await.unwrap();
    app.billing.change_plan(4, free).await.unwrap();

    let charges = app.payments.charged();
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].0, 4900);
}

#[tokio::test]
async fn declined_payment_keeps_current_plan() {
    let app = common::setup_with_payments(false).await;
    let pro = app.plan_id("pro").await;

    let err = app.billing.change_plan(5, pro).await.unwrap_err();

    assert!(matches!(err, AppError::PaymentDeclined(_)));
    let sub = app.billing.get_subscription(5).await.unwrap();
    assert_eq!(sub.plan_slug, "free");
}

#[tokio::test]
async fn yearly_plan_gets_a_twelve_month_period() {
    let app = common::setup().await;
    let now = Utc::now();
    let yearly = plans::ActiveModel {
        slug: Set("pro-yearly".into()),
        name: Set("Pro (yearly)".into()),
        price_cents: Set(0),
        billing_cycle: Set(BillingCycle::Yearly),
        max_products: Set(None),
        max_posts_per_month: Set(None),
        max_messages_per_month: Set(Some(2000)),
        max_staff_users: Set(5),
        has_custom_domain: Set(true),
        has_theme_access: Set(true),
        branding_removed: Set(true),
        is_active: Set(true),
        display_order: Set(9),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&app.pool)
    .await
    .unwrap();

    let sub = app.billing.change_plan(6, yearly.id).await.unwrap();

    assert_eq!(
        sub.current_period_end,
        add_months(sub.current_period_start, 12)
    );
}

#[tokio::test]
async fn cancel_and_reactivate_only_toggle_the_flag() {
    let app = common::setup().await;
    let before = app.billing.get_subscription(8).await.unwrap();

    let cancelled = app.billing.cancel(8).await.unwrap();
    assert!(cancelled.cancel_at_period_end);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(cancelled.status, SubscriptionStatus::Active);
    assert_eq!(cancelled.id, before.id);
    assert_eq!(cancelled.current_period_end, before.current_period_end);

    let reactivated = app.billing.reactivate(8).await.unwrap();
    assert!(!reactivated.cancel_at_period_end);
    assert!(reactivated.cancelled_at.is_none());
    assert_eq!(reactivated.status, SubscriptionStatus::Active);
    assert_eq!(app.subscriptions_of(8).await.len(), 1);
}
