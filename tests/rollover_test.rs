mod common;

use chrono::{Duration, Months, Utc};
use sea_orm::ConnectionTrait;
use storefront_billing::entities::SubscriptionStatus;

#[tokio::test]
async fn due_subscription_is_reset_and_advanced_one_month() {
    let app = common::setup().await;
    let sub = app.billing.get_subscription(40).await.unwrap();
    let now = Utc::now();
    let old_end = now - Duration::days(1);
    let old_start = old_end.checked_sub_months(Months::new(1)).unwrap();
    app.set_period(sub.id, old_start, old_end).await;
    app.set_usage(40, 37, 12).await;

    let report = app.billing.rollover().run_at(now).await.unwrap();
    assert_eq!(report.due, 1);
    assert_eq!(report.rolled_over, 1);
    assert!(report.failures.is_empty());

    let rolled = app.billing.get_subscription(40).await.unwrap();
    assert_eq!(rolled.id, sub.id);
    assert_eq!(rolled.status, SubscriptionStatus::Active);
    assert_eq!(rolled.current_period_start, old_end);
    assert_eq!(
        rolled.current_period_end,
        old_end.checked_add_months(Months::new(1)).unwrap()
    );
    assert_eq!(rolled.next_billing_date, Some(rolled.current_period_end));
    assert_eq!(app.usage_of(40).await, (0, 0));

    let record = app.billing.usage().get_or_create_current(40).await.unwrap();
    assert!(record.last_reset_at.is_some());
}

#[tokio::test]
async fn subscriptions_not_yet_due_are_untouched() {
    let app = common::setup().await;
    let sub = app.billing.get_subscription(41).await.unwrap();
    app.set_usage(41, 5, 5).await;

    let report = app.billing.run_period_rollover().await.unwrap();
    assert_eq!(report.due, 0);

    let after = app.billing.get_subscription(41).await.unwrap();
    assert_eq!(after.current_period_end, sub.current_period_end);
    assert_eq!(app.usage_of(41).await, (5, 5));
}

#[tokio::test]
async fn second_sweep_finds_nothing_due() {
    let app = common::setup().await;
    let sub = app.billing.get_subscription(42).await.unwrap();
    let now = Utc::now();
    app.set_period(sub.id, now - Duration::days(31), now - Duration::hours(1))
        .await;

    let first = app.billing.rollover().run_at(now).await.unwrap();
    assert_eq!(first.rolled_over, 1);
    let end_after_first = app
        .billing
        .get_subscription(42)
        .await
        .unwrap()
        .current_period_end;

    let second = app.billing.rollover().run_at(now).await.unwrap();
    assert_eq!(second.due, 0);
    assert_eq!(
        app.billing
            .get_subscription(42)
            .await
            .unwrap()
            .current_period_end,
        end_after_first
    );
}

#[tokio::test]
async fn long_periods_still_advance_by_one_month() {
    let app = common::setup().await;
    let pro = app.plan_id("pro").await;
    let sub = app.billing.change_plan(43, pro).await.unwrap();
    let now = Utc::now();
    let old_end = now - Duration::minutes(5);
    let old_start = old_end.checked_sub_months(Months::new(12)).unwrap();
    app.set_period(sub.id, old_start, old_end).await;

    app.billing.rollover().run_at(now).await.unwrap();

    let rolled = app.billing.get_subscription(43).await.unwrap();
    assert_eq!(
        rolled.current_period_end,
        old_end.checked_add_months(Months::new(1)).unwrap()
    );
}

#[tokio::test]
async fn sweep_handles_every_due_user_and_skips_archived_rows() {
    let app = common::setup().await;
    let now = Utc::now();
    let starter = app.plan_id("starter").await;

    for user_id in [44, 45, 46] {
        let sub = app.billing.get_subscription(user_id).await.unwrap();
        app.set_period(sub.id, now - Duration::days(40), now - Duration::days(10))
            .await;
        app.set_usage(user_id, 9, 9).await;
    }
    // 用户 46 换了套餐：旧记录已归档，新记录未到期
    app.billing.change_plan(46, starter).await.unwrap();

    let report = app.billing.rollover().run_at(now).await.unwrap();
    assert_eq!(report.due, 2);
    assert_eq!(report.rolled_over, 2);
    assert_eq!(app.usage_of(44).await, (0, 0));
    assert_eq!(app.usage_of(45).await, (0, 0));
    assert_eq!(app.usage_of(46).await, (9, 9));
    assert_eq!(app.active_count(46).await, 1);
}

#[tokio::test]
async fn one_failing_user_does_not_stop_the_sweep() {
    let app = common::setup().await;
    let now = Utc::now();
    let old_end = now - Duration::days(2);
    let old_start = old_end.checked_sub_months(Months::new(1)).unwrap();

    let failing = app.billing.get_subscription(90).await.unwrap();
    let healthy = app.billing.get_subscription(91).await.unwrap();
    for sub in [&failing, &healthy] {
        app.set_period(sub.id, old_start, old_end).await;
    }
    app.set_usage(90, 20, 4).await;
    app.set_usage(91, 20, 4).await;

    // 用户 90 的用量记录无法更新
    app.pool
        .execute_unprepared(
            "CREATE TRIGGER usage_locked BEFORE UPDATE ON usage_records \
             WHEN OLD.user_id = 90 BEGIN SELECT RAISE(ABORT, 'usage row locked'); END",
        )
        .await
        .unwrap();

    let report = app.billing.rollover().run_at(now).await.unwrap();
    assert_eq!(report.due, 2);
    assert_eq!(report.rolled_over, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].user_id, 90);
    assert_eq!(report.failures[0].subscription_id, failing.id);
    assert!(report.failures[0].reason.contains("usage row locked"));

    assert_eq!(app.usage_of(91).await, (0, 0));
    let advanced = app.billing.get_subscription(91).await.unwrap();
    assert_eq!(advanced.current_period_start, old_end);

    // 失败的事务整体回滚
    assert_eq!(app.usage_of(90).await, (20, 4));
    let stuck = app.billing.get_subscription(90).await.unwrap();
    assert_eq!(stuck.current_period_end, old_end);
    assert_eq!(stuck.current_period_start, old_start);
}
