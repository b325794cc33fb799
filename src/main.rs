use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;
use std::time::Duration;

use storefront_billing::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{DbProductCounter, StubPaymentGateway},
    services::BillingService,
    tasks,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().context("Failed to load configuration")?;

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let products = Arc::new(DbProductCounter::new(
        pool.clone(),
        &config.billing.products_table,
        &config.billing.product_owner_column,
    ));
    let billing = BillingService::new(
        pool.clone(),
        &config.billing,
        products,
        Arc::new(StubPaymentGateway),
    );

    if config.billing.seed_catalog {
        billing
            .catalog()
            .seed_defaults()
            .await
            .context("Failed to seed plan catalog")?;
    }

    let handles = tasks::spawn_all(
        billing.rollover().clone(),
        Duration::from_secs(config.billing.rollover_interval_secs),
    );
    log::info!(
        "Billing worker started (rollover every {}s)",
        config.billing.rollover_interval_secs
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    log::info!("Shutting down billing worker");
    for handle in handles {
        handle.abort();
    }
    Ok(())
}
