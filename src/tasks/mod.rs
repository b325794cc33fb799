//! Background scheduled tasks for the billing worker.
//!
//! Currently a single recurring job: the billing-period rollover sweep.
//! Call `spawn_all` once during startup to launch it.

use crate::services::RolloverService;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn all background tasks.
///
/// Notes
/// - The rollover sweep only selects subscriptions already due, so running it
///   more than once a day is harmless.
/// - Tasks are detached via `tokio::spawn`; the handles are returned so the
///   caller can abort them on shutdown.
pub fn spawn_all(
    rollover_service: RolloverService,
    rollover_interval: Duration,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    // 计费周期滚动（默认每天一次）
    {
        let svc = rollover_service.clone();
        handles.push(tokio::spawn(async move {
            loop {
                log::debug!("Start billing period rollover sweep");
                match svc.run().await {
                    Ok(report) if report.due > 0 => log::info!(
                        "Billing period rollover: {} due, {} rolled over, {} failed",
                        report.due,
                        report.rolled_over,
                        report.failures.len()
                    ),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to run billing period rollover: {e:?}"),
                }
                tokio::time::sleep(rollover_interval).await;
            }
        }));
    }

    handles
}
