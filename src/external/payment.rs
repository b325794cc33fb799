use crate::error::AppResult;
use async_trait::async_trait;

/// Payment authorization seam. Real capture lives outside this crate.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns `false` when the charge is declined.
    async fn authorize(&self, amount_cents: i64, description: &str) -> AppResult<bool>;
}

/// 占位支付：永远成功，只记录日志
#[derive(Clone, Debug, Default)]
pub struct StubPaymentGateway;

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn authorize(&self, amount_cents: i64, description: &str) -> AppResult<bool> {
        log::info!("Stub payment authorized: {amount_cents} cents ({description})");
        Ok(true)
    }
}
