pub mod addon_service;
pub mod billing_service;
pub mod catalog_service;
pub mod entitlement_service;
pub mod rollover_service;
pub mod subscription_service;
pub mod usage_service;

pub use addon_service::*;
pub use billing_service::*;
pub use catalog_service::*;
pub use entitlement_service::*;
pub use rollover_service::*;
pub use subscription_service::*;
pub use usage_service::*;
