pub mod catalog;
pub mod entitlement;
pub mod rollover;
pub mod subscription;
pub mod usage;

pub use catalog::*;
pub use entitlement::*;
pub use rollover::*;
pub use subscription::*;
pub use usage::*;
