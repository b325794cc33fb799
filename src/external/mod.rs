pub mod payment;
pub mod products;

pub use payment::*;
pub use products::*;
