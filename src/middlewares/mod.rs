pub mod limit_guard;

pub use limit_guard::*;
