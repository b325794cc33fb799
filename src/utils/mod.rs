pub mod period;

pub use period::{add_months, days_until, period_month};
