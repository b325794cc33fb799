pub mod connection;
pub mod seed;

pub use connection::*;
