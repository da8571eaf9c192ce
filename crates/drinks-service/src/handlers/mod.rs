//! HTTP request handlers for the drinks service.

pub mod drinks;
pub mod health;
pub mod me;

pub use health::health_check;
pub use me::get_me;
