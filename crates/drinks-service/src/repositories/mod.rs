//! Database repositories for the drinks service.

pub mod drinks;

pub use drinks::DrinksRepository;
