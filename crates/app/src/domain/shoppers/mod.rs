//! Shoppers

pub mod errors;
pub mod models;
pub mod service;

pub use errors::ShoppersServiceError;
pub use service::*;
