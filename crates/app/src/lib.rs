//! Trinket session layer: document-store persistence, domain services, and
//! the checkout submission flow for the storefront engine.

pub mod config;
pub mod domain;
pub mod store;
pub mod uuids;
