// pod-relay/src/lib.rs

//! Relays paid storefront orders to a print-on-demand provider.
//!
//! A signed `orders/paid` webhook is verified, stored, checked against the POD
//! catalog and, when it carries POD items, forwarded to the provider. Every
//! dispatch decision is recorded next to the order and served back through a small
//! JSON API for the dashboard.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
