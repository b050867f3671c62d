//! # CDEK Proxy Library
//!
//! Backend proxy for the CDEK logistics API. Location, pickup-point, tariff
//! and order requests are forwarded with a server-held credential, or served
//! from static demo data when no credentials are configured. Payment and
//! notification endpoints are stubs.
//!
//! Modules:
//! - `cache`: the shared carrier credential and its refresh logic
//! - `carrier`: live and demo implementations of the logistics operations
//! - `upstream`: credential exchange and JSON client for the carrier API
//! - `routes`: HTTP handlers
//! - `config`: YAML configuration, env expansion and validation

pub mod cache;
pub mod carrier;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod routes;
pub mod server;
pub mod upstream;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::types::ServiceConfig;
pub use crate::error::ApiError;
