//! Community GraphQL Server Library

pub mod api;
pub mod auth;
pub mod channel;
pub mod community;
pub mod config;
pub mod db;
pub mod graphql;
pub mod metrics_exporter;
pub mod supervisor;
pub mod telemetry;
pub mod validation;

pub mod test_helpers;
