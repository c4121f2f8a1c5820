//! Data models: report rows and configuration.

pub mod config;
pub mod record;
