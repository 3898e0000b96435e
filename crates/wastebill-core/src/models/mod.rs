//! Data models and configuration.

pub mod config;
pub mod statement;
pub mod validation;
