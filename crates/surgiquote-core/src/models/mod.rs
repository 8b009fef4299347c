//! Data models.

pub mod config;
pub mod quote;
pub mod report;
