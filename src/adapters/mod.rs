//! Concrete adapter implementations for ports.

pub mod chart_svg;
pub mod csv_export;
pub mod file_config_adapter;
#[cfg(feature = "postgres")]
pub mod postgres_adapter;
pub mod query_cache;
#[cfg(feature = "web")]
pub mod web;
