//! Core domain types and logic.

pub mod chart;
pub mod dashboard;
pub mod dashboards;
pub mod error;
pub mod format;
pub mod query;
pub mod settings;
pub mod sql;
pub mod stats;
pub mod table;
pub mod view;
