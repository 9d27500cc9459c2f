pub mod affordability;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod regulatory;
pub mod telemetry;
