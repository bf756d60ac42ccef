//! Core translation engine module

pub mod config;
pub mod context;
pub mod cost_ledger;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod pricing;
pub mod prompt;
pub mod provider;
pub mod providers;
