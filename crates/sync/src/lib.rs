//! Batch runner for the walk rewards engine.

pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod sync_job;
