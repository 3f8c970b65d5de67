//! Shared utilities for the walk rewards backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Great-circle distance between coordinates
//! - Common validation logic

pub mod geo;
pub mod validation;
