//! Domain layer for the walk rewards engine.
//!
//! This crate contains:
//! - Domain models (GeofenceEvent, Walk, User, ChallengeRecord, RewardTable)
//! - Walk reconciliation and attribution
//! - Challenge evaluation and reward reporting

pub mod models;
pub mod services;
