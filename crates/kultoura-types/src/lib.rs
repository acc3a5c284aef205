//! Shared type definitions for the Kultoura scoring kiosk.
//!
//! This crate is the single source of truth for the data that flows
//! between the admin console, the state store, the scoring engine and
//! the kiosk HTTP API. Types flow downstream to `TypeScript` via `ts-rs`
//! for the presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for event, team and criterion ids
//! - [`catalog`] -- Static catalog entries (events, teams, criteria, mode)
//! - [`state`] -- The persisted [`EventState`] activation record
//! - [`scores`] -- Score sheets, save status and submissions

pub mod catalog;
pub mod ids;
pub mod scores;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use catalog::{Criterion, EventDefinition, PERCENTAGE_SCALE, ScoringMode, Team};
pub use ids::{CriterionId, EventId, TeamId};
pub use scores::{SaveStatus, ScoreSheet, ScoreSubmission, TeamScores};
pub use state::{EventOverview, EventState};
