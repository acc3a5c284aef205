//! Score accumulation, totals and the save flow for the Kultoura kiosk.
//!
//! # Architecture
//!
//! - [`engine`] -- The [`ScoringEngine`]: one event's score sheet, the
//!   team pointer and the save state machine.
//! - [`totals`] -- Pure total functions for additive and percentage mode.
//! - [`sink`] -- The [`ScoreSink`] extension point and the default
//!   [`LogScoreSink`].
//!
//! # Scoring Modes
//!
//! | Mode | Per-criterion range | Team total |
//! |------|---------------------|------------|
//! | Additive | `0..=max_score` | plain sum |
//! | Percentage | `0..=100` | `sum(score / 100 * weight)`, rescaled to 100 when weights do not sum to 100 |
//!
//! All arithmetic uses [`Decimal`]. The engine never panics; invalid input
//! is returned as a [`ScoringError`].

use rust_decimal::Decimal;

pub mod engine;
pub mod sink;
pub mod totals;

// Re-export primary types at crate root.
pub use engine::{DEFAULT_SAVED_DISPLAY_MS, ScoringEngine};
pub use sink::{DEFAULT_LOG_SINK_DELAY_MS, LogScoreSink, SaveError, ScoreSink};

/// Errors returned by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    /// The team is not part of the loaded event.
    #[error("unknown team: {0}")]
    UnknownTeam(String),

    /// The criterion is not part of the loaded event.
    #[error("unknown criterion: {0}")]
    UnknownCriterion(String),

    /// A score fell outside the criterion's valid range.
    #[error("score {value} for criterion {criterion_id} is outside 0..={max}")]
    ScoreOutOfRange {
        /// The criterion being scored.
        criterion_id: String,
        /// The rejected value.
        value: Decimal,
        /// The criterion's upper bound.
        max: Decimal,
    },

    /// A save was requested while another was still in flight.
    #[error("a save is already in progress")]
    SaveInProgress,

    /// The score sink rejected the submission.
    #[error(transparent)]
    Save(#[from] SaveError),
}
