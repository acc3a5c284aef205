//! Configuration, catalog, admin console and judge reconciliation for the
//! Kultoura scoring kiosk.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `kultoura-config.yaml` into
//!   strongly-typed structs.
//! - [`catalog`] -- The validated [`EventCatalog`] and the built-in events.
//! - [`admin`] -- [`AdminConsole`]: catalog-checked activation and
//!   current-team control.
//! - [`judge`] -- [`JudgeSession`]: reconciles a scoring session with one
//!   store snapshot per poll.
//! - [`selector`] -- [`EventSelector`]: the event-selection view.
//! - [`poller`] -- Fixed-period polling loops with shutdown.
//!
//! # Control Flow
//!
//! ```text
//! admin client --> AdminConsole --> EventStateStore <-- poll -- JudgeSession
//!                                                                   |
//!                                                             ScoringEngine --> ScoreSink
//! ```
//!
//! [`EventCatalog`]: catalog::EventCatalog
//! [`AdminConsole`]: admin::AdminConsole
//! [`JudgeSession`]: judge::JudgeSession
//! [`EventSelector`]: selector::EventSelector

pub mod admin;
pub mod catalog;
pub mod config;
pub mod judge;
pub mod poller;
pub mod selector;
