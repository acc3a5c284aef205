//! The per-session scoring engine.
//!
//! A [`ScoringEngine`] owns one event's [`ScoreSheet`], the pointer to the
//! team currently on stage, and the save state machine:
//!
//! ```text
//! Idle -> Saving -> Saved --(saved_display elapses)--> Idle
//!            \----> Error --(new save request)------> Saving
//! ```
//!
//! The engine never talks to the state store. The judge session moves its
//! team pointer; the presentation layer feeds it scores.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use kultoura_types::{
    Criterion, EventDefinition, SaveStatus, ScoreSheet, ScoreSubmission, Team, TeamId,
};

use crate::sink::{SaveError, ScoreSink};
use crate::totals;
use crate::ScoringError;

/// How long `Saved` is reported before the engine reads as idle again.
pub const DEFAULT_SAVED_DISPLAY_MS: u64 = 2000;

/// Scoring session for a single event.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    event: EventDefinition,
    sheet: ScoreSheet,
    current_index: usize,
    station: Option<String>,
    status: SaveStatus,
    saved_at: Option<Instant>,
    saved_display: Duration,
}

impl ScoringEngine {
    /// Load `event` and zero every team × criterion score.
    pub fn new(event: EventDefinition) -> Self {
        let sheet = ScoreSheet::zeroed(&event);
        Self {
            event,
            sheet,
            current_index: 0,
            station: None,
            status: SaveStatus::Idle,
            saved_at: None,
            saved_display: Duration::from_millis(DEFAULT_SAVED_DISPLAY_MS),
        }
    }

    /// Label submissions with a judging station name.
    #[must_use]
    pub fn with_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    /// Override how long a successful save is reported as `Saved`.
    #[must_use]
    pub const fn with_saved_display(mut self, saved_display: Duration) -> Self {
        self.saved_display = saved_display;
        self
    }

    /// The loaded event.
    pub const fn event(&self) -> &EventDefinition {
        &self.event
    }

    /// The current score sheet.
    pub const fn sheet(&self) -> &ScoreSheet {
        &self.sheet
    }

    // -----------------------------------------------------------------------
    // Scores
    // -----------------------------------------------------------------------

    /// Record a score after checking the team, the criterion and the range.
    ///
    /// On error the sheet is left unchanged.
    pub fn set_score(
        &mut self,
        team_id: &str,
        criterion_id: &str,
        value: Decimal,
    ) -> Result<(), ScoringError> {
        let team = self.team_by_id(team_id)?.id.clone();
        let criterion = self.criterion_by_id(criterion_id)?;
        let max = criterion.upper_bound(self.event.scoring_mode);

        if value < Decimal::ZERO || value > max {
            return Err(ScoringError::ScoreOutOfRange {
                criterion_id: criterion.id.to_string(),
                value,
                max,
            });
        }

        let criterion = criterion.id.clone();
        self.sheet.set(&team, &criterion, value);
        Ok(())
    }

    /// Clamp `value` into the valid range of `criterion_id`.
    pub fn clamp_score(&self, criterion_id: &str, value: Decimal) -> Result<Decimal, ScoringError> {
        let criterion = self.criterion_by_id(criterion_id)?;
        let max = criterion.upper_bound(self.event.scoring_mode);
        Ok(value.clamp(Decimal::ZERO, max))
    }

    /// Raw score for one cell.
    pub fn score(&self, team_id: &str, criterion_id: &str) -> Decimal {
        self.sheet.get(team_id, criterion_id)
    }

    /// Zero every score of one team. Other teams are untouched.
    pub fn reset_team(&mut self, team_id: &str) -> Result<(), ScoringError> {
        let team = self.team_by_id(team_id)?.id.clone();
        self.sheet.reset_team(&self.event, &team);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Totals
    // -----------------------------------------------------------------------

    /// Exact sum of the team's scores.
    pub fn compute_additive_total(&self, team_id: &str) -> Decimal {
        totals::additive_total(self.sheet.team(team_id))
    }

    /// Weighted percentage total of the team, normalized to 0-100.
    pub fn compute_percentage_total(&self, team_id: &str) -> Decimal {
        totals::percentage_total(&self.event, self.sheet.team(team_id))
    }

    /// Total of the team in the event's scoring mode.
    pub fn compute_total(&self, team_id: &str) -> Decimal {
        totals::team_total(&self.event, self.sheet.team(team_id))
    }

    /// Highest total a team can reach.
    pub fn max_possible_score(&self) -> Decimal {
        totals::max_possible(&self.event)
    }

    /// Totals of every team on the sheet.
    pub fn totals(&self) -> BTreeMap<TeamId, Decimal> {
        self.event
            .teams
            .iter()
            .map(|team| (team.id.clone(), self.compute_total(team.id.as_str())))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Index of the team on stage.
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// The team on stage, if the event has any teams.
    pub fn current_team(&self) -> Option<&Team> {
        self.event.teams.get(self.current_index)
    }

    /// Move the pointer to `index`, clamped to the team list. Returns the
    /// resulting index.
    pub fn select_team(&mut self, index: usize) -> usize {
        self.current_index = index.min(self.last_index());
        self.current_index
    }

    /// Move the pointer by `delta` without wrapping. Returns the resulting
    /// index.
    pub fn advance(&mut self, delta: isize) -> usize {
        let target = self.current_index.saturating_add_signed(delta);
        self.select_team(target)
    }

    /// Point at the team with `team_id`. Unknown ids leave the pointer
    /// where it is and return `None`.
    pub fn select_team_by_id(&mut self, team_id: &str) -> Option<usize> {
        let index = self.event.team_index(team_id)?;
        Some(self.select_team(index))
    }

    fn last_index(&self) -> usize {
        self.event.teams.len().saturating_sub(1)
    }

    // -----------------------------------------------------------------------
    // Saving
    // -----------------------------------------------------------------------

    /// Current save status. `Saved` reads as `Idle` once the display window
    /// has elapsed.
    pub fn save_status(&self) -> SaveStatus {
        match (self.status, self.saved_at) {
            (SaveStatus::Saved, Some(at)) if at.elapsed() >= self.saved_display => {
                SaveStatus::Idle
            }
            (status, _) => status,
        }
    }

    /// Enter `Saving` and build the submission to hand to a sink.
    ///
    /// Rejected while another save is in flight.
    pub fn begin_save(&mut self) -> Result<ScoreSubmission, ScoringError> {
        if self.status == SaveStatus::Saving {
            return Err(ScoringError::SaveInProgress);
        }

        self.status = SaveStatus::Saving;
        self.saved_at = None;

        Ok(ScoreSubmission {
            id: Uuid::now_v7(),
            event_id: self.event.id.clone(),
            station: self.station.clone(),
            scoring_mode: self.event.scoring_mode,
            sheet: self.sheet.clone(),
            totals: self.totals(),
            submitted_at: Utc::now(),
        })
    }

    /// Resolve an in-flight save with the sink's answer.
    pub fn finish_save(&mut self, result: Result<(), SaveError>) -> Result<(), ScoringError> {
        match result {
            Ok(()) => {
                self.status = SaveStatus::Saved;
                self.saved_at = Some(Instant::now());
                Ok(())
            }
            Err(e) => {
                self.status = SaveStatus::Error;
                self.saved_at = None;
                Err(ScoringError::Save(e))
            }
        }
    }

    /// Abandon an in-flight save, e.g. when the session is torn down.
    pub fn cancel_save(&mut self) {
        if self.status == SaveStatus::Saving {
            self.status = SaveStatus::Idle;
        }
    }

    /// Run a full save through `sink`.
    pub async fn save<S: ScoreSink>(&mut self, sink: &S) -> Result<(), ScoringError> {
        let submission = self.begin_save()?;
        info!(
            event_id = %submission.event_id,
            sink = sink.name(),
            "Saving scores"
        );

        let result = sink.submit(&submission).await;
        if let Err(e) = &result {
            error!(
                event_id = %submission.event_id,
                sink = sink.name(),
                error = %e,
                "Failed to save scores"
            );
        }
        self.finish_save(result)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    fn team_by_id(&self, team_id: &str) -> Result<&Team, ScoringError> {
        self.event
            .team(team_id)
            .ok_or_else(|| ScoringError::UnknownTeam(team_id.to_owned()))
    }

    fn criterion_by_id(&self, criterion_id: &str) -> Result<&Criterion, ScoringError> {
        self.event
            .criterion(criterion_id)
            .ok_or_else(|| ScoringError::UnknownCriterion(criterion_id.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use kultoura_types::{CriterionId, EventId, ScoringMode};

    use super::*;
    use crate::sink::LogScoreSink;

    fn festival_dance() -> EventDefinition {
        EventDefinition {
            id: EventId::from("festival-dance"),
            title: String::from("Festival Dance"),
            description: String::new(),
            scoring_mode: ScoringMode::Additive,
            teams: ["team1", "team2", "team3", "team4"]
                .into_iter()
                .map(|id| Team {
                    id: TeamId::from(id),
                    name: id.to_owned(),
                    performance: String::new(),
                    members: 0,
                })
                .collect(),
            criteria: [("technique", 30), ("authenticity", 25), ("costume", 20)]
                .into_iter()
                .map(|(id, max)| Criterion {
                    id: CriterionId::from(id),
                    name: id.to_owned(),
                    description: String::new(),
                    max_score: Some(max),
                    percentage: None,
                })
                .collect(),
        }
    }

    struct FailingSink;

    impl ScoreSink for FailingSink {
        async fn submit(&self, _submission: &ScoreSubmission) -> Result<(), SaveError> {
            Err(SaveError::Backend(String::from("disk full")))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn new_session_starts_zeroed() {
        let engine = ScoringEngine::new(festival_dance());
        assert_eq!(engine.sheet().team_count(), 4);
        assert_eq!(engine.compute_total("team3"), Decimal::ZERO);
        assert_eq!(engine.save_status(), SaveStatus::Idle);
        assert_eq!(engine.max_possible_score(), Decimal::from(75));
    }

    #[test]
    fn additive_total_and_reset_are_per_team() {
        let mut engine = ScoringEngine::new(festival_dance());
        assert!(engine.set_score("team1", "technique", Decimal::from(27)).is_ok());
        assert!(engine.set_score("team1", "costume", Decimal::new(155, 1)).is_ok());
        assert!(engine.set_score("team2", "technique", Decimal::from(10)).is_ok());

        assert_eq!(engine.compute_additive_total("team1"), Decimal::new(425, 1));

        assert!(engine.reset_team("team1").is_ok());
        assert_eq!(engine.compute_total("team1"), Decimal::ZERO);
        assert_eq!(engine.compute_total("team2"), Decimal::from(10));
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        let mut engine = ScoringEngine::new(festival_dance());
        assert!(engine.set_score("team1", "costume", Decimal::from(5)).is_ok());

        let too_high = engine.set_score("team1", "costume", Decimal::from(21));
        assert!(matches!(too_high, Err(ScoringError::ScoreOutOfRange { .. })));
        let negative = engine.set_score("team1", "costume", Decimal::from(-1));
        assert!(matches!(negative, Err(ScoringError::ScoreOutOfRange { .. })));

        assert_eq!(engine.score("team1", "costume"), Decimal::from(5));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut engine = ScoringEngine::new(festival_dance());
        assert!(matches!(
            engine.set_score("team9", "costume", Decimal::ONE),
            Err(ScoringError::UnknownTeam(_))
        ));
        assert!(matches!(
            engine.set_score("team1", "vibes", Decimal::ONE),
            Err(ScoringError::UnknownCriterion(_))
        ));
        assert!(engine.reset_team("team9").is_err());
    }

    #[test]
    fn clamp_score_respects_mode_bounds() {
        let mut event = festival_dance();
        let engine = ScoringEngine::new(event.clone());
        assert_eq!(
            engine.clamp_score("technique", Decimal::from(45)).ok(),
            Some(Decimal::from(30))
        );
        assert_eq!(
            engine.clamp_score("technique", Decimal::from(-3)).ok(),
            Some(Decimal::ZERO)
        );

        event.scoring_mode = ScoringMode::Percentage;
        let engine = ScoringEngine::new(event);
        assert_eq!(
            engine.clamp_score("technique", Decimal::from(45)).ok(),
            Some(Decimal::from(45))
        );
    }

    #[test]
    fn pointer_is_clamped_without_wraparound() {
        let mut engine = ScoringEngine::new(festival_dance());
        assert_eq!(engine.advance(-1), 0);
        assert_eq!(engine.advance(2), 2);
        assert_eq!(engine.advance(10), 3);
        assert_eq!(engine.select_team(99), 3);
        assert_eq!(engine.advance(-100), 0);
        assert_eq!(engine.current_team().map(|t| t.id.as_str()), Some("team1"));
    }

    #[test]
    fn select_by_id_keeps_pointer_on_unknown_team() {
        let mut engine = ScoringEngine::new(festival_dance());
        assert_eq!(engine.select_team_by_id("team2"), Some(1));
        assert_eq!(engine.select_team_by_id("ghost"), None);
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn empty_team_list_keeps_pointer_at_zero() {
        let mut event = festival_dance();
        event.teams.clear();
        let mut engine = ScoringEngine::new(event);
        assert_eq!(engine.advance(1), 0);
        assert!(engine.current_team().is_none());
    }

    #[test]
    fn second_save_while_saving_is_rejected() {
        let mut engine = ScoringEngine::new(festival_dance());
        let first = engine.begin_save();
        assert!(first.is_ok());
        assert_eq!(engine.save_status(), SaveStatus::Saving);
        assert!(matches!(engine.begin_save(), Err(ScoringError::SaveInProgress)));

        engine.cancel_save();
        assert_eq!(engine.save_status(), SaveStatus::Idle);
    }

    #[test]
    fn submission_carries_totals() {
        let mut engine = ScoringEngine::new(festival_dance()).with_station("judge-1");
        assert!(engine.set_score("team4", "authenticity", Decimal::from(20)).is_ok());

        let submission = engine.begin_save();
        assert!(submission.is_ok());
        if let Ok(submission) = submission {
            assert_eq!(submission.station.as_deref(), Some("judge-1"));
            assert_eq!(submission.totals.get("team4"), Some(&Decimal::from(20)));
            assert_eq!(submission.totals.len(), 4);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn successful_save_reverts_to_idle() {
        let mut engine = ScoringEngine::new(festival_dance());
        let sink = LogScoreSink::default();

        assert!(engine.save(&sink).await.is_ok());
        assert_eq!(engine.save_status(), SaveStatus::Saved);

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert_eq!(engine.save_status(), SaveStatus::Saved);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(engine.save_status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_is_retryable() {
        let mut engine = ScoringEngine::new(festival_dance());

        let result = engine.save(&FailingSink).await;
        assert!(matches!(result, Err(ScoringError::Save(SaveError::Backend(_)))));
        assert_eq!(engine.save_status(), SaveStatus::Error);

        assert!(engine.save(&LogScoreSink::default()).await.is_ok());
        assert_eq!(engine.save_status(), SaveStatus::Saved);
    }
}
