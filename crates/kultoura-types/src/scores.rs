//! Score sheets, save status and submissions.
//!
//! A [`ScoreSheet`] lives only for one scoring session. When a judge
//! saves, the sheet and its totals are wrapped in a [`ScoreSubmission`]
//! and handed to whatever score sink the station is configured with.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{EventDefinition, ScoringMode};
use crate::ids::{CriterionId, EventId, TeamId};

/// Scores of one team keyed by criterion.
pub type TeamScores = BTreeMap<CriterionId, Decimal>;

/// Team × criterion matrix of raw scores for one event.
///
/// Serializes as a nested JSON object: `{ "team1": { "technique": "25" } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScoreSheet(
    #[ts(type = "Record<string, Record<string, string>>")] pub BTreeMap<TeamId, TeamScores>,
);

impl ScoreSheet {
    /// A sheet with every team × criterion pair of `event` set to zero.
    pub fn zeroed(event: &EventDefinition) -> Self {
        let sheet = event
            .teams
            .iter()
            .map(|team| (team.id.clone(), zero_scores(event)))
            .collect();
        Self(sheet)
    }

    /// Raw score for one cell; unset cells read as zero.
    pub fn get(&self, team_id: &str, criterion_id: &str) -> Decimal {
        self.0
            .get(team_id)
            .and_then(|scores| scores.get(criterion_id))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Overwrite one cell.
    pub fn set(&mut self, team_id: &TeamId, criterion_id: &CriterionId, value: Decimal) {
        self.0
            .entry(team_id.clone())
            .or_default()
            .insert(criterion_id.clone(), value);
    }

    /// All scores recorded for `team_id`.
    pub fn team(&self, team_id: &str) -> Option<&TeamScores> {
        self.0.get(team_id)
    }

    /// Replace the scores of `team_id` with zeros for every criterion of
    /// `event`.
    pub fn reset_team(&mut self, event: &EventDefinition, team_id: &TeamId) {
        self.0.insert(team_id.clone(), zero_scores(event));
    }

    /// Number of teams on the sheet.
    pub fn team_count(&self) -> usize {
        self.0.len()
    }
}

fn zero_scores(event: &EventDefinition) -> TeamScores {
    event
        .criteria
        .iter()
        .map(|c| (c.id.clone(), Decimal::ZERO))
        .collect()
}

/// Progress of the most recent save request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SaveStatus {
    /// Ready; no save in flight.
    #[default]
    Idle,
    /// A save is in flight.
    Saving,
    /// The last save succeeded (shown briefly, then back to idle).
    Saved,
    /// The last save failed; a new save request retries.
    Error,
}

/// A saved score sheet as handed to a score sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScoreSubmission {
    /// Unique submission id (UUID v7, time-ordered).
    pub id: Uuid,
    /// The event the sheet belongs to.
    pub event_id: EventId,
    /// Optional label of the judging station that saved it.
    #[serde(default)]
    pub station: Option<String>,
    /// Scoring mode the totals were computed in.
    pub scoring_mode: ScoringMode,
    /// The raw scores.
    pub sheet: ScoreSheet,
    /// Per-team totals in the event's scoring mode.
    #[ts(type = "Record<string, string>")]
    pub totals: BTreeMap<TeamId, Decimal>,
    /// When the save was requested.
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Criterion, Team};

    fn event() -> EventDefinition {
        EventDefinition {
            id: EventId::from("festival-dance"),
            title: String::from("Festival Dance"),
            description: String::new(),
            scoring_mode: ScoringMode::Additive,
            teams: ["team1", "team2"]
                .into_iter()
                .map(|id| Team {
                    id: TeamId::from(id),
                    name: id.to_owned(),
                    performance: String::new(),
                    members: 4,
                })
                .collect(),
            criteria: ["technique", "costume"]
                .into_iter()
                .map(|id| Criterion {
                    id: CriterionId::from(id),
                    name: id.to_owned(),
                    description: String::new(),
                    max_score: Some(20),
                    percentage: None,
                })
                .collect(),
        }
    }

    #[test]
    fn zeroed_sheet_covers_every_cell() {
        let sheet = ScoreSheet::zeroed(&event());
        assert_eq!(sheet.team_count(), 2);
        assert_eq!(sheet.team("team1").map(BTreeMap::len), Some(2));
        assert_eq!(sheet.get("team2", "costume"), Decimal::ZERO);
    }

    #[test]
    fn sheet_serializes_as_nested_object() {
        let mut sheet = ScoreSheet::zeroed(&event());
        sheet.set(
            &TeamId::from("team1"),
            &CriterionId::from("technique"),
            Decimal::new(25, 0),
        );
        let json = serde_json::to_value(&sheet).unwrap_or_default();
        assert_eq!(json["team1"]["technique"], "25");
    }

    #[test]
    fn save_status_is_snake_case() {
        let json = serde_json::to_string(&SaveStatus::Saving).ok();
        assert_eq!(json.as_deref(), Some("\"saving\""));
    }
}
