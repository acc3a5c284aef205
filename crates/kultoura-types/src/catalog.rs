//! Static event catalog entries: events, teams and criteria.
//!
//! These are supplied by configuration and never change during a
//! session. The scoring engine and the admin console both read them; the
//! state store never does.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{CriterionId, EventId, TeamId};

/// Percentage-mode criteria are scored out of this value.
pub const PERCENTAGE_SCALE: u32 = 100;

/// How criterion scores combine into a team total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ScoringMode {
    /// Each criterion contributes up to `max_score` points to a plain sum.
    #[default]
    Additive,
    /// Each criterion is scored 0-100 and weighted by its `percentage`.
    Percentage,
}

/// A competing team within an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Team {
    /// Identifier, unique within the event.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Free-text description of the performance or exhibit.
    #[serde(default)]
    pub performance: String,
    /// Number of performers.
    #[serde(default)]
    pub members: u32,
}

/// One scored dimension of a performance.
///
/// Carries `max_score` in additive events and `percentage` in percentage
/// events. Catalog validation checks the right one is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Criterion {
    /// Identifier, unique within the event.
    pub id: CriterionId,
    /// Display name.
    pub name: String,
    /// What the judges should look for.
    #[serde(default)]
    pub description: String,
    /// Points this criterion contributes in additive mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<u32>,
    /// Share of 100 this criterion contributes in percentage mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u32>,
}

impl Criterion {
    /// The weight relevant to `mode`, if the catalog supplied one.
    pub const fn weight(&self, mode: ScoringMode) -> Option<u32> {
        match mode {
            ScoringMode::Additive => self.max_score,
            ScoringMode::Percentage => self.percentage,
        }
    }

    /// Highest score a judge may enter for this criterion under `mode`.
    ///
    /// Additive criteria are bounded by their `max_score` (0 when
    /// missing); percentage criteria are always scored out of 100.
    pub fn upper_bound(&self, mode: ScoringMode) -> Decimal {
        match mode {
            ScoringMode::Additive => Decimal::from(self.max_score.unwrap_or(0)),
            ScoringMode::Percentage => Decimal::from(PERCENTAGE_SCALE),
        }
    }
}

/// A judged competition category with its own teams and criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventDefinition {
    /// Identifier used by the state store.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// Short description for the selection page.
    #[serde(default)]
    pub description: String,
    /// How criterion scores combine.
    #[serde(default)]
    pub scoring_mode: ScoringMode,
    /// Teams in performance order.
    pub teams: Vec<Team>,
    /// Criteria in display order.
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl EventDefinition {
    /// Position of `team_id` in the performance order.
    pub fn team_index(&self, team_id: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.id.as_str() == team_id)
    }

    /// Look up a team by id.
    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id.as_str() == team_id)
    }

    /// Look up a criterion by id.
    pub fn criterion(&self, criterion_id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id.as_str() == criterion_id)
    }

    /// Sum of the mode-relevant weights of every criterion.
    ///
    /// Criteria without a weight count as zero, as do sums that would
    /// overflow.
    pub fn total_weight(&self) -> u32 {
        self.criteria
            .iter()
            .filter_map(|c| c.weight(self.scoring_mode))
            .fold(0_u32, u32::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(id: &str, max_score: Option<u32>, percentage: Option<u32>) -> Criterion {
        Criterion {
            id: CriterionId::from(id),
            name: id.to_owned(),
            description: String::new(),
            max_score,
            percentage,
        }
    }

    #[test]
    fn upper_bound_follows_mode() {
        let c = criterion("technique", Some(30), Some(25));
        assert_eq!(c.upper_bound(ScoringMode::Additive), Decimal::from(30));
        assert_eq!(c.upper_bound(ScoringMode::Percentage), Decimal::from(100));
    }

    #[test]
    fn total_weight_ignores_missing_weights() {
        let event = EventDefinition {
            id: EventId::from("e"),
            title: String::from("E"),
            description: String::new(),
            scoring_mode: ScoringMode::Percentage,
            teams: Vec::new(),
            criteria: vec![
                criterion("a", None, Some(30)),
                criterion("b", Some(10), None),
                criterion("c", None, Some(30)),
            ],
        };
        assert_eq!(event.total_weight(), 60);
    }

    #[test]
    fn mode_deserializes_snake_case() {
        let mode: Result<ScoringMode, _> = serde_json::from_str("\"percentage\"");
        assert!(matches!(mode, Ok(ScoringMode::Percentage)));
    }
}
