//! The static event catalog.
//!
//! Events, teams and criteria come from the `events:` section of
//! `kultoura-config.yaml`. When that section is missing the built-in
//! catalog below is used. Either way the catalog is validated once at
//! load time and never changes afterwards.

use std::collections::BTreeSet;

use kultoura_types::{
    Criterion, CriterionId, EventDefinition, EventId, ScoringMode, Team, TeamId,
};

/// Catalog validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two events share an id.
    #[error("duplicate event id: {0}")]
    DuplicateEvent(String),

    /// Two teams of one event share an id.
    #[error("duplicate team id {team_id} in event {event_id}")]
    DuplicateTeam {
        /// The event.
        event_id: String,
        /// The repeated team id.
        team_id: String,
    },

    /// Two criteria of one event share an id.
    #[error("duplicate criterion id {criterion_id} in event {event_id}")]
    DuplicateCriterion {
        /// The event.
        event_id: String,
        /// The repeated criterion id.
        criterion_id: String,
    },

    /// A criterion lacks the weight its event's scoring mode needs.
    #[error("criterion {criterion_id} in event {event_id} has no {field}")]
    MissingWeight {
        /// The event.
        event_id: String,
        /// The criterion.
        criterion_id: String,
        /// `max_score` or `percentage`.
        field: &'static str,
    },

    /// A criterion weight is zero.
    #[error("criterion {criterion_id} in event {event_id} has a zero {field}")]
    ZeroWeight {
        /// The event.
        event_id: String,
        /// The criterion.
        criterion_id: String,
        /// `max_score` or `percentage`.
        field: &'static str,
    },
}

/// All events judges can be shown, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCatalog {
    events: Vec<EventDefinition>,
}

impl EventCatalog {
    /// Validate `events` and build a catalog from them.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found.
    pub fn from_events(events: Vec<EventDefinition>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for event in &events {
            if !seen.insert(event.id.as_str()) {
                return Err(CatalogError::DuplicateEvent(event.id.to_string()));
            }
            validate_event(event)?;
        }
        Ok(Self { events })
    }

    /// The catalog used when configuration supplies none.
    pub fn builtin() -> Self {
        Self {
            events: vec![festival_dance(), mini_museum()],
        }
    }

    /// Look up an event.
    pub fn get(&self, event_id: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|e| e.id.as_str() == event_id)
    }

    /// Whether `event_id` is in the catalog.
    pub fn contains(&self, event_id: &str) -> bool {
        self.get(event_id).is_some()
    }

    /// All events in display order.
    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn validate_event(event: &EventDefinition) -> Result<(), CatalogError> {
    let mut teams = BTreeSet::new();
    for team in &event.teams {
        if !teams.insert(team.id.as_str()) {
            return Err(CatalogError::DuplicateTeam {
                event_id: event.id.to_string(),
                team_id: team.id.to_string(),
            });
        }
    }

    let field = match event.scoring_mode {
        ScoringMode::Additive => "max_score",
        ScoringMode::Percentage => "percentage",
    };

    let mut criteria = BTreeSet::new();
    for criterion in &event.criteria {
        if !criteria.insert(criterion.id.as_str()) {
            return Err(CatalogError::DuplicateCriterion {
                event_id: event.id.to_string(),
                criterion_id: criterion.id.to_string(),
            });
        }
        match criterion.weight(event.scoring_mode) {
            None => {
                return Err(CatalogError::MissingWeight {
                    event_id: event.id.to_string(),
                    criterion_id: criterion.id.to_string(),
                    field,
                });
            }
            Some(0) => {
                return Err(CatalogError::ZeroWeight {
                    event_id: event.id.to_string(),
                    criterion_id: criterion.id.to_string(),
                    field,
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Built-in events
// ---------------------------------------------------------------------------

fn team(id: &str, name: &str, performance: &str, members: u32) -> Team {
    Team {
        id: TeamId::from(id),
        name: name.to_owned(),
        performance: performance.to_owned(),
        members,
    }
}

fn criterion(
    id: &str,
    name: &str,
    description: &str,
    max_score: Option<u32>,
    percentage: Option<u32>,
) -> Criterion {
    Criterion {
        id: CriterionId::from(id),
        name: name.to_owned(),
        description: description.to_owned(),
        max_score,
        percentage,
    }
}

fn festival_dance() -> EventDefinition {
    EventDefinition {
        id: EventId::from("festival-dance"),
        title: String::from("Festival Dance Competition"),
        description: String::from(
            "Traditional Filipino dance performances showcasing cultural heritage",
        ),
        scoring_mode: ScoringMode::Additive,
        teams: vec![
            team("team1", "Team Mindanao", "Singkil - Royal Maranao Dance", 8),
            team("team2", "Team Luzon", "Tinikling - Bamboo Dance", 6),
            team("team3", "Team Visayas", "Pandanggo sa Ilaw - Dance with Lights", 7),
            team("team4", "Team Cordillera", "Banga - Pot Dance", 5),
        ],
        criteria: vec![
            criterion(
                "technique",
                "Technical Execution",
                "Precision, timing, and skill in performing dance movements",
                Some(30),
                None,
            ),
            criterion(
                "authenticity",
                "Cultural Authenticity",
                "Adherence to traditional elements and cultural significance",
                Some(25),
                None,
            ),
            criterion(
                "performance",
                "Performance Quality",
                "Energy, expression, and audience engagement",
                Some(25),
                None,
            ),
            criterion(
                "costume",
                "Costume & Props",
                "Appropriate and authentic costume and prop usage",
                Some(20),
                None,
            ),
        ],
    }
}

fn mini_museum() -> EventDefinition {
    let exhibit = "Mini-Museum Exhibit";
    EventDefinition {
        id: EventId::from("mini-museum"),
        title: String::from("Mini-Museum Competition"),
        description: String::from("Visual arts showcasing Philippine cultural themes and history"),
        scoring_mode: ScoringMode::Percentage,
        teams: ["3F1", "2C1", "2C2", "2C3", "2D1", "2D2", "2D3", "2D4"]
            .into_iter()
            .map(|section| team(section, section, exhibit, 4))
            .collect(),
        criteria: vec![
            criterion(
                "cultural",
                "Cultural Authenticity & Educational Value",
                "Accuracy of cultural representation, depth of research, educational impact, and cultural sensitivity",
                None,
                Some(25),
            ),
            criterion(
                "curatorial",
                "Curatorial Excellence",
                "Thoughtful selection and arrangement of artifacts, coherent narrative flow, and thematic consistency",
                None,
                Some(20),
            ),
            criterion(
                "exhibition",
                "Exhibition Design",
                "Visual appeal, spatial organization, effective use of available space, and professional presentation",
                None,
                Some(15),
            ),
            criterion(
                "information",
                "Information Quality",
                "Accuracy, clarity, and comprehensiveness of artifact descriptions and contextual information",
                None,
                Some(15),
            ),
            criterion(
                "engagement",
                "Visitor Engagement",
                "Interactive elements, accessibility for diverse audiences, and effectiveness in stimulating interest",
                None,
                Some(10),
            ),
            criterion(
                "technical",
                "Technical Execution",
                "Quality of installation, lighting, conservation considerations, and attention to detail",
                None,
                Some(10),
            ),
            criterion(
                "innovation",
                "Innovation & Creativity",
                "Original approaches to exhibition design, creative problem-solving, and innovative presentation methods",
                None,
                Some(5),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let builtin = EventCatalog::builtin();
        let validated = EventCatalog::from_events(builtin.events().to_vec());
        assert_eq!(validated, Ok(builtin));
    }

    #[test]
    fn builtin_shapes() {
        let catalog = EventCatalog::builtin();
        let dance = catalog.get("festival-dance");
        assert_eq!(dance.map(|e| (e.teams.len(), e.criteria.len())), Some((4, 4)));
        assert_eq!(dance.map(EventDefinition::total_weight), Some(100));

        let museum = catalog.get("mini-museum");
        assert_eq!(museum.map(|e| (e.teams.len(), e.criteria.len())), Some((8, 7)));
        assert_eq!(museum.map(EventDefinition::total_weight), Some(100));
        assert!(!catalog.contains("speech-choir"));
    }

    #[test]
    fn rejects_duplicate_events() {
        let result = EventCatalog::from_events(vec![festival_dance(), festival_dance()]);
        assert!(matches!(result, Err(CatalogError::DuplicateEvent(_))));
    }

    #[test]
    fn rejects_duplicate_teams() {
        let mut event = festival_dance();
        event.teams.push(team("team1", "Again", "", 1));
        let result = EventCatalog::from_events(vec![event]);
        assert!(matches!(result, Err(CatalogError::DuplicateTeam { .. })));
    }

    #[test]
    fn rejects_missing_and_zero_weights() {
        let mut event = mini_museum();
        if let Some(c) = event.criteria.first_mut() {
            c.percentage = None;
        }
        let result = EventCatalog::from_events(vec![event]);
        assert!(matches!(
            result,
            Err(CatalogError::MissingWeight { field: "percentage", .. })
        ));

        let mut event = festival_dance();
        if let Some(c) = event.criteria.last_mut() {
            c.max_score = Some(0);
        }
        let result = EventCatalog::from_events(vec![event]);
        assert!(matches!(result, Err(CatalogError::ZeroWeight { .. })));
    }

    #[test]
    fn events_without_criteria_are_allowed() {
        let mut event = festival_dance();
        event.criteria.clear();
        assert!(EventCatalog::from_events(vec![event]).is_ok());
    }
}
