//! Team totals in both scoring modes.
//!
//! Pure functions over a team's [`TeamScores`]; the engine calls them,
//! and so does anything that needs totals for a stored sheet.
//!
//! # Percentage normalization
//!
//! Each criterion's raw score (0-100) is taken as a percentage of that
//! criterion's own weight. The weighted scores are summed and, only when
//! the weights do not add up to exactly 100, rescaled by
//! `100 / sum(weights)`. Catalog authors can therefore use weights that
//! do not sum to 100 and still get a 0-100 result.

use rust_decimal::Decimal;

use kultoura_types::{EventDefinition, ScoringMode, TeamScores};

/// Sum of every recorded score for a team. A team with no scores totals 0.
pub fn additive_total(scores: Option<&TeamScores>) -> Decimal {
    scores.map_or(Decimal::ZERO, |scores| {
        scores
            .values()
            .fold(Decimal::ZERO, |acc, score| acc.saturating_add(*score))
    })
}

/// Weighted percentage total for a team, normalized to 0-100.
///
/// Criteria without a `percentage` weight contribute nothing, as do
/// criteria the team has no score for.
pub fn percentage_total(event: &EventDefinition, scores: Option<&TeamScores>) -> Decimal {
    let Some(scores) = scores else {
        return Decimal::ZERO;
    };

    let mut total = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;

    for criterion in &event.criteria {
        let score = scores.get(&criterion.id).copied().unwrap_or(Decimal::ZERO);
        let weight = Decimal::from(criterion.percentage.unwrap_or(0));

        let share = score
            .checked_div(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO);
        total = total.saturating_add(share.saturating_mul(weight));
        total_weight = total_weight.saturating_add(weight);
    }

    if total_weight > Decimal::ZERO && total_weight != Decimal::ONE_HUNDRED {
        total = total
            .saturating_mul(Decimal::ONE_HUNDRED)
            .checked_div(total_weight)
            .unwrap_or(Decimal::ZERO);
    }

    total
}

/// Total for a team in the event's own scoring mode.
pub fn team_total(event: &EventDefinition, scores: Option<&TeamScores>) -> Decimal {
    match event.scoring_mode {
        ScoringMode::Additive => additive_total(scores),
        ScoringMode::Percentage => percentage_total(event, scores),
    }
}

/// Highest total a team can reach in the event's scoring mode.
pub fn max_possible(event: &EventDefinition) -> Decimal {
    match event.scoring_mode {
        ScoringMode::Additive => event
            .criteria
            .iter()
            .filter_map(|c| c.max_score)
            .fold(Decimal::ZERO, |acc, max| acc.saturating_add(Decimal::from(max))),
        ScoringMode::Percentage => Decimal::ONE_HUNDRED,
    }
}
