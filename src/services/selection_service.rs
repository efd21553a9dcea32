//! Candidate Selector
//!
//! Enumerates the transport x lodging x activity product and keeps the
//! best-scoring combination whose summed price stays within the absolute
//! budget ceiling. Pools are small (a provider page at most), so exhaustive
//! enumeration beats anything cleverer.

use serde::Serialize;

use crate::errors::PlanningError;
use crate::models::candidate::{ActivityOffer, FlightOffer, LodgingOffer};
use crate::services::scoring_service::Scored;

/// The winning combination. A `None` slot means that candidate pool was
/// empty; it contributed neither price nor score.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedCombination {
    pub flight: Option<Scored<FlightOffer>>,
    pub hotel: Option<Scored<LodgingOffer>>,
    pub activity: Option<Scored<ActivityOffer>>,
    pub total_price: f64,
    pub total_score: f64,
}

/// Pick the affordable combination with the highest mean composite score.
/// Ties break toward the lowest summed price.
pub fn select_best(
    flights: &[Scored<FlightOffer>],
    hotels: &[Scored<LodgingOffer>],
    activities: &[Scored<ActivityOffer>],
    user_budget: f64,
) -> Result<SelectedCombination, PlanningError> {
    if flights.is_empty() && hotels.is_empty() && activities.is_empty() {
        return Err(PlanningError::MissingProviderData);
    }

    let flight_slots = slots(flights);
    let hotel_slots = slots(hotels);
    let activity_slots = slots(activities);

    let mut best: Option<SelectedCombination> = None;

    for flight in &flight_slots {
        for hotel in &hotel_slots {
            for activity in &activity_slots {
                let mut total_price = 0.0;
                let mut score_sum = 0.0;
                let mut filled = 0.0;

                if let Some(f) = flight {
                    total_price += f.item.price;
                    score_sum += f.scores.total;
                    filled += 1.0;
                }
                if let Some(h) = hotel {
                    total_price += h.item.price;
                    score_sum += h.scores.total;
                    filled += 1.0;
                }
                if let Some(a) = activity {
                    total_price += a.item.price;
                    score_sum += a.scores.total;
                    filled += 1.0;
                }

                // Budget ceiling is inclusive: exactly-at-budget survives.
                if total_price > user_budget {
                    continue;
                }

                let mean_score = if filled > 0.0 { score_sum / filled } else { 0.0 };

                let improves = match &best {
                    None => true,
                    Some(current) => {
                        mean_score > current.total_score + 1e-9
                            || ((mean_score - current.total_score).abs() <= 1e-9
                                && total_price < current.total_price)
                    }
                };

                if improves {
                    best = Some(SelectedCombination {
                        flight: flight.map(|f| (*f).clone()),
                        hotel: hotel.map(|h| (*h).clone()),
                        activity: activity.map(|a| (*a).clone()),
                        total_price,
                        total_score: mean_score,
                    });
                }
            }
        }
    }

    best.ok_or(PlanningError::NoCombinationWithinBudget(user_budget))
}

/// An empty pool still yields one (empty) slot so the product never
/// collapses to zero combinations.
fn slots<T>(pool: &[Scored<T>]) -> Vec<Option<&Scored<T>>> {
    if pool.is_empty() {
        vec![None]
    } else {
        pool.iter().map(Some).collect()
    }
}
