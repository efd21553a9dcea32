//! Trip planning orchestration.
//!
//! Two entry points mirror the two route handlers: `optimize` runs the
//! ingest -> score -> select pipeline over raw provider payloads, and
//! `assemble` lays a chosen set of offers across a resolved date window.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PlanningError;
use crate::models::candidate::{
    ingest_activities, ingest_flights, ingest_hotels, mark_best_deals, LodgingOffer,
};
use crate::models::must_do::{MustDoActivity, MustDoList};
use crate::models::preferences::{ActivityPreferences, PreferenceWeights};
use crate::services::assembly_service::{AssemblyConfig, ItineraryAssembler};
use crate::services::cost_service::{ConvenienceConfig, CostAggregator, CostSummary};
use crate::services::date_service::resolve_window;
use crate::services::direction_service::{match_directions, RouteEndpoints};
use crate::services::scoring_service::CandidateScorer;
use crate::services::selection_service::{select_best, SelectedCombination};
use crate::models::itinerary::Itinerary;

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub flights: Vec<Value>,
    #[serde(default)]
    pub hotels: Vec<Value>,
    #[serde(default)]
    pub activities: Vec<Value>,
    #[serde(default)]
    pub preferences: PreferenceWeights,
    #[serde(alias = "userBudget")]
    pub user_budget: f64,
}

#[derive(Debug, Serialize)]
pub struct OptimizeOutcome {
    pub ok: bool,
    #[serde(flatten)]
    pub combination: SelectedCombination,
    pub insight: String,
}

/// Score every provider candidate and return the best affordable
/// flight/hotel/activity combination.
pub fn optimize(request: &OptimizeRequest) -> Result<OptimizeOutcome, PlanningError> {
    let mut flights = ingest_flights(&request.flights);
    let hotels = ingest_hotels(&request.hotels);
    let activities = ingest_activities(&request.activities);

    mark_best_deals(&mut flights);

    let scorer = CandidateScorer::new(&request.preferences);
    let scored_flights = scorer.score_pool(&flights);
    let scored_hotels = scorer.score_pool(&hotels);
    let scored_activities = scorer.score_pool(&activities);

    let combination = select_best(
        &scored_flights,
        &scored_hotels,
        &scored_activities,
        request.user_budget,
    )?;

    let insight = combination_insight(&request.preferences, &combination);

    Ok(OptimizeOutcome {
        ok: true,
        combination,
        insight,
    })
}

/// One-line explanation of what drove the pick, keyed off the dominant
/// preference weight.
fn combination_insight(weights: &PreferenceWeights, combination: &SelectedCombination) -> String {
    let normalized = weights.normalized();

    let dominant = if normalized.budget >= normalized.quality
        && normalized.budget >= normalized.convenience
    {
        "value for money"
    } else if normalized.quality >= normalized.convenience {
        "traveler ratings"
    } else {
        "travel convenience"
    };

    match &combination.flight {
        Some(flight) => format!(
            "Selected {} for {} at ${:.2} total (composite score {:.2})",
            flight.item.display_label(),
            dominant,
            combination.total_price,
            combination.total_score
        ),
        None => format!(
            "Selected for {} at ${:.2} total (composite score {:.2})",
            dominant, combination.total_price, combination.total_score
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct AssembleRequest {
    #[serde(default)]
    pub flights: Vec<Value>,
    #[serde(default)]
    pub hotel: Option<Value>,
    #[serde(default)]
    pub activities: Vec<Value>,
    #[serde(default, alias = "mustDo")]
    pub must_do: Vec<MustDoActivity>,
    #[serde(alias = "startDate")]
    pub start_date: String,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(default, alias = "originCode")]
    pub origin_code: Option<String>,
    #[serde(default, alias = "destinationCode")]
    pub destination_code: Option<String>,
    #[serde(default, alias = "activityPreferences")]
    pub activity_preferences: ActivityPreferences,
    #[serde(default, alias = "userBudget")]
    pub user_budget: Option<f64>,
    #[serde(default, alias = "totalScore")]
    pub total_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AssembleOutcome {
    pub ok: bool,
    pub itinerary: Itinerary,
    pub costs: CostSummary,
}

/// Resolve the window, pair up the flight legs, and lay everything onto a
/// calendar. Only an unparseable start date is fatal.
pub fn assemble(request: &AssembleRequest) -> Result<AssembleOutcome, PlanningError> {
    let window = resolve_window(&request.start_date, request.end_date.as_deref())?;

    let flights = ingest_flights(&request.flights);
    let hotel: Option<LodgingOffer> = request
        .hotel
        .as_ref()
        .map(LodgingOffer::from_provider)
        .filter(|h| !h.placeholder);
    let activities = ingest_activities(&request.activities);
    let must_do: MustDoList = request.must_do.iter().cloned().collect();

    let endpoints = RouteEndpoints::new(
        request.origin_code.clone(),
        request.destination_code.clone(),
    );
    let legs = match_directions(&flights, &endpoints);

    let assembler = ItineraryAssembler::with_config(AssemblyConfig::from_env());
    let mut itinerary = assembler.assemble(
        &window,
        &legs,
        hotel.as_ref(),
        &activities,
        &must_do,
        &request.activity_preferences,
    );

    let aggregator = CostAggregator::with_config(ConvenienceConfig::from_env());
    let costs = aggregator.summarize(&itinerary, request.user_budget);

    itinerary.total_price = costs.total_price;
    if let Some(score) = request.total_score {
        itinerary.total_score = score;
    }

    Ok(AssembleOutcome {
        ok: true,
        itinerary,
        costs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flight_value(id: &str, price: f64, origin: &str, destination: &str) -> Value {
        json!({
            "id": id,
            "airline": "DL",
            "origin": origin,
            "destination": destination,
            "price": { "total": price.to_string() },
        })
    }

    #[test]
    fn test_optimize_picks_affordable_combination() {
        let request = OptimizeRequest {
            flights: vec![
                flight_value("f1", 500.0, "JFK", "CDG"),
                flight_value("f2", 900.0, "JFK", "CDG"),
            ],
            hotels: vec![json!({
                "hotel": { "name": "Hotel du Parc" },
                "offers": [{ "price": { "total": "150.00" } }],
            })],
            activities: vec![json!({
                "name": "Seine cruise",
                "price": { "amount": "40.00" },
            })],
            preferences: PreferenceWeights::default(),
            user_budget: 700.0,
        };

        let outcome = optimize(&request).unwrap();
        assert!(outcome.ok);
        assert_eq!(
            outcome
                .combination
                .flight
                .as_ref()
                .and_then(|f| f.item.id.as_deref()),
            Some("f1")
        );
        assert!(outcome.combination.total_price <= 700.0);
        // The insight names the chosen carrier.
        assert!(outcome.insight.contains("Delta Air Lines"));
    }

    #[test]
    fn test_optimize_reports_budget_failure() {
        let request = OptimizeRequest {
            flights: vec![flight_value("f1", 5000.0, "JFK", "CDG")],
            hotels: vec![],
            activities: vec![],
            preferences: PreferenceWeights::default(),
            user_budget: 100.0,
        };

        let err = optimize(&request).unwrap_err();
        assert_eq!(err.kind(), "no_combination_within_budget");
    }

    #[test]
    fn test_optimize_with_no_data_is_missing_provider_data() {
        let request = OptimizeRequest {
            flights: vec![],
            hotels: vec![],
            activities: vec![],
            preferences: PreferenceWeights::default(),
            user_budget: 1000.0,
        };

        let err = optimize(&request).unwrap_err();
        assert_eq!(err.kind(), "missing_provider_data");
    }

    #[test]
    fn test_assemble_rejects_garbage_start_date() {
        let request = AssembleRequest {
            flights: vec![],
            hotel: None,
            activities: vec![],
            must_do: vec![],
            start_date: "not a date".to_string(),
            end_date: None,
            origin_code: None,
            destination_code: None,
            activity_preferences: ActivityPreferences::default(),
            user_budget: None,
            total_score: None,
        };

        let err = assemble(&request).unwrap_err();
        assert_eq!(err.kind(), "invalid_date");
    }

    #[test]
    fn test_assemble_round_trip_totals_cover_flight_and_hotel() {
        let request = AssembleRequest {
            flights: vec![
                flight_value("out", 500.0, "JFK", "CDG"),
                flight_value("back", 480.0, "CDG", "JFK"),
            ],
            hotel: Some(json!({
                "hotel": { "name": "Hotel du Parc" },
                "offers": [{ "price": { "total": "600.00" } }],
            })),
            activities: vec![],
            must_do: vec![],
            start_date: "2025-11-20".to_string(),
            end_date: Some("2025-11-27".to_string()),
            origin_code: Some("JFK".to_string()),
            destination_code: Some("CDG".to_string()),
            activity_preferences: ActivityPreferences::default(),
            user_budget: Some(2000.0),
            total_score: Some(0.81),
        };

        let outcome = assemble(&request).unwrap();
        assert_eq!(outcome.itinerary.days.len(), 8);
        assert_eq!(outcome.costs.flight_cost, 980.0);
        assert_eq!(outcome.costs.lodging_cost, 600.0);
        assert_eq!(outcome.itinerary.total_price, 1580.0);
        assert_eq!(outcome.itinerary.total_score, 0.81);
    }
}
