//! Cost aggregation over an assembled itinerary.
//!
//! Sums realized prices per category and derives a 0-100 convenience index
//! from flight duration, stop count, and total spend. Placeholder items
//! contribute nothing to any total.

use serde::Serialize;

use crate::models::itinerary::{Itinerary, ItineraryItem};

const DEFAULT_DURATION_WEIGHT: f64 = 0.4;
const DEFAULT_STOPS_WEIGHT: f64 = 0.3;
const DEFAULT_PRICE_WEIGHT: f64 = 0.3;
const DEFAULT_ASSUMED_MAX_DURATION_HOURS: f64 = 24.0;
const DEFAULT_ASSUMED_MAX_STOPS: f64 = 4.0;
const DEFAULT_MAX_PRICE: f64 = 2000.0;

/// Weights and normalization ceilings for the convenience index. These are
/// heuristics, not invariants, so every one of them can be overridden.
#[derive(Debug, Clone)]
pub struct ConvenienceConfig {
    pub duration_weight: f64,
    pub stops_weight: f64,
    pub price_weight: f64,
    pub assumed_max_duration_hours: f64,
    pub assumed_max_stops: f64,
    pub default_max_price: f64,
}

impl Default for ConvenienceConfig {
    fn default() -> Self {
        Self {
            duration_weight: DEFAULT_DURATION_WEIGHT,
            stops_weight: DEFAULT_STOPS_WEIGHT,
            price_weight: DEFAULT_PRICE_WEIGHT,
            assumed_max_duration_hours: DEFAULT_ASSUMED_MAX_DURATION_HOURS,
            assumed_max_stops: DEFAULT_ASSUMED_MAX_STOPS,
            default_max_price: DEFAULT_MAX_PRICE,
        }
    }
}

impl ConvenienceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            duration_weight: env_f64("CONVENIENCE_DURATION_WEIGHT", defaults.duration_weight),
            stops_weight: env_f64("CONVENIENCE_STOPS_WEIGHT", defaults.stops_weight),
            price_weight: env_f64("CONVENIENCE_PRICE_WEIGHT", defaults.price_weight),
            assumed_max_duration_hours: env_f64(
                "CONVENIENCE_MAX_DURATION_HOURS",
                defaults.assumed_max_duration_hours,
            ),
            assumed_max_stops: env_f64("CONVENIENCE_MAX_STOPS", defaults.assumed_max_stops),
            default_max_price: env_f64("CONVENIENCE_MAX_PRICE", defaults.default_max_price),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize)]
pub struct CostSummary {
    pub total_price: f64,
    pub flight_cost: f64,
    pub lodging_cost: f64,
    pub activity_cost: f64,
    pub convenience_index: u32,
}

#[derive(Default)]
pub struct CostAggregator {
    config: ConvenienceConfig,
}

impl CostAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConvenienceConfig) -> Self {
        Self { config }
    }

    pub fn summarize(&self, itinerary: &Itinerary, budget: Option<f64>) -> CostSummary {
        let mut flight_cost = 0.0;
        let mut lodging_cost = 0.0;
        let mut activity_cost = 0.0;
        let mut flight_minutes = 0.0;
        let mut flight_stops = 0.0;

        for item in itinerary.days.iter().flat_map(|day| &day.items) {
            match item {
                ItineraryItem::Flight { detail, .. } => {
                    flight_cost += item.realized_price();
                    flight_minutes += detail.duration_minutes.unwrap_or(0.0);
                    flight_stops += detail.stops as f64;
                }
                ItineraryItem::Hotel { .. } => lodging_cost += item.realized_price(),
                ItineraryItem::Activity { .. } => activity_cost += item.realized_price(),
                ItineraryItem::Placeholder { .. } => {}
            }
        }

        let total_price = flight_cost + lodging_cost + activity_cost;

        CostSummary {
            total_price,
            flight_cost,
            lodging_cost,
            activity_cost,
            convenience_index: self.convenience_index(
                flight_minutes / 60.0,
                flight_stops,
                total_price,
                budget,
            ),
        }
    }

    /// 100 means a short nonstop cheap trip; each normalized friction term
    /// pulls the index down by its weighted share.
    fn convenience_index(
        &self,
        flight_hours: f64,
        stops: f64,
        total_price: f64,
        budget: Option<f64>,
    ) -> u32 {
        let cfg = &self.config;
        let price_ceiling = budget
            .filter(|b| b.is_finite() && *b > 0.0)
            .unwrap_or(cfg.default_max_price);

        let duration_term = (flight_hours / cfg.assumed_max_duration_hours).min(1.0);
        let stops_term = (stops / cfg.assumed_max_stops).min(1.0);
        let price_term = (total_price / price_ceiling).min(1.0);

        let friction = cfg.duration_weight * duration_term
            + cfg.stops_weight * stops_term
            + cfg.price_weight * price_term;

        (100.0 - (100.0 * friction).round()).clamp(0.0, 100.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::candidate::{FlightOffer, LodgingOffer};
    use crate::models::itinerary::{ItineraryDay, TimeSlot};

    fn itinerary_with(items: Vec<ItineraryItem>) -> Itinerary {
        Itinerary {
            days: vec![ItineraryDay {
                day_number: 1,
                calendar_date: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
                items,
            }],
            total_price: 0.0,
            total_score: 0.0,
        }
    }

    fn flight_item(price: f64, duration_minutes: f64, stops: u32) -> ItineraryItem {
        ItineraryItem::Flight {
            time_slot: TimeSlot::Morning,
            price,
            detail: FlightOffer {
                price,
                duration_minutes: Some(duration_minutes),
                stops,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_totals_split_by_category() {
        let itinerary = itinerary_with(vec![
            flight_item(500.0, 420.0, 0),
            ItineraryItem::Hotel {
                time_slot: TimeSlot::Afternoon,
                note: "Check-in".to_string(),
                price: 600.0,
                detail: LodgingOffer::default(),
            },
            ItineraryItem::Activity {
                time_slot: TimeSlot::Evening,
                name: "Seine cruise".to_string(),
                description: String::new(),
                price: 80.0,
                must_do: false,
            },
        ]);

        let summary = CostAggregator::new().summarize(&itinerary, None);
        assert_eq!(summary.flight_cost, 500.0);
        assert_eq!(summary.lodging_cost, 600.0);
        assert_eq!(summary.activity_cost, 80.0);
        assert_eq!(summary.total_price, 1180.0);
    }

    #[test]
    fn test_placeholders_cost_nothing() {
        let itinerary = itinerary_with(vec![ItineraryItem::Placeholder {
            time_slot: TimeSlot::Morning,
            label: "Transportation to destination needed".to_string(),
        }]);

        let summary = CostAggregator::new().summarize(&itinerary, None);
        assert_eq!(summary.total_price, 0.0);
        // An empty trip has no friction at all.
        assert_eq!(summary.convenience_index, 100);
    }

    #[test]
    fn test_convenience_index_penalizes_long_multi_stop_trips() {
        let short = itinerary_with(vec![flight_item(300.0, 120.0, 0)]);
        let long = itinerary_with(vec![flight_item(300.0, 1440.0, 4)]);

        let aggregator = CostAggregator::new();
        let short_index = aggregator.summarize(&short, Some(2000.0)).convenience_index;
        let long_index = aggregator.summarize(&long, Some(2000.0)).convenience_index;
        assert!(short_index > long_index);
    }

    #[test]
    fn test_worst_case_bottoms_out_at_zero() {
        let itinerary = itinerary_with(vec![flight_item(5000.0, 4000.0, 9)]);
        let summary = CostAggregator::new().summarize(&itinerary, Some(1000.0));
        assert_eq!(summary.convenience_index, 0);
    }

    #[test]
    fn test_budget_sets_the_price_ceiling() {
        let itinerary = itinerary_with(vec![flight_item(900.0, 0.0, 0)]);
        let aggregator = CostAggregator::new();
        let tight = aggregator.summarize(&itinerary, Some(900.0)).convenience_index;
        let loose = aggregator.summarize(&itinerary, Some(9000.0)).convenience_index;
        assert!(loose > tight);
    }
}
