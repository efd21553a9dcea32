//! Scoring Model
//!
//! Normalizes heterogeneous candidates onto three comparable axes - budget,
//! quality, convenience - each in [0,1], then combines them with the user's
//! preference weights into one composite score. Pool maxima are computed per
//! candidate kind so a $900 flight and a $65 museum ticket are judged against
//! their own markets, not each other.

use serde::Serialize;

use crate::models::candidate::{ActivityOffer, FlightOffer, LodgingOffer};
use crate::models::preferences::PreferenceWeights;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScoreBreakdown {
    pub budget: f64,
    pub quality: f64,
    pub convenience: f64,
    pub total: f64,
}

/// A candidate paired with its sub-scores. Serializes flat, so API consumers
/// see the original offer fields plus a nested `scores` object.
#[derive(Debug, Clone, Serialize)]
pub struct Scored<T> {
    #[serde(flatten)]
    pub item: T,
    pub scores: ScoreBreakdown,
}

/// The three facts the scoring model needs from any candidate kind. The
/// convenience metric is the lower-is-better axis each kind is judged on:
/// flight and activity duration in minutes, lodging distance from center.
pub trait Candidate {
    fn price(&self) -> f64;
    fn rating(&self) -> Option<f64>;
    fn convenience_metric(&self) -> Option<f64>;
}

impl Candidate for FlightOffer {
    fn price(&self) -> f64 {
        self.price
    }
    fn rating(&self) -> Option<f64> {
        None
    }
    fn convenience_metric(&self) -> Option<f64> {
        self.duration_minutes
    }
}

impl Candidate for LodgingOffer {
    fn price(&self) -> f64 {
        self.price
    }
    fn rating(&self) -> Option<f64> {
        self.rating
    }
    fn convenience_metric(&self) -> Option<f64> {
        self.distance_from_center
    }
}

impl Candidate for ActivityOffer {
    fn price(&self) -> f64 {
        self.price
    }
    fn rating(&self) -> Option<f64> {
        self.rating
    }
    fn convenience_metric(&self) -> Option<f64> {
        self.duration_minutes
    }
}

pub struct CandidateScorer {
    weights: PreferenceWeights,
}

impl CandidateScorer {
    pub fn new(weights: &PreferenceWeights) -> Self {
        Self {
            weights: weights.normalized(),
        }
    }

    /// Score one pool of like candidates against its own maxima.
    pub fn score_pool<T: Candidate + Clone>(&self, pool: &[T]) -> Vec<Scored<T>> {
        let max_price = pool_max(pool.iter().map(Candidate::price));
        let max_metric = pool_max(pool.iter().filter_map(Candidate::convenience_metric));

        pool.iter()
            .map(|candidate| Scored {
                item: candidate.clone(),
                scores: self.score_one(candidate, max_price, max_metric),
            })
            .collect()
    }

    fn score_one<T: Candidate>(&self, candidate: &T, max_price: f64, max_metric: f64) -> ScoreBreakdown {
        let budget = clamp01(1.0 - candidate.price() / max_price);
        let quality = clamp01(candidate.rating().unwrap_or(0.0) / 5.0);
        // An absent metric coerces to 0, the same policy applied to absent
        // prices at ingestion.
        let convenience = clamp01(1.0 - candidate.convenience_metric().unwrap_or(0.0) / max_metric);

        let total = self.weights.budget * budget
            + self.weights.quality * quality
            + self.weights.convenience * convenience;

        ScoreBreakdown {
            budget,
            quality,
            convenience,
            total: clamp01(total),
        }
    }
}

/// Pool maximum, defaulting to 1 for empty or all-zero pools so that the
/// normalization never divides by zero.
fn pool_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

fn clamp01(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(price: f64, duration_minutes: f64) -> FlightOffer {
        FlightOffer {
            price,
            duration_minutes: Some(duration_minutes),
            ..Default::default()
        }
    }

    #[test]
    fn test_budget_score_relative_to_pool_max() {
        let scorer = CandidateScorer::new(&PreferenceWeights::default());
        let scored = scorer.score_pool(&[flight(500.0, 400.0), flight(1000.0, 500.0)]);

        assert!((scored[0].scores.budget - 0.5).abs() < 1e-9);
        assert_eq!(scored[1].scores.budget, 0.0);
        // Most expensive, longest flight still scores a valid total.
        assert!(scored[1].scores.total >= 0.0);
    }

    #[test]
    fn test_quality_defaults_to_zero_without_rating() {
        let scorer = CandidateScorer::new(&PreferenceWeights::default());
        let scored = scorer.score_pool(&[flight(100.0, 60.0)]);
        assert_eq!(scored[0].scores.quality, 0.0);
    }

    #[test]
    fn test_lodging_convenience_uses_distance() {
        let scorer = CandidateScorer::new(&PreferenceWeights::default());
        let near = LodgingOffer {
            price: 100.0,
            rating: Some(4.0),
            distance_from_center: Some(1.0),
            ..Default::default()
        };
        let far = LodgingOffer {
            price: 100.0,
            rating: Some(4.0),
            distance_from_center: Some(10.0),
            ..Default::default()
        };
        let scored = scorer.score_pool(&[near, far]);
        assert!(scored[0].scores.convenience > scored[1].scores.convenience);
        assert_eq!(scored[1].scores.convenience, 0.0);
    }

    #[test]
    fn test_scores_are_clamped_to_unit_interval() {
        let scorer = CandidateScorer::new(&PreferenceWeights {
            budget: 1.0,
            quality: 0.0,
            convenience: 0.0,
        });
        // Rating above the 0-5 scale would push quality past 1 without the
        // clamp; ingestion caps it, but the scorer must not rely on that.
        let odd = ActivityOffer {
            price: 0.0,
            rating: Some(9.0),
            duration_minutes: None,
            ..Default::default()
        };
        let scored = scorer.score_pool(&[odd]);
        for value in [
            scored[0].scores.budget,
            scored[0].scores.quality,
            scored[0].scores.convenience,
            scored[0].scores.total,
        ] {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_empty_pool_produces_no_scores_and_no_panic() {
        let scorer = CandidateScorer::new(&PreferenceWeights::default());
        let scored: Vec<Scored<FlightOffer>> = scorer.score_pool(&[]);
        assert!(scored.is_empty());
    }

    #[test]
    fn test_weight_emphasis_shifts_totals() {
        let cheap_slow = flight(200.0, 900.0);
        let pricey_fast = flight(800.0, 120.0);

        let budget_scorer = CandidateScorer::new(&PreferenceWeights {
            budget: 1.0,
            quality: 0.0,
            convenience: 0.0,
        });
        let by_budget = budget_scorer.score_pool(&[cheap_slow.clone(), pricey_fast.clone()]);
        assert!(by_budget[0].scores.total > by_budget[1].scores.total);

        let convenience_scorer = CandidateScorer::new(&PreferenceWeights {
            budget: 0.0,
            quality: 0.0,
            convenience: 1.0,
        });
        let by_convenience = convenience_scorer.score_pool(&[cheap_slow, pricey_fast]);
        assert!(by_convenience[1].scores.total > by_convenience[0].scores.total);
    }
}
