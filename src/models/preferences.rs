use serde::{Deserialize, Serialize};

/// Caller-supplied priorities for cost vs. quality vs. convenience.
///
/// Callers are expected to hand us a triple summing to 1, but nothing is
/// trusted: `normalized()` re-scales whatever arrives before any scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PreferenceWeights {
    #[serde(default = "default_third")]
    pub budget: f64,
    #[serde(default = "default_third")]
    pub quality: f64,
    #[serde(default = "default_third")]
    pub convenience: f64,
}

fn default_third() -> f64 {
    1.0 / 3.0
}

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self {
            budget: 1.0 / 3.0,
            quality: 1.0 / 3.0,
            convenience: 1.0 / 3.0,
        }
    }
}

impl PreferenceWeights {
    /// Re-normalize so the three weights sum to 1. Negative or non-finite
    /// components are treated as 0; an all-zero triple falls back to equal
    /// thirds rather than producing NaN scores downstream.
    pub fn normalized(&self) -> Self {
        let budget = sane(self.budget);
        let quality = sane(self.quality);
        let convenience = sane(self.convenience);
        let sum = budget + quality + convenience;

        if sum <= 0.0 {
            return Self::default();
        }

        Self {
            budget: budget / sum,
            quality: quality / sum,
            convenience: convenience / sum,
        }
    }
}

fn sane(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Filtering preferences applied to the regular (non must-do) activity pool
/// before it is distributed across interior days.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityPreferences {
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default)]
    pub avoided_categories: Vec<String>,
    #[serde(default)]
    pub prefer_guided_tours: bool,
}
