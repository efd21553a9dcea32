use thiserror::Error;

/// Typed failures surfaced by the planning engine.
///
/// Field-level problems on individual candidates (non-numeric prices,
/// unparseable durations) never reach this enum: they are coerced to safe
/// defaults at the ingestion boundary so one bad record cannot abort a run.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// The trip window could not be anchored to a usable start date.
    /// Fatal: a calendar cannot be assembled without one.
    #[error("could not parse date: {0}")]
    InvalidDate(String),

    /// Every flight/hotel/activity combination exceeded the budget ceiling.
    /// Reported, not fatal: callers may retry with a relaxed budget.
    #[error("no candidate combination fits within budget {0:.2}")]
    NoCombinationWithinBudget(f64),

    /// The provider handed us nothing usable in any category.
    #[error("provider returned no usable candidates")]
    MissingProviderData,
}

impl PlanningError {
    /// Stable kind string carried in `{ok: false, error: ...}` responses.
    pub fn kind(&self) -> &'static str {
        match self {
            PlanningError::InvalidDate(_) => "invalid_date",
            PlanningError::NoCombinationWithinBudget(_) => "no_combination_within_budget",
            PlanningError::MissingProviderData => "missing_provider_data",
        }
    }
}
