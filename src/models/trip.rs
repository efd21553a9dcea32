use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The inclusive calendar range the itinerary must cover. A missing end
/// date, or an end equal to the start, denotes a one-way trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripWindow {
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl TripWindow {
    pub fn one_way(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: None,
        }
    }

    pub fn round_trip(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: Some(end_date),
        }
    }

    pub fn is_one_way(&self) -> bool {
        match self.end_date {
            None => true,
            Some(end) => end <= self.start_date,
        }
    }
}
