use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::candidate::{FlightOffer, LodgingOffer};

/// Time-of-day label assigned to every scheduled item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Lunch,
    Dinner,
}

impl TimeSlot {
    /// Default rotation used when no keyword preference applies.
    pub const ROTATION: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

    /// Where an item moves when its preferred slot is already taken that day.
    pub fn alternates(&self) -> &'static [TimeSlot] {
        match self {
            TimeSlot::Morning => &[TimeSlot::Afternoon, TimeSlot::Evening],
            TimeSlot::Afternoon => &[TimeSlot::Morning, TimeSlot::Evening],
            TimeSlot::Evening => &[TimeSlot::Dinner, TimeSlot::Afternoon],
            TimeSlot::Lunch => &[TimeSlot::Afternoon, TimeSlot::Morning],
            TimeSlot::Dinner => &[TimeSlot::Evening],
        }
    }
}

/// One scheduled entry in a day. `Placeholder` is a first-class variant for
/// "required item missing": the assembler emits it instead of fabricating a
/// flight number or price it does not have, and the realized price of a
/// placeholder is always zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItineraryItem {
    #[serde(rename = "flight")]
    Flight {
        time_slot: TimeSlot,
        /// Realized cost of this leg. Zero when the paired leg of the same
        /// offer already carries the round-trip fare.
        price: f64,
        detail: FlightOffer,
    },

    #[serde(rename = "hotel")]
    Hotel {
        time_slot: TimeSlot,
        note: String,
        /// Realized cost of the stay: charged once on check-in, zero on
        /// the informational overnight rows.
        price: f64,
        detail: LodgingOffer,
    },

    #[serde(rename = "activity")]
    Activity {
        time_slot: TimeSlot,
        name: String,
        description: String,
        price: f64,
        must_do: bool,
    },

    #[serde(rename = "placeholder")]
    Placeholder { time_slot: TimeSlot, label: String },
}

impl ItineraryItem {
    pub fn time_slot(&self) -> TimeSlot {
        match self {
            ItineraryItem::Flight { time_slot, .. }
            | ItineraryItem::Hotel { time_slot, .. }
            | ItineraryItem::Activity { time_slot, .. }
            | ItineraryItem::Placeholder { time_slot, .. } => *time_slot,
        }
    }

    pub fn realized_price(&self) -> f64 {
        match self {
            ItineraryItem::Flight { price, .. }
            | ItineraryItem::Hotel { price, .. }
            | ItineraryItem::Activity { price, .. } => *price,
            ItineraryItem::Placeholder { .. } => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// Dense 1..N index in ascending date order, assigned only after the
    /// final chronological sort.
    pub day_number: u32,
    pub calendar_date: NaiveDate,
    pub items: Vec<ItineraryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    pub days: Vec<ItineraryDay>,
    pub total_price: f64,
    pub total_score: f64,
}
