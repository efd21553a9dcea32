pub mod candidate;
pub mod itinerary;
pub mod must_do;
pub mod preferences;
pub mod trip;
