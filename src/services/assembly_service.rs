//! Itinerary Assembler
//!
//! Lays the selected (or still-missing) items across the resolved date
//! window. Day one carries the outbound leg and hotel check-in, interior
//! days receive must-do and filler activities with time-of-day slots, and
//! the last day of a round trip carries the return leg. Anything required
//! but absent becomes an explicit placeholder item - the assembler never
//! fabricates a flight number, price, or rating it was not given.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::candidate::{ActivityOffer, FlightOffer, LodgingOffer};
use crate::models::itinerary::{Itinerary, ItineraryDay, ItineraryItem, TimeSlot};
use crate::models::must_do::MustDoList;
use crate::models::preferences::ActivityPreferences;
use crate::models::trip::TripWindow;
use crate::services::date_service::build_date_range;
use crate::services::direction_service::{same_offer, MatchedLegs};

const DEFAULT_MAX_ACTIVITIES_PER_DAY: usize = 2;

pub const OPEN_EXPLORATION_LABEL: &str = "Open Exploration";
pub const OUTBOUND_PLACEHOLDER_LABEL: &str = "Transportation to destination needed";
pub const RETURN_PLACEHOLDER_LABEL: &str = "Return transportation needed";

/// Tunable assembly knobs. The per-day activity cap is a product decision,
/// not an invariant; it can be overridden per deployment.
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    pub max_activities_per_day: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            max_activities_per_day: DEFAULT_MAX_ACTIVITIES_PER_DAY,
        }
    }
}

impl AssemblyConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_activities_per_day: std::env::var("ITINERARY_MAX_ACTIVITIES_PER_DAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|cap| *cap > 0)
                .unwrap_or(defaults.max_activities_per_day),
        }
    }
}

#[derive(Default)]
pub struct ItineraryAssembler {
    config: AssemblyConfig,
}

impl ItineraryAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AssemblyConfig) -> Self {
        Self { config }
    }

    /// Build the day-by-day itinerary. Missing transport or lodging degrade
    /// to placeholder items; only an unresolvable window is fatal, and that
    /// is caught before this runs.
    pub fn assemble(
        &self,
        window: &TripWindow,
        legs: &MatchedLegs,
        hotel: Option<&LodgingOffer>,
        activities: &[ActivityOffer],
        must_do: &MustDoList,
        prefs: &ActivityPreferences,
    ) -> Itinerary {
        let dates = build_date_range(window.start_date, window.end_date);
        let round_trip = !window.is_one_way();

        let mut days: Vec<ItineraryDay> = Vec::with_capacity(dates.len());

        days.push(self.first_day(dates[0], legs.outbound.as_ref(), hotel));

        if round_trip {
            days.push(last_day(
                dates[dates.len() - 1],
                legs.return_leg.as_ref(),
                legs.outbound.as_ref(),
            ));
        }

        let interior = if round_trip {
            &dates[1..dates.len() - 1]
        } else {
            &[]
        };
        if !interior.is_empty() {
            let buckets = self.plan_interior_days(interior.len(), activities, must_do, prefs, hotel);
            for (date, items) in interior.iter().zip(buckets) {
                days.push(ItineraryDay {
                    day_number: 0,
                    calendar_date: *date,
                    items,
                });
            }
        }

        // Days were appended out of chronological order above (last day
        // before the interior). The final sort plus dense renumbering is
        // what guarantees the 1..N ordering invariant.
        days.sort_by_key(|day| day.calendar_date);
        for (index, day) in days.iter_mut().enumerate() {
            day.day_number = index as u32 + 1;
        }

        // Totals are filled in by the cost aggregator afterwards.
        Itinerary {
            days,
            total_price: 0.0,
            total_score: 0.0,
        }
    }

    fn first_day(
        &self,
        date: NaiveDate,
        outbound: Option<&FlightOffer>,
        hotel: Option<&LodgingOffer>,
    ) -> ItineraryDay {
        let mut items = Vec::new();

        match outbound {
            Some(flight) => items.push(ItineraryItem::Flight {
                time_slot: TimeSlot::Morning,
                price: flight.price,
                detail: flight.clone(),
            }),
            None => items.push(ItineraryItem::Placeholder {
                time_slot: TimeSlot::Morning,
                label: OUTBOUND_PLACEHOLDER_LABEL.to_string(),
            }),
        }

        if let Some(lodging) = hotel {
            items.push(ItineraryItem::Hotel {
                time_slot: TimeSlot::Afternoon,
                note: "Check-in".to_string(),
                price: lodging.price,
                detail: lodging.clone(),
            });
        }

        ItineraryDay {
            day_number: 0,
            calendar_date: date,
            items,
        }
    }

    /// Distribute must-do and filler activities across the interior days.
    /// Must-dos are placed first, before the regular pool is even filtered,
    /// so a disliked category can never evict an explicit user request.
    fn plan_interior_days(
        &self,
        day_count: usize,
        activities: &[ActivityOffer],
        must_do: &MustDoList,
        prefs: &ActivityPreferences,
        hotel: Option<&LodgingOffer>,
    ) -> Vec<Vec<ItineraryItem>> {
        let cap = self.config.max_activities_per_day.max(1);
        let mut buckets: Vec<Vec<ItineraryItem>> = vec![Vec::new(); day_count];
        let mut taken: Vec<HashSet<TimeSlot>> = vec![HashSet::new(); day_count];
        let mut counts = vec![0usize; day_count];

        // Round-robin must-dos: ceil(n / days) per day, capped.
        let per_day = if must_do.is_empty() {
            0
        } else {
            ((must_do.len() + day_count - 1) / day_count).min(cap)
        };

        for request in must_do.items() {
            let target = (0..day_count)
                .min_by_key(|day| counts[*day])
                .filter(|day| counts[*day] < per_day);

            match target {
                Some(day) => {
                    let slot = choose_slot(
                        &format!(
                            "{} {}",
                            request.category.as_deref().unwrap_or(""),
                            request.name
                        ),
                        request.duration_minutes,
                        counts[day],
                        &mut taken[day],
                    );
                    buckets[day].push(ItineraryItem::Activity {
                        time_slot: slot,
                        name: request.name.clone(),
                        description: request.description.clone(),
                        price: 0.0,
                        must_do: true,
                    });
                    counts[day] += 1;
                }
                None => {
                    eprintln!(
                        "Must-do '{}' exceeds the per-day activity budget; not placed",
                        request.name
                    );
                }
            }
        }

        // Fill remaining capacity with the preference-filtered pool, sliced
        // evenly so one day does not soak up every candidate.
        let filler = filter_activities(activities, prefs);
        if !filler.is_empty() {
            for day in 0..day_count {
                let slice_start = day * filler.len() / day_count;
                let slice_end = (day + 1) * filler.len() / day_count;
                for offer in &filler[slice_start..slice_end] {
                    if counts[day] >= cap {
                        break;
                    }
                    let slot = choose_slot(
                        &offer.keyword_text(),
                        offer.duration_minutes,
                        counts[day],
                        &mut taken[day],
                    );
                    buckets[day].push(ItineraryItem::Activity {
                        time_slot: slot,
                        name: offer.name.clone(),
                        description: offer.description.clone(),
                        price: offer.price,
                        must_do: false,
                    });
                    counts[day] += 1;
                }
            }
        }

        // No day is left empty: an unscheduled day gets an explicit open
        // exploration marker instead of fabricated suggestions.
        for day in 0..day_count {
            if counts[day] == 0 {
                let slot = choose_slot("", None, 0, &mut taken[day]);
                buckets[day].push(ItineraryItem::Placeholder {
                    time_slot: slot,
                    label: OPEN_EXPLORATION_LABEL.to_string(),
                });
            }

            if let Some(lodging) = hotel {
                buckets[day].push(ItineraryItem::Hotel {
                    time_slot: TimeSlot::Evening,
                    note: "Overnight stay".to_string(),
                    price: 0.0,
                    detail: lodging.clone(),
                });
            }
        }

        buckets
    }
}

fn last_day(
    date: NaiveDate,
    return_leg: Option<&FlightOffer>,
    outbound: Option<&FlightOffer>,
) -> ItineraryDay {
    let items = match return_leg {
        Some(flight) => {
            // Round-trip providers price both legs on one offer; do not
            // charge the fare a second time on the way home.
            let price = match outbound {
                Some(out) if same_offer(out, flight) => 0.0,
                _ => flight.price,
            };
            vec![ItineraryItem::Flight {
                time_slot: TimeSlot::Evening,
                price,
                detail: flight.clone(),
            }]
        }
        None => vec![ItineraryItem::Placeholder {
            time_slot: TimeSlot::Evening,
            label: RETURN_PLACEHOLDER_LABEL.to_string(),
        }],
    };

    ItineraryDay {
        day_number: 0,
        calendar_date: date,
        items,
    }
}

/// Apply category and guided-tour preferences. A filter that empties the
/// pool falls back to the unfiltered pool rather than producing empty days.
fn filter_activities(activities: &[ActivityOffer], prefs: &ActivityPreferences) -> Vec<ActivityOffer> {
    let filtered: Vec<ActivityOffer> = activities
        .iter()
        .filter(|offer| {
            let text = offer.keyword_text();
            if prefs
                .avoided_categories
                .iter()
                .any(|category| text.contains(&category.to_lowercase()))
            {
                return false;
            }
            if !prefs.preferred_categories.is_empty()
                && !prefs
                    .preferred_categories
                    .iter()
                    .any(|category| text.contains(&category.to_lowercase()))
            {
                return false;
            }
            if prefs.prefer_guided_tours && !(offer.guided || text.contains("guided")) {
                return false;
            }
            true
        })
        .cloned()
        .collect();

    if filtered.is_empty() {
        activities.to_vec()
    } else {
        filtered
    }
}

/// Pick a time slot from category/duration keywords, falling back through
/// the slot's alternates when the preferred one is taken, then to a plain
/// Morning/Afternoon/Evening rotation by item index.
fn choose_slot(
    keyword_text: &str,
    duration_minutes: Option<f64>,
    item_index: usize,
    taken: &mut HashSet<TimeSlot>,
) -> TimeSlot {
    if let Some(preferred) = preferred_slot(keyword_text, duration_minutes) {
        if taken.insert(preferred) {
            return preferred;
        }
        for alternate in preferred.alternates() {
            if taken.insert(*alternate) {
                return *alternate;
            }
        }
    }

    let rotation = TimeSlot::ROTATION;
    let start = item_index % rotation.len();
    for offset in 0..rotation.len() {
        let slot = rotation[(start + offset) % rotation.len()];
        if taken.insert(slot) {
            return slot;
        }
    }

    // Every slot on the day is taken; reuse the rotation pick.
    rotation[start]
}

fn preferred_slot(keyword_text: &str, duration_minutes: Option<f64>) -> Option<TimeSlot> {
    let text = keyword_text.to_lowercase();

    if ["dinner", "supper"].iter().any(|kw| text.contains(kw)) {
        return Some(TimeSlot::Dinner);
    }
    if ["nightlife", "night", "bar", "club", "concert", "show", "cabaret"]
        .iter()
        .any(|kw| text.contains(kw))
    {
        return Some(TimeSlot::Evening);
    }
    if ["lunch", "food", "dining", "culinary", "tasting", "restaurant", "market"]
        .iter()
        .any(|kw| text.contains(kw))
    {
        return Some(TimeSlot::Lunch);
    }
    if ["museum", "gallery", "historic", "monument", "cathedral"]
        .iter()
        .any(|kw| text.contains(kw))
        || duration_minutes.map_or(false, |minutes| minutes >= 240.0)
    {
        return Some(TimeSlot::Morning);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use crate::models::must_do::MustDoActivity;
    use crate::models::trip::TripWindow;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flight(id: &str, origin: &str, destination: &str, price: f64) -> FlightOffer {
        FlightOffer {
            id: Some(id.to_string()),
            origin: Some(origin.to_string()),
            destination: Some(destination.to_string()),
            price,
            ..Default::default()
        }
    }

    fn hotel() -> LodgingOffer {
        LodgingOffer {
            name: "Hotel du Parc".to_string(),
            price: 150.0,
            rating: Some(4.0),
            ..Default::default()
        }
    }

    fn activity(name: &str, tags: &[&str]) -> ActivityOffer {
        ActivityOffer {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            price: 40.0,
            ..Default::default()
        }
    }

    fn must_do(name: &str) -> MustDoActivity {
        MustDoActivity {
            name: name.to_string(),
            description: String::new(),
            category: None,
            duration_minutes: None,
            recorded_at: Utc::now(),
        }
    }

    fn eight_day_window() -> TripWindow {
        TripWindow::round_trip(date(2025, 11, 20), date(2025, 11, 27))
    }

    fn legs(outbound: Option<FlightOffer>, return_leg: Option<FlightOffer>) -> MatchedLegs {
        MatchedLegs {
            outbound,
            return_leg,
        }
    }

    fn activity_count(day: &ItineraryDay) -> usize {
        day.items
            .iter()
            .filter(|item| matches!(item, ItineraryItem::Activity { .. }))
            .count()
    }

    #[test]
    fn test_full_round_trip_layout() {
        // 8-day window, 1 must-do, 3 regular activities, both legs and a
        // hotel: day 1 = outbound + check-in, days 2-7 never empty, day 8 =
        // return flight only.
        let assembler = ItineraryAssembler::new();
        let must_dos: MustDoList = [must_do("Louvre")].into_iter().collect();
        let pool = vec![
            activity("Seine cruise", &["sightseeing"]),
            activity("Wine tasting", &["food"]),
            activity("Catacombs", &["historic"]),
        ];

        let itinerary = assembler.assemble(
            &eight_day_window(),
            &legs(
                Some(flight("out", "JFK", "CDG", 500.0)),
                Some(flight("back", "CDG", "JFK", 480.0)),
            ),
            Some(&hotel()),
            &pool,
            &must_dos,
            &ActivityPreferences::default(),
        );

        assert_eq!(itinerary.days.len(), 8);

        let first = &itinerary.days[0];
        assert!(matches!(first.items[0], ItineraryItem::Flight { .. }));
        assert!(matches!(
            &first.items[1],
            ItineraryItem::Hotel { note, .. } if note == "Check-in"
        ));

        for day in &itinerary.days[1..7] {
            let has_activity = activity_count(day) > 0;
            let has_open_slot = day.items.iter().any(|item| {
                matches!(item, ItineraryItem::Placeholder { label, .. } if label == OPEN_EXPLORATION_LABEL)
            });
            assert!(has_activity || has_open_slot, "interior day left empty");
        }

        let last = &itinerary.days[7];
        assert_eq!(last.items.len(), 1);
        assert!(matches!(
            &last.items[0],
            ItineraryItem::Flight { detail, .. } if detail.id.as_deref() == Some("back")
        ));
    }

    #[test]
    fn test_missing_flights_degrade_to_placeholders() {
        let assembler = ItineraryAssembler::new();
        let itinerary = assembler.assemble(
            &eight_day_window(),
            &legs(None, None),
            None,
            &[],
            &MustDoList::new(),
            &ActivityPreferences::default(),
        );

        assert!(matches!(
            &itinerary.days[0].items[0],
            ItineraryItem::Placeholder { label, .. } if label == OUTBOUND_PLACEHOLDER_LABEL
        ));
        assert!(matches!(
            &itinerary.days[7].items[0],
            ItineraryItem::Placeholder { label, .. } if label == RETURN_PLACEHOLDER_LABEL
        ));
        // No fabricated flight appears anywhere.
        assert!(itinerary
            .days
            .iter()
            .flat_map(|day| &day.items)
            .all(|item| !matches!(item, ItineraryItem::Flight { .. })));
    }

    #[test]
    fn test_one_way_window_yields_single_day() {
        let assembler = ItineraryAssembler::new();
        let itinerary = assembler.assemble(
            &TripWindow::one_way(date(2025, 11, 20)),
            &legs(Some(flight("out", "JFK", "CDG", 500.0)), None),
            Some(&hotel()),
            &[activity("Seine cruise", &[])],
            &MustDoList::new(),
            &ActivityPreferences::default(),
        );

        assert_eq!(itinerary.days.len(), 1);
        assert_eq!(itinerary.days[0].day_number, 1);
    }

    #[test]
    fn test_day_numbers_are_dense_and_chronological() {
        let assembler = ItineraryAssembler::new();
        let itinerary = assembler.assemble(
            &eight_day_window(),
            &legs(None, None),
            None,
            &[],
            &MustDoList::new(),
            &ActivityPreferences::default(),
        );

        for (index, day) in itinerary.days.iter().enumerate() {
            assert_eq!(day.day_number, index as u32 + 1);
            if index > 0 {
                assert!(day.calendar_date > itinerary.days[index - 1].calendar_date);
            }
        }
    }

    #[test]
    fn test_every_must_do_placed_exactly_once() {
        let assembler = ItineraryAssembler::new();
        let must_dos: MustDoList = ["Louvre", "Seine cruise", "Catacombs", "Montmartre"]
            .into_iter()
            .map(must_do)
            .collect();

        let itinerary = assembler.assemble(
            &eight_day_window(),
            &legs(None, None),
            None,
            &[],
            &must_dos,
            &ActivityPreferences::default(),
        );

        for request in must_dos.items() {
            let appearances = itinerary
                .days
                .iter()
                .flat_map(|day| &day.items)
                .filter(|item| {
                    matches!(item, ItineraryItem::Activity { name, must_do: true, .. } if name == &request.name)
                })
                .count();
            assert_eq!(appearances, 1, "must-do '{}' appeared {} times", request.name, appearances);
        }
    }

    #[test]
    fn test_per_day_activity_cap_is_respected() {
        let assembler = ItineraryAssembler::new();
        let pool: Vec<ActivityOffer> = (0..12)
            .map(|i| activity(&format!("Activity {i}"), &[]))
            .collect();
        let must_dos: MustDoList = ["Louvre", "Orsay", "Pantheon"].into_iter().map(must_do).collect();

        let itinerary = assembler.assemble(
            &eight_day_window(),
            &legs(None, None),
            None,
            &pool,
            &must_dos,
            &ActivityPreferences::default(),
        );

        for day in &itinerary.days[1..7] {
            assert!(activity_count(day) <= 2, "day {} over cap", day.day_number);
        }
    }

    #[test]
    fn test_slots_within_a_day_do_not_conflict() {
        let assembler = ItineraryAssembler::new();
        // Two museum-ish activities prefer Morning; the second must move.
        let pool = vec![
            activity("Louvre Museum", &["museum"]),
            activity("Orsay Museum", &["museum"]),
        ];
        let window = TripWindow::round_trip(date(2025, 11, 20), date(2025, 11, 22));

        let itinerary = assembler.assemble(
            &window,
            &legs(None, None),
            None,
            &pool,
            &MustDoList::new(),
            &ActivityPreferences::default(),
        );

        let interior = &itinerary.days[1];
        let slots: Vec<TimeSlot> = interior
            .items
            .iter()
            .filter(|item| matches!(item, ItineraryItem::Activity { .. }))
            .map(ItineraryItem::time_slot)
            .collect();
        assert_eq!(slots.len(), 2);
        assert_ne!(slots[0], slots[1]);
        assert_eq!(slots[0], TimeSlot::Morning);
    }

    #[test]
    fn test_category_filter_falls_back_when_it_empties_the_pool() {
        let assembler = ItineraryAssembler::new();
        let pool = vec![activity("Seine cruise", &["sightseeing"])];
        let prefs = ActivityPreferences {
            preferred_categories: vec!["skydiving".to_string()],
            ..Default::default()
        };

        let itinerary = assembler.assemble(
            &TripWindow::round_trip(date(2025, 11, 20), date(2025, 11, 22)),
            &legs(None, None),
            None,
            &pool,
            &MustDoList::new(),
            &prefs,
        );

        // The lone (non-matching) activity is still scheduled rather than
        // leaving the interior day to a bare placeholder.
        assert_eq!(activity_count(&itinerary.days[1]), 1);
    }

    #[test]
    fn test_shared_offer_fare_charged_once() {
        let assembler = ItineraryAssembler::new();
        let out = flight("offer-1", "JFK", "CDG", 980.0);
        let back = flight("offer-1", "CDG", "JFK", 980.0);

        let itinerary = assembler.assemble(
            &eight_day_window(),
            &legs(Some(out), Some(back)),
            None,
            &[],
            &MustDoList::new(),
            &ActivityPreferences::default(),
        );

        let charged: f64 = itinerary
            .days
            .iter()
            .flat_map(|day| &day.items)
            .map(ItineraryItem::realized_price)
            .sum();
        assert_eq!(charged, 980.0);
    }
}
