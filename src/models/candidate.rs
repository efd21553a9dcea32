//! Canonical candidate shapes and the ingestion boundary.
//!
//! Provider records arrive as loosely-shaped JSON: prices show up as bare
//! numbers, numeric strings, or nested `{amount: ...}` objects; durations as
//! ISO-8601-ish `PT7H30M`, free text `7h 30m`, or raw minutes; airport codes
//! under half a dozen alternate field names. Everything is normalized here,
//! once, into `FlightOffer` / `LodgingOffer` / `ActivityOffer` so the scoring
//! and assembly logic never sees an aliased field. Unparseable numerics are
//! coerced to safe defaults (0 price, no rating) instead of erroring, so one
//! malformed record cannot abort a planning run.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A transport-leg candidate, normalized from provider JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub stops: u32,
    #[serde(default)]
    pub is_optimal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
    #[serde(default)]
    pub placeholder: bool,
}

/// A lodging candidate, normalized from provider JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LodgingOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_center: Option<f64>,
    #[serde(default)]
    pub placeholder: bool,
}

/// A point-of-interest activity candidate, normalized from provider JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub guided: bool,
    #[serde(default)]
    pub placeholder: bool,
}

impl FlightOffer {
    pub fn from_provider(value: &Value) -> Self {
        let origin = first_string(
            value,
            &[
                "origin",
                "originLocationCode",
                "origin_code",
                "from",
                "departureAirport",
            ],
        )
        .or_else(|| nested_string(value, "departure", &["iataCode", "airport"]))
        .map(normalize_code);

        let destination = first_string(
            value,
            &[
                "destination",
                "destinationLocationCode",
                "destination_code",
                "to",
                "arrivalAirport",
            ],
        )
        .or_else(|| nested_string(value, "arrival", &["iataCode", "airport"]))
        .map(normalize_code);

        let airline = first_string(value, &["airline", "carrierCode", "carrier"])
            .or_else(|| first_segment_string(value, &["airline", "carrierCode"]));
        let flight_number = first_string(value, &["flight_number", "flightNumber", "number"])
            .or_else(|| first_segment_string(value, &["flight_number", "number"]));

        let price = coerce_price(value.get("price").unwrap_or(&Value::Null));
        let duration_minutes = value
            .get("duration_minutes")
            .or_else(|| value.get("durationMinutes"))
            .or_else(|| value.get("duration"))
            .and_then(coerce_duration_minutes);

        let stops = value
            .get("stops")
            .and_then(Value::as_u64)
            .map(|s| s as u32)
            .unwrap_or_else(|| segment_count(value).saturating_sub(1) as u32);

        let airline_name = airline
            .as_deref()
            .and_then(airline_display_name)
            .map(str::to_string)
            .or_else(|| first_string(value, &["airline_name", "airlineName"]));

        let booking_link = first_string(value, &["booking_link", "bookingLink"]).or_else(|| {
            derive_booking_link(
                airline.as_deref(),
                airline_name.as_deref(),
                flight_number.as_deref(),
            )
        });

        let marked_synthetic = value.get("placeholder").and_then(Value::as_bool) == Some(true)
            || value.get("hasRealData").and_then(Value::as_bool) == Some(false);

        let mut offer = Self {
            id: id_string(value),
            placeholder: marked_synthetic,
            airline,
            airline_name,
            flight_number,
            origin,
            destination,
            price,
            currency: currency_of(value),
            duration_minutes,
            stops,
            is_optimal: false,
            booking_link,
        };

        // A record with no carrier, no endpoints, and no price carries no
        // real flight data; treat it as synthetic.
        if offer.airline.is_none()
            && offer.origin.is_none()
            && offer.destination.is_none()
            && offer.price == 0.0
        {
            offer.placeholder = true;
        }

        offer
    }

    /// Human-readable label for insights, e.g. "Delta Air Lines DL 405".
    pub fn display_label(&self) -> String {
        let name = self
            .airline_name
            .clone()
            .or_else(|| self.airline.clone())
            .unwrap_or_else(|| "flight".to_string());
        match &self.flight_number {
            Some(number) => format!("{} {}", name, number),
            None => name,
        }
    }
}

impl LodgingOffer {
    pub fn from_provider(value: &Value) -> Self {
        let name = first_string(value, &["name", "hotel_name", "hotelName"])
            .or_else(|| nested_string(value, "hotel", &["name"]))
            .unwrap_or_default();

        let price_field = value
            .get("price")
            .cloned()
            .or_else(|| first_offer_price(value))
            .unwrap_or(Value::Null);

        let rating = value
            .get("rating")
            .and_then(coerce_rating)
            .or_else(|| nested_value(value, "hotel", "rating").as_ref().and_then(coerce_rating));

        let distance_from_center = value
            .get("distance_from_center")
            .or_else(|| value.get("distanceFromCenter"))
            .or_else(|| value.get("distance"))
            .and_then(coerce_metric);

        Self {
            id: first_string(value, &["hotel_id", "hotelId", "id"])
                .or_else(|| nested_string(value, "hotel", &["hotelId"])),
            name,
            price: coerce_price(&price_field),
            currency: currency_of(value).or_else(|| currency_of(&price_field)),
            rating,
            distance_from_center,
            placeholder: value.get("placeholder").and_then(Value::as_bool) == Some(true),
        }
    }
}

impl ActivityOffer {
    pub fn from_provider(value: &Value) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for key in ["tags", "categories", "activity_types"] {
            if let Some(list) = value.get(key).and_then(Value::as_array) {
                tags.extend(list.iter().filter_map(|t| t.as_str().map(str::to_string)));
            }
        }
        if let Some(category) = first_string(value, &["category"]) {
            tags.push(category);
        }

        let guided = value
            .get("guided")
            .or_else(|| value.get("isGuided"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            id: id_string(value),
            name: first_string(value, &["name", "title"]).unwrap_or_default(),
            description: first_string(value, &["description", "shortDescription"])
                .unwrap_or_default(),
            tags,
            price: coerce_price(value.get("price").unwrap_or(&Value::Null)),
            currency: currency_of(value),
            rating: value.get("rating").and_then(coerce_rating),
            duration_minutes: value
                .get("duration_minutes")
                .or_else(|| value.get("durationMinutes"))
                .or_else(|| value.get("duration"))
                .and_then(coerce_duration_minutes),
            guided,
            placeholder: value.get("placeholder").and_then(Value::as_bool) == Some(true),
        }
    }

    /// Everything keyword matching can look at: name, description and tags.
    pub fn keyword_text(&self) -> String {
        let mut text = format!("{} {}", self.name, self.description);
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text.to_lowercase()
    }
}

/// Normalize a whole provider pool, dropping synthetic placeholder records.
pub fn ingest_flights(values: &[Value]) -> Vec<FlightOffer> {
    values
        .iter()
        .map(FlightOffer::from_provider)
        .filter(|offer| !offer.placeholder)
        .collect()
}

pub fn ingest_hotels(values: &[Value]) -> Vec<LodgingOffer> {
    values
        .iter()
        .map(LodgingOffer::from_provider)
        .filter(|offer| !offer.placeholder)
        .collect()
}

pub fn ingest_activities(values: &[Value]) -> Vec<ActivityOffer> {
    values
        .iter()
        .map(ActivityOffer::from_provider)
        .filter(|offer| !offer.placeholder)
        .collect()
}

/// Flag the best deals in a flight pool: the three cheapest offers, plus any
/// direct flight among the five cheapest.
pub fn mark_best_deals(flights: &mut [FlightOffer]) {
    if flights.is_empty() {
        return;
    }

    let mut order: Vec<usize> = (0..flights.len()).collect();
    order.sort_by(|a, b| {
        flights[*a]
            .price
            .partial_cmp(&flights[*b].price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for &idx in order.iter().take(3) {
        flights[idx].is_optimal = true;
    }
    for &idx in order.iter().take(5) {
        if flights[idx].stops == 0 {
            flights[idx].is_optimal = true;
        }
    }
}

// --- coercion helpers -------------------------------------------------------

/// Resolve a price that may be a number, a numeric string, or an object
/// nesting the amount under `amount` / `total` / `value`. Anything else, and
/// anything negative or non-finite, becomes 0.
pub fn coerce_price(value: &Value) -> f64 {
    match value {
        Value::Number(n) => sanitize_money(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => sanitize_money(
            s.trim()
                .trim_start_matches('$')
                .replace(',', "")
                .parse()
                .unwrap_or(0.0),
        ),
        Value::Object(map) => {
            for key in ["amount", "total", "value"] {
                if let Some(inner) = map.get(key) {
                    return coerce_price(inner);
                }
            }
            0.0
        }
        _ => 0.0,
    }
}

fn sanitize_money(amount: f64) -> f64 {
    if amount.is_finite() && amount >= 0.0 {
        amount
    } else {
        0.0
    }
}

/// A rating on the provider's 0-5 scale; numeric strings ("4") are accepted
/// because some hotel feeds stringify them.
pub fn coerce_rating(value: &Value) -> Option<f64> {
    let rating = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if rating.is_finite() && rating >= 0.0 {
        Some(rating.min(5.0))
    } else {
        None
    }
}

/// A duration in minutes from `PT7H30M`, `7h 30m`, `45m`, or a bare number.
pub fn coerce_duration_minutes(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|m| m.is_finite() && *m >= 0.0),
        Value::String(s) => parse_duration_text(s),
        _ => None,
    }
}

fn parse_duration_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let pattern = if text.to_ascii_uppercase().starts_with("PT") {
        r"(?i)^PT(?:(\d+)H)?(?:(\d+)M)?$"
    } else {
        r"(?i)^(?:(\d+(?:\.\d+)?)\s*h(?:ours?)?)?\s*(?:(\d+)\s*m(?:in(?:utes?)?)?)?$"
    };

    let re = Regex::new(pattern).unwrap();
    if let Some(caps) = re.captures(text) {
        let hours: f64 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0);
        let minutes: f64 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0);
        let total = hours * 60.0 + minutes;
        if total > 0.0 {
            return Some(total);
        }
    }

    // Bare minutes as a string, e.g. "450".
    text.parse::<f64>().ok().filter(|m| m.is_finite() && *m >= 0.0)
}

/// A non-negative metric (e.g. distance from city center in km), possibly
/// nested as `{value: ...}`.
fn coerce_metric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v >= 0.0),
        Value::String(s) => s.trim().parse().ok().filter(|v: &f64| v.is_finite() && *v >= 0.0),
        Value::Object(map) => map.get("value").and_then(coerce_metric),
        _ => None,
    }
}

fn currency_of(value: &Value) -> Option<String> {
    first_string(value, &["currency", "currencyCode"]).or_else(|| {
        value
            .get("price")
            .and_then(|p| first_string(p, &["currency", "currencyCode"]))
    })
}

/// First non-empty string found under any of the given keys.
fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = value.get(key).and_then(Value::as_str) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn nested_string(value: &Value, outer: &str, keys: &[&str]) -> Option<String> {
    value.get(outer).and_then(|inner| first_string(inner, keys))
}

fn nested_value(value: &Value, outer: &str, key: &str) -> Option<Value> {
    value.get(outer).and_then(|inner| inner.get(key)).cloned()
}

/// Amadeus-style hotel payloads nest the price under `offers[0].price`.
fn first_offer_price(value: &Value) -> Option<Value> {
    value
        .get("offers")
        .and_then(Value::as_array)
        .and_then(|offers| offers.first())
        .and_then(|offer| offer.get("price"))
        .cloned()
}

fn id_string(value: &Value) -> Option<String> {
    match value.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn first_segment_string(value: &Value, keys: &[&str]) -> Option<String> {
    segments_of(value)?
        .first()
        .and_then(|segment| first_string(segment, keys))
}

fn segment_count(value: &Value) -> usize {
    segments_of(value).map(|s| s.len()).unwrap_or(1)
}

fn segments_of(value: &Value) -> Option<&Vec<Value>> {
    value
        .get("segments")
        .or_else(|| {
            value
                .get("itineraries")
                .and_then(Value::as_array)
                .and_then(|itineraries| itineraries.first())
                .and_then(|first| first.get("segments"))
        })
        .and_then(Value::as_array)
}

fn normalize_code(code: String) -> String {
    code.trim().to_ascii_uppercase()
}

/// Display names for the carrier codes that show up most often in provider
/// data. Unknown codes pass through as-is.
fn airline_display_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "AA" => "American Airlines",
        "AF" => "Air France",
        "BA" => "British Airways",
        "DL" => "Delta Air Lines",
        "EK" => "Emirates",
        "IB" => "Iberia",
        "JL" => "Japan Airlines",
        "KL" => "KLM Royal Dutch Airlines",
        "LH" => "Lufthansa",
        "LX" => "SWISS",
        "NH" => "All Nippon Airways",
        "QF" => "Qantas",
        "QR" => "Qatar Airways",
        "SQ" => "Singapore Airlines",
        "TK" => "Turkish Airlines",
        "UA" => "United Airlines",
        "VS" => "Virgin Atlantic",
        _ => return None,
    };
    Some(name)
}

/// Carrier booking sites for the codes we recognize.
fn airline_booking_url(code: &str) -> Option<&'static str> {
    let url = match code {
        "AA" => "https://www.aa.com",
        "AF" => "https://www.airfrance.com",
        "BA" => "https://www.britishairways.com",
        "DL" => "https://www.delta.com",
        "EK" => "https://www.emirates.com",
        "IB" => "https://www.iberia.com",
        "JL" => "https://www.jal.co.jp",
        "KL" => "https://www.klm.com",
        "LH" => "https://www.lufthansa.com",
        "LX" => "https://www.swiss.com",
        "NH" => "https://www.ana.co.jp",
        "QF" => "https://www.qantas.com",
        "QR" => "https://www.qatarairways.com",
        "SQ" => "https://www.singaporeair.com",
        "TK" => "https://www.turkishairlines.com",
        "UA" => "https://www.united.com",
        "VS" => "https://www.virgin-atlantic.com",
        _ => return None,
    };
    Some(url)
}

/// Booking link for a flight we know the carrier of: the carrier's own site
/// when the code is recognized, a web search otherwise. A record with no
/// carrier information at all gets no link.
fn derive_booking_link(
    code: Option<&str>,
    name: Option<&str>,
    flight_number: Option<&str>,
) -> Option<String> {
    if let Some(url) = code.and_then(airline_booking_url) {
        return Some(url.to_string());
    }

    let label = name.or(code)?;
    let query = match flight_number {
        Some(number) => format!("{} {} booking", label, number),
        None => format!("{} booking", label),
    };
    Some(format!(
        "https://www.google.com/search?q={}",
        query.replace(' ', "+")
    ))
}
