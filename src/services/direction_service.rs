//! Direction Matcher
//!
//! Classifies each transport-leg candidate as outbound or return relative to
//! a known origin/destination pair. Provider records do not always carry
//! usable airport codes, so a documented heuristic fallback kicks in when
//! code-based matching is impossible: the first valid candidate flies out,
//! and the next one that looks reversed (or merely distinct, absent any code
//! information) flies back. Synthetic placeholder candidates are dropped
//! before classification ever runs.

use serde::{Deserialize, Serialize};

use crate::models::candidate::FlightOffer;

/// The known endpoints of the trip, as extracted upstream. Either side may
/// be unknown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteEndpoints {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

impl RouteEndpoints {
    pub fn new(origin: Option<String>, destination: Option<String>) -> Self {
        Self {
            origin: origin.as_deref().and_then(clean_code),
            destination: destination.as_deref().and_then(clean_code),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchedLegs {
    pub outbound: Option<FlightOffer>,
    pub return_leg: Option<FlightOffer>,
}

/// Classify a flight pool against the known endpoints.
pub fn match_directions(candidates: &[FlightOffer], endpoints: &RouteEndpoints) -> MatchedLegs {
    let usable: Vec<&FlightOffer> = candidates.iter().filter(|c| !c.placeholder).collect();
    let mut legs = MatchedLegs::default();
    if usable.is_empty() {
        return legs;
    }

    if let (Some(origin), Some(destination)) = (&endpoints.origin, &endpoints.destination) {
        let mut any_coded = false;
        for candidate in &usable {
            let from = candidate.origin.as_deref().and_then(clean_code);
            let to = candidate.destination.as_deref().and_then(clean_code);
            match (from, to) {
                (Some(from), Some(to)) => {
                    any_coded = true;
                    if from == *origin && to == *destination {
                        if legs.outbound.is_none() {
                            legs.outbound = Some((*candidate).clone());
                        }
                    } else if from == *destination && to == *origin {
                        if legs.return_leg.is_none() {
                            legs.return_leg = Some((*candidate).clone());
                        }
                    }
                }
                _ => {}
            }
        }

        // Candidates that carried codes but matched neither direction are
        // unrelated legs, not ambiguous ones; the heuristic applies only
        // when no candidate's codes could be determined at all.
        if legs.outbound.is_some() || legs.return_leg.is_some() || any_coded {
            return legs;
        }
    }

    heuristic_match(&usable)
}

/// Code-free fallback: first candidate is outbound; the return leg is the
/// first later candidate whose endpoints look reversed, or simply the next
/// distinct candidate when nobody has codes.
fn heuristic_match(usable: &[&FlightOffer]) -> MatchedLegs {
    let first = usable[0];
    let mut legs = MatchedLegs {
        outbound: Some(first.clone()),
        return_leg: None,
    };

    for candidate in usable.iter().skip(1) {
        if looks_reversed(candidate, first) || (codes_unknown(candidate) && !same_offer(candidate, first))
        {
            legs.return_leg = Some((*candidate).clone());
            break;
        }
    }

    legs
}

fn looks_reversed(candidate: &FlightOffer, reference: &FlightOffer) -> bool {
    let c_from = candidate.origin.as_deref().and_then(clean_code);
    let c_to = candidate.destination.as_deref().and_then(clean_code);
    let r_from = reference.origin.as_deref().and_then(clean_code);
    let r_to = reference.destination.as_deref().and_then(clean_code);

    matches!((c_from, c_to, r_from, r_to),
        (Some(cf), Some(ct), Some(rf), Some(rt)) if cf == rt && ct == rf)
}

fn codes_unknown(candidate: &FlightOffer) -> bool {
    candidate.origin.is_none() || candidate.destination.is_none()
}

/// Two records describing the same underlying offer. Round-trip providers
/// often return both legs under one offer id.
pub fn same_offer(a: &FlightOffer, b: &FlightOffer) -> bool {
    match (&a.id, &b.id) {
        (Some(a_id), Some(b_id)) => a_id == b_id,
        _ => a.price == b.price && a.flight_number == b.flight_number && a.airline == b.airline,
    }
}

fn clean_code(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}
