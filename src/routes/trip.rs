use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::errors::PlanningError;
use crate::services::planning_service::{self, AssembleRequest, OptimizeRequest};

/*
    /api/trip/optimize
*/
pub async fn optimize(payload: web::Json<OptimizeRequest>) -> impl Responder {
    let request = payload.into_inner();
    println!(
        "Optimizing over {} flights, {} hotels, {} activities (budget ${:.2})",
        request.flights.len(),
        request.hotels.len(),
        request.activities.len(),
        request.user_budget
    );

    match planning_service::optimize(&request) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(err) => {
            eprintln!("Optimization failed: {}", err);
            failure_response(&err)
        }
    }
}

/*
    /api/trip/itinerary
*/
pub async fn build_itinerary(payload: web::Json<AssembleRequest>) -> impl Responder {
    let request = payload.into_inner();
    println!(
        "Assembling itinerary starting {} ({} must-do activities)",
        request.start_date,
        request.must_do.len()
    );

    match planning_service::assemble(&request) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(err) => {
            eprintln!("Itinerary assembly failed: {}", err);
            failure_response(&err)
        }
    }
}

/// A bad date is the caller's fault; the other failures are valid requests
/// with an unfortunate answer, reported in the body rather than the status.
fn failure_response(err: &PlanningError) -> HttpResponse {
    let body = json!({
        "ok": false,
        "error": err.kind(),
        "message": err.to_string(),
    });

    match err {
        PlanningError::InvalidDate(_) => HttpResponse::BadRequest().json(body),
        _ => HttpResponse::Ok().json(body),
    }
}
