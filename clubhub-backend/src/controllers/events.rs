use actix_web::{web, HttpResponse, Responder};

use super::{bad_request, db_error, not_found};
use crate::models::{
    CreateEventRequest, DeleteResponse, EventUpdateOutcome, RegisterForEventRequest, RegistrationOutcome, UpdateEventRequest,
};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("", web::post().to(create_event))
            .route("", web::get().to(list_events))
            .route("/club/{club_id}", web::get().to(list_club_events))
            .route("/{id}", web::get().to(get_event))
            .route("/{id}", web::put().to(update_event))
            .route("/{id}", web::delete().to(delete_event))
            .route("/{id}/register", web::post().to(register)),
    );
}

fn validate_max_seats(max_seats: Option<i64>) -> Result<(), HttpResponse> {
    match max_seats {
        Some(max) if max < 1 => Err(bad_request("max_seats must be at least 1")),
        _ => Ok(()),
    }
}

fn require_club(data: &web::Data<AppState>, club_id: i64) -> Result<(), HttpResponse> {
    match data.db.get_club(club_id) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(not_found("Club not found")),
        Err(e) => Err(db_error("get club", e)),
    }
}

async fn create_event(data: web::Data<AppState>, body: web::Json<CreateEventRequest>) -> impl Responder {
    let request = body.into_inner();
    if request.title.trim().is_empty() {
        return bad_request("Event title is required");
    }
    if let Err(resp) = validate_max_seats(request.max_seats) {
        return resp;
    }
    if let Err(resp) = require_club(&data, request.club_id) {
        return resp;
    }

    match data.db.create_event(&request) {
        Ok(event) => {
            log::info!("Club {} created event {}", event.club_id, event.id);
            HttpResponse::Created().json(event)
        }
        Err(e) => db_error("create event", e),
    }
}

async fn list_events(data: web::Data<AppState>) -> impl Responder {
    match data.db.list_event_summaries() {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => db_error("list events", e),
    }
}

async fn list_club_events(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let club_id = path.into_inner();
    if let Err(resp) = require_club(&data, club_id) {
        return resp;
    }
    match data.db.list_club_events(club_id) {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => db_error("list club events", e),
    }
}

/// Fetching a single event counts as a view
async fn get_event(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.get_event_and_record_view(path.into_inner()) {
        Ok(Some(event)) => HttpResponse::Ok().json(event),
        Ok(None) => not_found("Event not found"),
        Err(e) => db_error("get event", e),
    }
}

async fn update_event(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateEventRequest>,
) -> impl Responder {
    let request = body.into_inner();
    if let Err(resp) = validate_max_seats(request.max_seats.flatten()) {
        return resp;
    }

    match data.db.update_event(path.into_inner(), &request) {
        Ok(EventUpdateOutcome::Updated(event)) => HttpResponse::Ok().json(event),
        Ok(EventUpdateOutcome::NotFound) => not_found("Event not found"),
        Ok(EventUpdateOutcome::SeatsBelowRegistrations { current_registrations }) => bad_request(&format!(
            "max_seats cannot be below the {} registrations already taken",
            current_registrations
        )),
        Err(e) => db_error("update event", e),
    }
}

async fn delete_event(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.delete_event(path.into_inner()) {
        Ok(true) => HttpResponse::Ok().json(DeleteResponse::deleted("Event")),
        Ok(false) => not_found("Event not found"),
        Err(e) => db_error("delete event", e),
    }
}

async fn register(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<RegisterForEventRequest>,
) -> impl Responder {
    let event_id = path.into_inner();
    match data.db.register_for_event(event_id, body.student_id) {
        Ok(RegistrationOutcome::Registered(event)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Successfully registered for event",
            "event": event
        })),
        Ok(RegistrationOutcome::EventNotFound) => not_found("Event not found"),
        Ok(RegistrationOutcome::StudentNotFound) => not_found("Student not found"),
        Ok(RegistrationOutcome::AlreadyRegistered) => bad_request("Student already registered for this event"),
        Ok(RegistrationOutcome::EventFull) => bad_request("Event is full"),
        Err(e) => db_error("register for event", e),
    }
}
