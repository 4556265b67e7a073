use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{bad_request, not_found};
use crate::agents::{AgentReply, CrewError};
use crate::AppState;

#[derive(Deserialize)]
pub struct MasterRequest {
    message: String,
    #[serde(default)]
    context: Option<Value>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    club_id: i64,
    message: String,
}

#[derive(Deserialize)]
pub struct ApplyRequest {
    club_id: i64,
    student_id: i64,
}

#[derive(Deserialize)]
pub struct StudentRequest {
    student_id: i64,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    query: String,
    #[serde(default)]
    filters: Option<Value>,
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    student_id: i64,
    #[serde(default)]
    context: Option<Value>,
}

#[derive(Serialize)]
pub struct AgentResponse {
    response: String,
    agent: String,
    timestamp: DateTime<Utc>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/agents")
            .route("/master", web::post().to(master))
            .route("/chat", web::post().to(club_chat))
            .route("/chat/apply", web::post().to(application_help))
            .route("/recommendations", web::post().to(recommendations))
            .route("/recommendations/digest", web::post().to(weekly_digest))
            .route("/search", web::post().to(search))
            .route("/search/trending", web::get().to(trending))
            .route("/onboarding", web::post().to(onboarding))
            .route("/profile-update", web::post().to(profile_update)),
    );
}

fn respond(result: Result<AgentReply, CrewError>) -> HttpResponse {
    match result {
        Ok(reply) => HttpResponse::Ok().json(AgentResponse {
            response: reply.response,
            agent: reply.agent.display_name().to_string(),
            timestamp: Utc::now(),
        }),
        Err(CrewError::NotFound(what)) => not_found(&what),
        Err(CrewError::Database(e)) => super::db_error("load agent context", e),
        Err(CrewError::Ai(e)) => {
            log::error!("[AGENTS] Agent run failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Agent error: {}", e)
            }))
        }
    }
}

async fn master(data: web::Data<AppState>, body: web::Json<MasterRequest>) -> impl Responder {
    let request = body.into_inner();
    if request.message.trim().is_empty() {
        return bad_request("Message is required");
    }
    respond(
        data.crew
            .process_student_query(&request.message, request.context.as_ref())
            .await,
    )
}

async fn club_chat(data: web::Data<AppState>, body: web::Json<ChatRequest>) -> impl Responder {
    respond(data.crew.handle_club_query(body.club_id, &body.message).await)
}

async fn application_help(data: web::Data<AppState>, body: web::Json<ApplyRequest>) -> impl Responder {
    respond(data.crew.handle_application_help(body.club_id, body.student_id).await)
}

async fn recommendations(data: web::Data<AppState>, body: web::Json<StudentRequest>) -> impl Responder {
    respond(data.crew.handle_recommendation_request(body.student_id).await)
}

async fn weekly_digest(data: web::Data<AppState>, body: web::Json<StudentRequest>) -> impl Responder {
    respond(data.crew.handle_weekly_digest(body.student_id).await)
}

async fn search(data: web::Data<AppState>, body: web::Json<SearchRequest>) -> impl Responder {
    let request = body.into_inner();
    if request.query.trim().is_empty() {
        return bad_request("Query is required");
    }
    respond(
        data.crew
            .handle_search_query(&request.query, request.filters.as_ref())
            .await,
    )
}

async fn trending(data: web::Data<AppState>) -> impl Responder {
    respond(data.crew.handle_trending_events().await)
}

async fn onboarding(data: web::Data<AppState>, body: web::Json<StudentRequest>) -> impl Responder {
    respond(data.crew.handle_onboarding(body.student_id).await)
}

async fn profile_update(data: web::Data<AppState>, body: web::Json<ProfileUpdateRequest>) -> impl Responder {
    let request = body.into_inner();
    respond(
        data.crew
            .handle_profile_update(request.student_id, request.context.as_ref())
            .await,
    )
}
