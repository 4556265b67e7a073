use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{bad_request, db_error, unauthorized};
use crate::auth::verify_password;
use crate::models::{AccountType, CreateClubRequest, CreateStudentRequest, Session};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
    #[serde(default = "default_account_type")]
    account_type: AccountType,
}

fn default_account_type() -> AccountType {
    AccountType::Student
}

#[derive(Serialize)]
pub struct LoginResponse {
    success: bool,
    token: String,
    account_type: AccountType,
    account_id: i64,
    expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    success: bool,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/students/register", web::post().to(register_student))
            .route("/clubs/register", web::post().to(register_club))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me))
            .route("/logout", web::post().to(logout)),
    );
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the session behind the request's bearer token
pub(crate) fn session_from_request(state: &web::Data<AppState>, req: &HttpRequest) -> Result<Session, HttpResponse> {
    let token = bearer_token(req).ok_or_else(|| unauthorized("No authorization token provided"))?;

    match state.db.validate_session(&token) {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(unauthorized("Invalid or expired session")),
        Err(e) => Err(db_error("validate session", e)),
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), HttpResponse> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(bad_request("A valid email is required"));
    }
    if password.is_empty() {
        return Err(bad_request("Password is required"));
    }
    Ok(())
}

async fn register_student(
    data: web::Data<AppState>,
    body: web::Json<CreateStudentRequest>,
) -> impl Responder {
    let request = body.into_inner();
    if let Err(resp) = validate_credentials(&request.email, &request.password) {
        return resp;
    }

    match data.db.get_student_by_email(&request.email) {
        Ok(Some(_)) => return bad_request("Email already registered"),
        Ok(None) => {}
        Err(e) => return db_error("check student email", e),
    }

    match data.db.create_student(&request) {
        Ok(student) => {
            log::info!("Registered student {}", student.id);
            HttpResponse::Created().json(student)
        }
        Err(e) => db_error("create student", e),
    }
}

async fn register_club(
    data: web::Data<AppState>,
    body: web::Json<CreateClubRequest>,
) -> impl Responder {
    let request = body.into_inner();
    if let Err(resp) = validate_credentials(&request.email, &request.password) {
        return resp;
    }
    if request.name.trim().is_empty() {
        return bad_request("Club name is required");
    }

    match data.db.get_club_by_email(&request.email) {
        Ok(Some(_)) => return bad_request("Email already registered"),
        Ok(None) => {}
        Err(e) => return db_error("check club email", e),
    }

    match data.db.create_club(&request) {
        Ok(club) => {
            log::info!("Registered club {}", club.id);
            HttpResponse::Created().json(club)
        }
        Err(e) => db_error("create club", e),
    }
}

async fn login(data: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let request = body.into_inner();

    let account = match request.account_type {
        AccountType::Student => data
            .db
            .get_student_by_email(&request.email)
            .map(|s| s.map(|s| (s.id, s.password_hash))),
        AccountType::Club => data
            .db
            .get_club_by_email(&request.email)
            .map(|c| c.map(|c| (c.id, c.password_hash))),
    };

    let account_id = match account {
        Ok(Some((id, hash))) if verify_password(&request.password, &hash) => id,
        Ok(_) => {
            log::warn!("Failed {} login for {}", request.account_type, request.email);
            return unauthorized("Invalid email or password");
        }
        Err(e) => return db_error("look up account", e),
    };

    match data.db.create_session(request.account_type, account_id) {
        Ok(session) => HttpResponse::Ok().json(LoginResponse {
            success: true,
            token: session.token,
            account_type: session.account_type,
            account_id: session.account_id,
            expires_at: session.expires_at,
        }),
        Err(e) => db_error("create session", e),
    }
}

async fn me(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match session_from_request(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let account = match session.account_type {
        AccountType::Student => data
            .db
            .get_student(session.account_id)
            .map(|s| s.map(|s| serde_json::json!(s))),
        AccountType::Club => data
            .db
            .get_club(session.account_id)
            .map(|c| c.map(|c| serde_json::json!(c))),
    };

    match account {
        Ok(Some(account)) => HttpResponse::Ok().json(serde_json::json!({
            "account_type": session.account_type,
            "account": account,
            "expires_at": session.expires_at
        })),
        Ok(None) => unauthorized("Account no longer exists"),
        Err(e) => db_error("load account", e),
    }
}

async fn logout(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let Some(token) = bearer_token(&req) else {
        return unauthorized("No authorization token provided");
    };

    match data.db.delete_session(&token) {
        Ok(removed) => HttpResponse::Ok().json(LogoutResponse { success: removed }),
        Err(e) => db_error("delete session", e),
    }
}
