use actix_web::{web, HttpResponse, Responder};

use super::{bad_request, db_error, not_found};
use crate::models::{DeleteResponse, UpdateClubRequest};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/clubs")
            .route("", web::get().to(list_clubs))
            .route("/{id}", web::get().to(get_club))
            .route("/{id}", web::put().to(update_club))
            .route("/{id}", web::delete().to(delete_club))
            .route("/{id}/members", web::get().to(list_members)),
    );
}

async fn list_clubs(data: web::Data<AppState>) -> impl Responder {
    match data.db.list_clubs() {
        Ok(clubs) => HttpResponse::Ok().json(clubs),
        Err(e) => db_error("list clubs", e),
    }
}

async fn get_club(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.get_club(path.into_inner()) {
        Ok(Some(club)) => HttpResponse::Ok().json(club),
        Ok(None) => not_found("Club not found"),
        Err(e) => db_error("get club", e),
    }
}

async fn update_club(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateClubRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let request = body.into_inner();

    if let Some(ref email) = request.email {
        match data.db.get_club_by_email(email) {
            Ok(Some(other)) if other.id != id => return bad_request("Email already registered"),
            Ok(_) => {}
            Err(e) => return db_error("check club email", e),
        }
    }

    match data.db.update_club(id, &request) {
        Ok(Some(club)) => HttpResponse::Ok().json(club),
        Ok(None) => not_found("Club not found"),
        Err(e) => db_error("update club", e),
    }
}

async fn delete_club(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match data.db.delete_club(id) {
        Ok(true) => {
            log::info!("Deleted club {}", id);
            HttpResponse::Ok().json(DeleteResponse::deleted("Club"))
        }
        Ok(false) => not_found("Club not found"),
        Err(e) => db_error("delete club", e),
    }
}

async fn list_members(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match data.db.get_club(id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Club not found"),
        Err(e) => return db_error("get club", e),
    }
    match data.db.list_club_members(id) {
        Ok(members) => HttpResponse::Ok().json(members),
        Err(e) => db_error("list club members", e),
    }
}
