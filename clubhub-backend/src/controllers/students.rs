use actix_web::{web, HttpResponse, Responder};

use super::{bad_request, db_error, not_found};
use crate::models::{CreateProfileRequest, DeleteResponse, UpdateProfileRequest, UpdateStudentRequest};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students")
            .route("", web::get().to(list_students))
            .route("/{id}", web::get().to(get_student))
            .route("/{id}", web::put().to(update_student))
            .route("/{id}", web::delete().to(delete_student))
            .route("/{id}/profile", web::post().to(create_profile))
            .route("/{id}/profile", web::get().to(get_profile))
            .route("/{id}/profile", web::put().to(update_profile))
            .route("/{id}/profile", web::delete().to(delete_profile))
            .route("/{id}/skills", web::get().to(list_skills))
            .route("/{id}/skills/{skill_id}", web::post().to(add_skill))
            .route("/{id}/skills/{skill_id}", web::delete().to(remove_skill))
            .route("/{id}/clubs", web::get().to(list_clubs))
            .route("/{id}/clubs/{club_id}", web::post().to(join_club))
            .route("/{id}/clubs/{club_id}", web::delete().to(leave_club))
            .route("/{id}/events", web::get().to(list_events)),
    );
}

/// 404 unless the student exists
fn require_student(data: &web::Data<AppState>, id: i64) -> Result<(), HttpResponse> {
    match data.db.get_student(id) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(not_found("Student not found")),
        Err(e) => Err(db_error("get student", e)),
    }
}

async fn list_students(data: web::Data<AppState>) -> impl Responder {
    match data.db.list_students() {
        Ok(students) => HttpResponse::Ok().json(students),
        Err(e) => db_error("list students", e),
    }
}

async fn get_student(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.get_student(path.into_inner()) {
        Ok(Some(student)) => HttpResponse::Ok().json(student),
        Ok(None) => not_found("Student not found"),
        Err(e) => db_error("get student", e),
    }
}

async fn update_student(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateStudentRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let request = body.into_inner();

    if let Some(ref email) = request.email {
        match data.db.get_student_by_email(email) {
            Ok(Some(other)) if other.id != id => return bad_request("Email already registered"),
            Ok(_) => {}
            Err(e) => return db_error("check student email", e),
        }
    }

    match data.db.update_student(id, &request) {
        Ok(Some(student)) => HttpResponse::Ok().json(student),
        Ok(None) => not_found("Student not found"),
        Err(e) => db_error("update student", e),
    }
}

async fn delete_student(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.delete_student(path.into_inner()) {
        Ok(true) => HttpResponse::Ok().json(DeleteResponse::deleted("Student")),
        Ok(false) => not_found("Student not found"),
        Err(e) => db_error("delete student", e),
    }
}

// ============================================
// Profile
// ============================================

async fn create_profile(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CreateProfileRequest>,
) -> impl Responder {
    let id = path.into_inner();
    if let Err(resp) = require_student(&data, id) {
        return resp;
    }

    match data.db.get_profile(id) {
        Ok(Some(_)) => return bad_request("Profile already exists"),
        Ok(None) => {}
        Err(e) => return db_error("get profile", e),
    }

    match data.db.create_profile(id, &body.into_inner()) {
        Ok(profile) => HttpResponse::Created().json(profile),
        Err(e) => db_error("create profile", e),
    }
}

async fn get_profile(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.get_profile(path.into_inner()) {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => not_found("Profile not found"),
        Err(e) => db_error("get profile", e),
    }
}

async fn update_profile(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    match data.db.update_profile(path.into_inner(), &body.into_inner()) {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => not_found("Profile not found"),
        Err(e) => db_error("update profile", e),
    }
}

async fn delete_profile(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.delete_profile(path.into_inner()) {
        Ok(true) => HttpResponse::Ok().json(DeleteResponse::deleted("Profile")),
        Ok(false) => not_found("Profile not found"),
        Err(e) => db_error("delete profile", e),
    }
}

// ============================================
// Skills
// ============================================

async fn list_skills(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    if let Err(resp) = require_student(&data, id) {
        return resp;
    }
    match data.db.list_student_skills(id) {
        Ok(skills) => HttpResponse::Ok().json(skills),
        Err(e) => db_error("list student skills", e),
    }
}

async fn add_skill(data: web::Data<AppState>, path: web::Path<(i64, i64)>) -> impl Responder {
    let (id, skill_id) = path.into_inner();
    if let Err(resp) = require_student(&data, id) {
        return resp;
    }
    match data.db.get_skill(skill_id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Skill not found"),
        Err(e) => return db_error("get skill", e),
    }

    match data.db.add_student_skill(id, skill_id) {
        Ok(true) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Skill added to student"
        })),
        Ok(false) => bad_request("Student already has this skill"),
        Err(e) => db_error("add student skill", e),
    }
}

async fn remove_skill(data: web::Data<AppState>, path: web::Path<(i64, i64)>) -> impl Responder {
    let (id, skill_id) = path.into_inner();
    match data.db.remove_student_skill(id, skill_id) {
        Ok(true) => HttpResponse::Ok().json(DeleteResponse::deleted("Student skill")),
        Ok(false) => not_found("Student does not have this skill"),
        Err(e) => db_error("remove student skill", e),
    }
}

// ============================================
// Club memberships and events
// ============================================

async fn list_clubs(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    if let Err(resp) = require_student(&data, id) {
        return resp;
    }
    match data.db.list_student_clubs(id) {
        Ok(clubs) => HttpResponse::Ok().json(clubs),
        Err(e) => db_error("list student clubs", e),
    }
}

async fn join_club(data: web::Data<AppState>, path: web::Path<(i64, i64)>) -> impl Responder {
    let (id, club_id) = path.into_inner();
    if let Err(resp) = require_student(&data, id) {
        return resp;
    }
    match data.db.get_club(club_id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Club not found"),
        Err(e) => return db_error("get club", e),
    }

    match data.db.join_club(id, club_id) {
        Ok(true) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "Joined club"
        })),
        Ok(false) => bad_request("Student is already a member of this club"),
        Err(e) => db_error("join club", e),
    }
}

async fn leave_club(data: web::Data<AppState>, path: web::Path<(i64, i64)>) -> impl Responder {
    let (id, club_id) = path.into_inner();
    match data.db.leave_club(id, club_id) {
        Ok(true) => HttpResponse::Ok().json(DeleteResponse::deleted("Club membership")),
        Ok(false) => not_found("Student is not a member of this club"),
        Err(e) => db_error("leave club", e),
    }
}

async fn list_events(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    if let Err(resp) = require_student(&data, id) {
        return resp;
    }
    match data.db.list_student_events(id) {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => db_error("list student events", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::controllers::test_support;
    use crate::models::{CreateClubRequest, CreateSkillRequest, CreateStudentRequest};
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    fn seed_student(state: &actix_web::web::Data<crate::AppState>, email: &str) -> i64 {
        state
            .db
            .create_student(&CreateStudentRequest {
                name: "Ada".to_string(),
                email: email.to_string(),
                password: "pw".to_string(),
                field_of_study: Some("CS".to_string()),
                year_level: Some(1),
            })
            .unwrap()
            .id
    }

    #[actix_web::test]
    async fn test_delete_missing_student_is_404() {
        let state = test_support::state();
        let app = crate::test_app!(state);

        let req = test::TestRequest::delete().uri("/students/999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Student not found");
    }

    #[actix_web::test]
    async fn test_update_and_delete_student() {
        let state = test_support::state();
        let id = seed_student(&state, "ada@uni.edu");
        seed_student(&state, "taken@uni.edu");
        let app = crate::test_app!(state);

        let req = test::TestRequest::put()
            .uri(&format!("/students/{}", id))
            .set_json(json!({"year_level": 2}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["year_level"], 2);
        assert_eq!(body["field_of_study"], "CS");

        let req = test::TestRequest::put()
            .uri(&format!("/students/{}", id))
            .set_json(json!({"email": "taken@uni.edu"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::delete().uri(&format!("/students/{}", id)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Student deleted successfully");
    }

    #[actix_web::test]
    async fn test_profile_lifecycle() {
        let state = test_support::state();
        let id = seed_student(&state, "ada@uni.edu");
        let app = crate::test_app!(state);
        let uri = format!("/students/{}/profile", id);

        let req = test::TestRequest::get().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"bio": "Loves robots", "goals": "Build one"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post().uri(&uri).set_json(json!({})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Profile already exists");

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"goals": "Win a competition"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["bio"], "Loves robots");
        assert_eq!(body["goals"], "Win a competition");

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Profile deleted successfully");

        let req = test::TestRequest::post()
            .uri("/students/999/profile")
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_skill_and_club_links() {
        let state = test_support::state();
        let id = seed_student(&state, "ada@uni.edu");
        let skill = state
            .db
            .create_skill(&CreateSkillRequest {
                name: "Python".to_string(),
                category: None,
            })
            .unwrap();
        let club = state
            .db
            .create_club(&CreateClubRequest {
                name: "AI Society".to_string(),
                email: "ai@uni.edu".to_string(),
                password: "pw".to_string(),
                description: None,
                mission: None,
                history: None,
                contact_email: None,
                website: None,
                logo_url: None,
                personality_style: None,
            })
            .unwrap();
        let app = crate::test_app!(state);

        let skill_uri = format!("/students/{}/skills/{}", id, skill.id);
        let req = test::TestRequest::post().uri(&skill_uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        let req = test::TestRequest::post().uri(&skill_uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri(&format!("/students/{}/skills", id)).to_request();
        let skills: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(skills[0]["name"], "Python");

        let req = test::TestRequest::post()
            .uri(&format!("/students/{}/skills/999", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let club_uri = format!("/students/{}/clubs/{}", id, club.id);
        let req = test::TestRequest::post().uri(&club_uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri(&format!("/students/{}/clubs", id)).to_request();
        let clubs: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(clubs[0]["name"], "AI Society");

        let req = test::TestRequest::delete().uri(&club_uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::delete().uri(&club_uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri(&skill_uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri(&format!("/students/{}/events", id)).to_request();
        let events: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert!(events.is_empty());
    }
}
