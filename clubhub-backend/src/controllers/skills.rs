use actix_web::{web, HttpResponse, Responder};

use super::{bad_request, db_error, not_found};
use crate::models::{CreateSkillRequest, DeleteResponse, UpdateSkillRequest};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/skills")
            .route("", web::post().to(create_skill))
            .route("", web::get().to(list_skills))
            .route("/category/{category}", web::get().to(list_by_category))
            .route("/{id}", web::get().to(get_skill))
            .route("/{id}", web::put().to(update_skill))
            .route("/{id}", web::delete().to(delete_skill)),
    );
}

async fn create_skill(data: web::Data<AppState>, body: web::Json<CreateSkillRequest>) -> impl Responder {
    let request = body.into_inner();
    if request.name.trim().is_empty() {
        return bad_request("Skill name is required");
    }

    match data.db.get_skill_by_name(&request.name) {
        Ok(Some(_)) => return bad_request("Skill already exists"),
        Ok(None) => {}
        Err(e) => return db_error("check skill name", e),
    }

    match data.db.create_skill(&request) {
        Ok(skill) => HttpResponse::Created().json(skill),
        Err(e) => db_error("create skill", e),
    }
}

async fn list_skills(data: web::Data<AppState>) -> impl Responder {
    match data.db.list_skills() {
        Ok(skills) => HttpResponse::Ok().json(skills),
        Err(e) => db_error("list skills", e),
    }
}

async fn list_by_category(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.db.list_skills_by_category(&path.into_inner()) {
        Ok(skills) => HttpResponse::Ok().json(skills),
        Err(e) => db_error("list skills by category", e),
    }
}

async fn get_skill(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.get_skill(path.into_inner()) {
        Ok(Some(skill)) => HttpResponse::Ok().json(skill),
        Ok(None) => not_found("Skill not found"),
        Err(e) => db_error("get skill", e),
    }
}

async fn update_skill(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateSkillRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let request = body.into_inner();

    if let Some(ref name) = request.name {
        match data.db.get_skill_by_name(name) {
            Ok(Some(other)) if other.id != id => return bad_request("Skill already exists"),
            Ok(_) => {}
            Err(e) => return db_error("check skill name", e),
        }
    }

    match data.db.update_skill(id, &request) {
        Ok(Some(skill)) => HttpResponse::Ok().json(skill),
        Ok(None) => not_found("Skill not found"),
        Err(e) => db_error("update skill", e),
    }
}

async fn delete_skill(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.db.delete_skill(path.into_inner()) {
        Ok(true) => HttpResponse::Ok().json(DeleteResponse::deleted("Skill")),
        Ok(false) => not_found("Skill not found"),
        Err(e) => db_error("delete skill", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::controllers::test_support;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_duplicate_skill_inserts_nothing() {
        let state = test_support::state();
        let app = crate::test_app!(state);

        let skill = json!({"name": "Rust", "category": "programming"});
        let req = test::TestRequest::post().uri("/skills").set_json(&skill).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post().uri("/skills").set_json(&skill).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Skill already exists");

        assert_eq!(state.db.list_skills().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_category_rename_and_delete() {
        let state = test_support::state();
        let app = crate::test_app!(state);

        for (name, category) in [("Rust", "programming"), ("Go", "programming"), ("Design", "creative")] {
            let req = test::TestRequest::post()
                .uri("/skills")
                .set_json(json!({"name": name, "category": category}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/skills/category/programming").to_request();
        let skills: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(skills.len(), 2);

        let rust_id = state.db.get_skill_by_name("Rust").unwrap().unwrap().id;
        let req = test::TestRequest::put()
            .uri(&format!("/skills/{}", rust_id))
            .set_json(json!({"name": "Go"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri(&format!("/skills/{}", rust_id))
            .set_json(json!({"category": "systems"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "Rust");
        assert_eq!(body["category"], "systems");

        let req = test::TestRequest::delete().uri(&format!("/skills/{}", rust_id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::get().uri(&format!("/skills/{}", rust_id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
