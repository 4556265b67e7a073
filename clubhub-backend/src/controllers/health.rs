use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/version").route(web::get().to(get_version)));
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database_ok = state
        .db
        .conn()
        .and_then(|conn| conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0)))
        .is_ok();

    HttpResponse::Ok().json(serde_json::json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "database": database_ok,
        "version": VERSION
    }))
}

async fn get_version(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "version": VERSION,
        "model": state.config.openai_model
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support;
    use actix_web::test;

    #[actix_web::test]
    async fn test_health_and_version() {
        let state = test_support::state();
        let app = crate::test_app!(state);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);

        let req = test::TestRequest::get().uri("/api/version").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["version"], VERSION);
        assert_eq!(body["model"], "gpt-4o-mini");
    }
}
