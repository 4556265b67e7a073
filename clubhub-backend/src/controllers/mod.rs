pub mod agents;
pub mod auth;
pub mod clubs;
pub mod events;
pub mod health;
pub mod skills;
pub mod students;

use actix_web::{error, web, HttpResponse};

/// JSON body config: malformed bodies get a 400 with the usual `{"error": ...}` shape
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        )
        .into()
    })
}

/// Register every route group
pub fn configure_all(cfg: &mut web::ServiceConfig) {
    health::config(cfg);
    auth::config(cfg);
    students::config(cfg);
    clubs::config(cfg);
    events::config(cfg);
    skills::config(cfg);
    agents::config(cfg);
}

pub(crate) fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": message }))
}

pub(crate) fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

pub(crate) fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({ "error": message }))
}

/// Log a database failure and turn it into a 500
pub(crate) fn db_error(action: &str, e: rusqlite::Error) -> HttpResponse {
    log::error!("Failed to {}: {}", action, e);
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": format!("Database error: {}", e)
    }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::agents::Crew;
    use crate::ai::{AiClient, MockAiClient};
    use crate::config::Config;
    use crate::db::Database;
    use crate::tools::ToolRegistry;
    use crate::AppState;
    use actix_web::web;
    use std::sync::Arc;

    /// App state over a fresh in-memory database, with the AI mocked by `texts`
    pub fn state_with_ai(texts: &[&str]) -> web::Data<AppState> {
        let config = Config {
            database_url: ":memory:".to_string(),
            ..Config::default()
        };
        let db = Arc::new(Database::new(&config.database_url).unwrap());
        let ai = Arc::new(AiClient::Mock(MockAiClient::with_texts(texts)));
        let crew = Arc::new(Crew::new(
            db.clone(),
            ai,
            Arc::new(ToolRegistry::with_builtins()),
            &config,
        ));
        web::Data::new(AppState { db, config, crew })
    }

    pub fn state() -> web::Data<AppState> {
        state_with_ai(&[])
    }

    /// Build a test service with every route registered
    #[macro_export]
    macro_rules! test_app {
        ($state:expr) => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data($state.clone())
                    .app_data($crate::controllers::json_config())
                    .configure($crate::controllers::configure_all),
            )
            .await
        };
    }
}
