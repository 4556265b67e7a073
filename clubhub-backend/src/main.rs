use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;

mod agents;
mod ai;
mod auth;
mod config;
mod controllers;
mod db;
mod http;
mod models;
mod tools;

use agents::Crew;
use ai::AiClient;
use config::Config;
use db::Database;
use tools::ToolRegistry;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub crew: Arc<Crew>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url)
        .map_err(|e| io::Error::other(format!("Failed to initialize database: {}", e)))?;
    let db = Arc::new(db);

    log::info!("Initializing tool registry");
    let tool_registry = Arc::new(ToolRegistry::with_builtins());
    log::info!("Registered {} tools", tool_registry.len());

    let ai = AiClient::from_config(&config)
        .map_err(|e| io::Error::other(format!("Failed to create AI client: {}", e)))?;
    log::info!("Agents using model {}", ai.model_name());

    let crew = Arc::new(Crew::new(db.clone(), Arc::new(ai), tool_registry, &config));

    log::info!("Starting ClubHub server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(actix_web::web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
                crew: Arc::clone(&crew),
            }))
            .app_data(controllers::json_config())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::configure_all)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
