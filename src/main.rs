mod chat;
mod config;
mod model;
mod web;

use actix_web::{App, HttpServer, web::Data};
use actix_files as fs;
use anyhow::Context;
use dotenv::dotenv;
use log::{info, error};
use std::sync::Mutex;
use tera::Tera;

use chat::SessionStore;
use config::AppConfig;
use model::CompletionClient;
use web::routes;

// App state structure
struct AppState {
    tera: Tera,
    model: CompletionClient,
    sessions: Mutex<SessionStore>,
}

impl AppState {
    fn new(tera: Tera, model: CompletionClient, max_sessions: usize) -> Self {
        Self {
            tera,
            model,
            sessions: Mutex::new(SessionStore::new(max_sessions)),
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting shop assistant");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let model = CompletionClient::from_config(&config);

    // Initialize template engine
    let tera = match web::load_templates("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = Data::new(AppState::new(tera, model, config.max_sessions));

    info!("Listening on {}:{}", config.bind_address, config.port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", "./static"))
    })
    .bind((config.bind_address.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.bind_address, config.port))?
    .run()
    .await
    .context("server terminated with an error")
}
