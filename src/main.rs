use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use formauth_server::auth::handlers::{check_auth, login, logout, signup};
use formauth_server::{health_check, AppError, AppState, Settings};
use std::net::TcpListener;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> formauth_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    info!("Starting server at {}:{}", config.server.host, config.server.port);

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    let state = web::Data::new(state);

    // Periodically sweep expired sessions. Validation already treats
    // expired rows as absent, so the sweep only reclaims storage.
    let sweep_state = state.clone();
    let sweep_interval = Duration::from_secs(config.auth.sweep_interval_secs);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(sweep_interval).await;
            match sweep_state.auth_service.sweep_expired_sessions().await {
                Ok(0) => {}
                Ok(swept) => info!("Swept {} expired sessions", swept),
                Err(e) => error!("Session sweep failed: {}", e),
            }
        }
    });

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if config.cors.enabled {
            let cors_config = Cors::default();

            // Apply specific CORS rules based on configuration
            let cors_config = if config.cors.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_any_header()
            } else {
                // The React frontend talks to this API with credentialed
                // requests, so the session cookie survives cross-origin
                cors_config
                    .allowed_origin("http://localhost:3000")
                    .allowed_origin("http://127.0.0.1:3000")
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec!["Content-Type"])
                    .supports_credentials()
            };

            // Set max age
            cors_config.max_age(config.cors.max_age as usize)
        } else {
            // CORS disabled - use most restrictive settings
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                warn!("Rejected malformed JSON body: {}", err);
                AppError::ValidationError("Invalid JSON data".into()).into()
            }))
            .route("/health", web::get().to(health_check))
            .route("/login", web::post().to(login))
            .route("/signup", web::post().to(signup))
            .route("/logout", web::post().to(logout))
            .route("/check", web::get().to(check_auth))
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
