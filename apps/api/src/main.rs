mod admin;
mod assistant;
mod auth;
mod config;
mod db;
mod employee;
mod errors;
mod extract;
mod import;
mod llm_client;
mod models;
mod notify;
mod resume;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::QueryAssistant;
use crate::auth::bootstrap::ensure_admin;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::import::ImportOptions;
use crate::llm_client::LlmClient;
use crate::notify::SmtpNotifier;
use crate::resume::RenderConfig;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentoPlus API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and bring the schema up to date
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;
    let store = Arc::new(PgStore::new(db));

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        ensure_admin(store.as_ref(), email, password).await?;
    }

    // Outgoing email (disabled with a warning when SMTP is not configured)
    let notifier = Arc::new(SmtpNotifier::new(config.smtp.clone()));

    // Initialize LLM client for the query assistant
    let llm = config.anthropic_api_key.clone().map(LlmClient::new).transpose()?;
    let assistant = Arc::new(QueryAssistant::new(llm));
    if assistant.is_configured() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("ANTHROPIC_API_KEY is not set; the query assistant is disabled");
    }

    info!(
        "Registration mode: {:?}, import date fallback: {:?}",
        config.registration_mode, config.import_date_fallback
    );

    // Build app state
    let state = AppState {
        employees: store.clone(),
        departments: store.clone(),
        accounts: store,
        notifier,
        assistant,
        auth: config.auth.clone(),
        registration: config.registration_mode,
        import: ImportOptions {
            date_fallback: config.import_date_fallback,
        },
        resume: RenderConfig::default(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the admin console has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
