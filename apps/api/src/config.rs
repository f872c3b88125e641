use anyhow::{bail, Context, Result};

use crate::auth::registration::RegistrationMode;
use crate::auth::token::AuthConfig;
use crate::import::DateFallback;
use crate::notify::SmtpSettings;

const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub auth: AuthConfig,
    pub registration_mode: RegistrationMode,
    pub import_date_fallback: DateFallback,
    pub smtp: Option<SmtpSettings>,
    pub anthropic_api_key: Option<String>,
    /// Seeded at startup when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let jwt_secret = require_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            auth: AuthConfig {
                jwt_secret,
                issuer: env_or("JWT_ISSUER", "talento-api"),
                audience: env_or("JWT_AUDIENCE", "talento-clients"),
                ttl_hours: env_or("JWT_TTL_HOURS", "24")
                    .parse::<i64>()
                    .context("JWT_TTL_HOURS must be an integer")?,
            },
            registration_mode: env_or("REGISTRATION_MODE", "reconcile")
                .parse()
                .context("REGISTRATION_MODE must be 'reconcile' or 'strict'")?,
            import_date_fallback: env_or("IMPORT_DATE_FALLBACK", "today")
                .parse()
                .context("IMPORT_DATE_FALLBACK must be 'today' or 'sentinel'")?,
            smtp: smtp_from_env()?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            admin_email: optional_env("ADMIN_EMAIL"),
            admin_password: optional_env("ADMIN_PASSWORD"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// SMTP is enabled only when host, user and password are all present.
fn smtp_from_env() -> Result<Option<SmtpSettings>> {
    let (Some(host), Some(user), Some(password)) = (
        optional_env("SMTP_HOST"),
        optional_env("SMTP_USER"),
        optional_env("SMTP_PASSWORD"),
    ) else {
        return Ok(None);
    };

    Ok(Some(SmtpSettings {
        host,
        port: env_or("SMTP_PORT", "587")
            .parse::<u16>()
            .context("SMTP_PORT must be a valid port number")?,
        user,
        password,
        from_name: env_or("SMTP_FROM_NAME", "TalentoPlus - Recursos Humanos"),
    }))
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
