use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use congregate_core::AppError;
use congregate_domain::RegularMemberGrant;
use tracing_subscriber::EnvFilter;

/// How the process should run after applying migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Serve the HTTP API.
    Serve,
    /// Apply migrations and exit.
    MigrateOnly,
    /// Provision development fixtures and exit.
    Seed,
}

/// Environment-driven API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub run_mode: RunMode,
    pub database_url: String,
    pub frontend_url: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub regular_member_grant: RegularMemberGrant,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let run_mode = match env::args().nth(1).as_deref() {
            None => RunMode::Serve,
            Some("migrate") => RunMode::MigrateOnly,
            Some("seed") => RunMode::Seed,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown subcommand '{other}', expected 'migrate' or 'seed'"
                )));
            }
        };

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let regular_member_grant = match env::var("REGULAR_MEMBER_GRANT")
            .unwrap_or_else(|_| "implicit".to_owned())
            .as_str()
        {
            "implicit" => RegularMemberGrant::Implicit,
            "explicit" => RegularMemberGrant::Explicit,
            other => {
                return Err(AppError::Validation(format!(
                    "REGULAR_MEMBER_GRANT must be either 'implicit' or 'explicit', got '{other}'"
                )));
            }
        };

        Ok(Self {
            run_mode,
            database_url,
            frontend_url,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            regular_member_grant,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
