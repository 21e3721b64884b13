use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use url::Url;

use crate::error::AppError;

const DEFAULT_TRIP_SERVICE_URL: &str = "https://van-rental-service.onrender.com/api/trips";
const DEFAULT_PAYMENT_SERVICE_URL: &str = "https://van-rental-service.onrender.com/api/payments";

/// Where trip and payment records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordBackend {
    Http,
    Memory,
}

impl FromStr for RecordBackend {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Config(format!(
                "invalid RECORD_BACKEND `{other}` (expected http or memory)"
            ))),
        }
    }
}

/// Whether searches go to the record service or run over the cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Remote,
    Local,
}

impl FromStr for SearchMode {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => Err(AppError::Config(format!(
                "invalid SEARCH_MODE `{other}` (expected remote or local)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub trip_service_url: Url,
    pub payment_service_url: Url,
    pub backend: RecordBackend,
    pub search_mode: SearchMode,
    pub mark_trips_paid: bool,
    pub request_timeout: Duration,
    pub default_page_size: usize,
    pub fleet_file: Option<PathBuf>,
    pub cookie_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let trip_service_url = parse_url(
            "TRIP_SERVICE_URL",
            &env::var("TRIP_SERVICE_URL").unwrap_or_else(|_| DEFAULT_TRIP_SERVICE_URL.into()),
        )?;
        let payment_service_url = parse_url(
            "PAYMENT_SERVICE_URL",
            &env::var("PAYMENT_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_PAYMENT_SERVICE_URL.into()),
        )?;

        let backend = env::var("RECORD_BACKEND")
            .map(|raw| raw.parse())
            .unwrap_or(Ok(RecordBackend::Http))?;
        let search_mode = env::var("SEARCH_MODE")
            .map(|raw| raw.parse())
            .unwrap_or(Ok(SearchMode::Remote))?;

        let mark_trips_paid = match env::var("MARK_TRIPS_PAID") {
            Ok(raw) => parse_flag("MARK_TRIPS_PAID", &raw)?,
            Err(_) => true,
        };

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|err| AppError::Config(format!("invalid REQUEST_TIMEOUT_SECS: {err}")))?;

        let default_page_size = env::var("DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .map_err(|err| AppError::Config(format!("invalid DEFAULT_PAGE_SIZE: {err}")))?;
        if default_page_size == 0 {
            return Err(AppError::Config("DEFAULT_PAGE_SIZE must be positive".into()));
        }

        let fleet_file = env::var("FLEET_FILE").ok().map(PathBuf::from);

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-van-rental-cookie-secret".to_string());

        Ok(Self {
            listen_addr,
            trip_service_url,
            payment_service_url,
            backend,
            search_mode,
            mark_trips_paid,
            request_timeout,
            default_page_size,
            fleet_file,
            cookie_secret,
        })
    }

    /// Configuration for running without a record service, used by tests and demos.
    pub fn in_memory() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            trip_service_url: Url::parse("http://localhost/api/trips")
                .expect("static trip url should parse"),
            payment_service_url: Url::parse("http://localhost/api/payments")
                .expect("static payment url should parse"),
            backend: RecordBackend::Memory,
            search_mode: SearchMode::Remote,
            mark_trips_paid: true,
            request_timeout: Duration::from_secs(30),
            default_page_size: 10,
            fleet_file: None,
            cookie_secret: "in-memory-van-rental-cookie-secret".into(),
        }
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, AppError> {
    Url::parse(raw).map_err(|err| AppError::Config(format!("invalid {name}: {err}")))
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!("invalid {name}: `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_and_search_mode() {
        assert_eq!("HTTP".parse::<RecordBackend>().ok(), Some(RecordBackend::Http));
        assert_eq!(" memory ".parse::<RecordBackend>().ok(), Some(RecordBackend::Memory));
        assert!("postgres".parse::<RecordBackend>().is_err());
        assert_eq!("local".parse::<SearchMode>().ok(), Some(SearchMode::Local));
        assert!("fuzzy".parse::<SearchMode>().is_err());
    }

    #[test]
    fn parses_flags() {
        assert!(parse_flag("X", "yes").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }
}
