use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_NOTICE_SECS: u64 = 3;
const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;
const DEFAULT_REQUEST_WORKERS: usize = 6;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub base_url: String,
    pub session_file: Option<PathBuf>,
    pub notice_ttl: Duration,
    pub matches_page_size: usize,
    pub request_workers: usize,
    pub request_timeout: Duration,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_file: None,
            notice_ttl: Duration::from_secs(DEFAULT_NOTICE_SECS),
            matches_page_size: DEFAULT_PAGE_SIZE,
            request_workers: DEFAULT_REQUEST_WORKERS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AdminConfig {
    /// Loads `.env.local` and `.env` (if present) and reads the environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("API_BASE_URL")
            .map(|val| normalize_base_url(&val))
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let session_file = lookup("SESSION_FILE")
            .filter(|val| !val.trim().is_empty())
            .map(|val| PathBuf::from(val.trim()));
        let notice_secs = lookup("NOTICE_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_NOTICE_SECS)
            .max(1);
        let matches_page_size = lookup("MATCHES_PAGE_SIZE")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let request_workers = lookup("REQUEST_WORKERS")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_REQUEST_WORKERS);
        let request_timeout_secs = lookup("REQUEST_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
            .max(1);

        Self {
            base_url,
            session_file,
            notice_ttl: Duration::from_secs(notice_secs),
            matches_page_size,
            request_workers,
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
