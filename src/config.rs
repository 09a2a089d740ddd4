use std::env;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api/admin/";
const DEFAULT_LEADERBOARD_BASE: &str = "http://127.0.0.1:8000/leaderboard/api/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    pub leaderboard_base: String,
    pub timeout: Duration,
    pub session_cookie: Option<String>,
    pub leaderboard_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            leaderboard_base: DEFAULT_LEADERBOARD_BASE.to_string(),
            timeout: Duration::from_secs(10),
            session_cookie: None,
            leaderboard_page: 100,
        }
    }
}

impl Config {
    /// Reads `NPL_*` variables from the process environment. Call after the
    /// `.env` files have been loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base = lookup("NPL_API_BASE")
            .and_then(|val| non_empty(&val))
            .map(|val| with_trailing_slash(&val))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let leaderboard_base = lookup("NPL_LEADERBOARD_BASE")
            .and_then(|val| non_empty(&val))
            .map(|val| with_trailing_slash(&val))
            .unwrap_or_else(|| DEFAULT_LEADERBOARD_BASE.to_string());
        let timeout_secs = lookup("NPL_HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(10)
            .clamp(1, 120);
        let session_cookie = lookup("NPL_SESSION_COOKIE").and_then(|val| non_empty(&val));
        let leaderboard_page = lookup("NPL_LEADERBOARD_PAGE")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(100)
            .clamp(1, 500);

        Self {
            api_base,
            leaderboard_base,
            timeout: Duration::from_secs(timeout_secs),
            session_cookie,
            leaderboard_page,
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn with_trailing_slash(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}
