use std::collections::HashMap;
use std::time::Duration;

use npl_admin::config::Config;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_without_environment() {
    let config = Config::from_lookup(lookup(&[]));
    assert_eq!(config, Config::default());
    assert_eq!(config.api_base, "http://127.0.0.1:8000/api/admin/");
    assert_eq!(config.timeout, Duration::from_secs(10));
}

#[test]
fn bases_gain_trailing_slash() {
    let config = Config::from_lookup(lookup(&[
        ("NPL_API_BASE", "https://npl.example/api/admin"),
        ("NPL_LEADERBOARD_BASE", " https://npl.example/leaderboard/api/ "),
    ]));
    assert_eq!(config.api_base, "https://npl.example/api/admin/");
    assert_eq!(
        config.leaderboard_base,
        "https://npl.example/leaderboard/api/"
    );
}

#[test]
fn numeric_settings_are_clamped() {
    let config = Config::from_lookup(lookup(&[
        ("NPL_HTTP_TIMEOUT_SECS", "0"),
        ("NPL_LEADERBOARD_PAGE", "10000"),
    ]));
    assert_eq!(config.timeout, Duration::from_secs(1));
    assert_eq!(config.leaderboard_page, 500);

    let config = Config::from_lookup(lookup(&[("NPL_HTTP_TIMEOUT_SECS", "soon")]));
    assert_eq!(config.timeout, Duration::from_secs(10));
}

#[test]
fn blank_cookie_is_ignored() {
    let config = Config::from_lookup(lookup(&[("NPL_SESSION_COOKIE", "  ")]));
    assert_eq!(config.session_cookie, None);
    let config = Config::from_lookup(lookup(&[("NPL_SESSION_COOKIE", "sessionid=abc")]));
    assert_eq!(config.session_cookie.as_deref(), Some("sessionid=abc"));
}
