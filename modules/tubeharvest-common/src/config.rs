use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
/// Every knob has a default; nothing is required.
#[derive(Debug, Clone)]
pub struct Config {
    /// WebDriver server endpoint (geckodriver or a Selenium grid).
    pub webdriver_url: String,
    pub headless: bool,
    pub accept_languages: String,

    // Listing convergence
    pub listing_stability_threshold: u32,
    pub listing_max_attempts: u32,

    // Comment convergence (comment lists can legitimately be much larger
    // than video lists, so the session is parameterized independently)
    pub comment_stability_threshold: u32,
    pub comment_max_attempts: u32,
    /// Extract comment fields only every n-th iteration; intermediate
    /// iterations spend their scroll budget purely on driving more content
    /// into view.
    pub comment_refresh_interval: u32,

    /// Settle delay after each scroll before observing the DOM again.
    pub settle: Duration,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults above for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            webdriver_url: env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:4444".to_string()),
            headless: env_parse("HEADLESS", true),
            accept_languages: env::var("ACCEPT_LANGUAGES")
                .unwrap_or_else(|_| "en-US, en".to_string()),
            listing_stability_threshold: env_parse("LISTING_STABILITY_THRESHOLD", 3),
            listing_max_attempts: env_parse("LISTING_MAX_ATTEMPTS", 50),
            comment_stability_threshold: env_parse("COMMENT_STABILITY_THRESHOLD", 3),
            comment_max_attempts: env_parse("COMMENT_MAX_ATTEMPTS", 30),
            comment_refresh_interval: env_parse("COMMENT_REFRESH_INTERVAL", 5),
            settle: Duration::from_secs(env_parse("SETTLE_SECS", 2)),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
