//! Application configuration loaded from environment variables.
//!
//! Credentials **must** be provided via environment variables:
//! - `ROBINHOOD_API_KEY`: API key sent in the `x-api-key` header
//! - `ROBINHOOD_BASE64_PRIVATE_KEY`: base64 Ed25519 private key seed
//!
//! Optional overrides:
//! - `ROBINHOOD_BASE_URL`: API host, defaults to the production host
//! - `ROBINHOOD_TRADING_PAIR_TTL_SECS`: trading-pair cache lifetime
//! - `SPREADLOG_SYMBOLS`: comma-separated symbols the collector records

use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

/// Default Robinhood crypto trading API host.
pub const DEFAULT_BASE_URL: &str = "https://trading.robinhood.com";

/// Trading pairs change at most daily.
pub const DEFAULT_TRADING_PAIR_TTL: Duration = Duration::from_secs(86_400);

/// Symbols recorded when `SPREADLOG_SYMBOLS` is not set.
pub const DEFAULT_SYMBOLS: [&str; 2] = ["SHIB-USD", "DOGE-USD"];

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub robinhood: RobinhoodConfig,
    pub symbols: Vec<String>,
}

/// Robinhood-specific configuration values.
pub struct RobinhoodConfig {
    pub base_url: String,
    pub api_key: String,
    pub private_key: Zeroizing<String>,
    pub trading_pair_ttl: Duration,
}

impl fmt::Debug for RobinhoodConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RobinhoodConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("private_key", &"<redacted>")
            .field("trading_pair_ttl", &self.trading_pair_ttl)
            .finish()
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`SpreadlogError::Config`](crate::SpreadlogError::Config) if
/// either credential is missing or the TTL override is not a whole number
/// of seconds.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let api_key = required_var("ROBINHOOD_API_KEY")?;
    let private_key = Zeroizing::new(required_var("ROBINHOOD_BASE64_PRIVATE_KEY")?);

    let base_url =
        non_empty_var("ROBINHOOD_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let trading_pair_ttl = match non_empty_var("ROBINHOOD_TRADING_PAIR_TTL_SECS") {
        Some(raw) => Duration::from_secs(raw.parse().map_err(|e| {
            crate::SpreadlogError::Config(format!(
                "ROBINHOOD_TRADING_PAIR_TTL_SECS must be whole seconds, got {raw:?}: {e}"
            ))
        })?),
        None => DEFAULT_TRADING_PAIR_TTL,
    };

    let symbols = non_empty_var("SPREADLOG_SYMBOLS")
        .map(|raw| parse_symbols(&raw))
        .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());

    Ok(AppConfig {
        robinhood: RobinhoodConfig {
            base_url,
            api_key,
            private_key,
            trading_pair_ttl,
        },
        symbols,
    })
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

fn required_var(name: &str) -> crate::Result<String> {
    non_empty_var(name)
        .ok_or_else(|| crate::SpreadlogError::Config(format!("{name} is not set")))
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
