//! Environment-variable configuration loading
//!
//! Every setting has a default and can be overridden through the process
//! environment (a `.env` file is honored when present). Invalid values are
//! rejected with a [`ConfigError`] instead of silently falling back.

use crate::config::RunConfig;
use crate::{ConfigError, ConfigResult};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default SQLite database location
pub const DEFAULT_DATABASE_PATH: &str = "flipkart_products.db";

/// Default maximum number of result pages per run
pub const DEFAULT_MAX_PAGES: u32 = 3;

/// Default headless-mode setting
pub const DEFAULT_HEADLESS: bool = true;

/// Default pause between page navigations, in seconds
pub const DEFAULT_REQUEST_DELAY_SECS: u64 = 2;

/// Default base URL of the target site
pub const DEFAULT_BASE_URL: &str = "https://www.flipkart.com";

/// Loads the run configuration from the process environment
///
/// Reads `DATABASE_PATH`, `MAX_PAGES`, `HEADLESS_MODE`, `REQUEST_DELAY`
/// and `BASE_URL`, applying defaults for anything unset. A `.env` file in
/// the working directory is loaded first if one exists.
///
/// # Returns
///
/// * `Ok(RunConfig)` - Successfully resolved configuration
/// * `Err(ConfigError)` - An environment variable was set to an invalid value
pub fn load_from_env() -> ConfigResult<RunConfig> {
    // Missing .env files are not an error
    let _ = dotenvy::dotenv();

    from_lookup(|key| std::env::var(key).ok())
}

/// Resolves a configuration from an arbitrary key lookup
///
/// This is the testable core of [`load_from_env`]: the lookup function
/// stands in for the process environment.
pub fn from_lookup<F>(lookup: F) -> ConfigResult<RunConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let database_path = lookup("DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

    let max_pages = match lookup("MAX_PAGES") {
        Some(raw) => parse_max_pages(&raw)?,
        None => DEFAULT_MAX_PAGES,
    };

    let headless = match lookup("HEADLESS_MODE") {
        Some(raw) => parse_bool("HEADLESS_MODE", &raw)?,
        None => DEFAULT_HEADLESS,
    };

    let delay_secs = match lookup("REQUEST_DELAY") {
        Some(raw) => parse_delay(&raw)?,
        None => DEFAULT_REQUEST_DELAY_SECS,
    };

    let base_url = parse_base_url(
        &lookup("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
    )?;

    Ok(RunConfig {
        database_path,
        max_pages,
        headless,
        request_delay: Duration::from_secs(delay_secs),
        base_url,
    })
}

/// Parses `MAX_PAGES`, which must be a positive integer
fn parse_max_pages(raw: &str) -> ConfigResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ConfigError::InvalidValue {
            key: "MAX_PAGES",
            value: raw.to_string(),
            message: "must be at least 1".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            key: "MAX_PAGES",
            value: raw.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Parses a boolean flag; accepts true/false, yes/no and 1/0
fn parse_bool(key: &'static str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            message: "expected true or false".to_string(),
        }),
    }
}

/// Parses `REQUEST_DELAY`, a non-negative number of seconds
fn parse_delay(raw: &str) -> ConfigResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue {
            key: "REQUEST_DELAY",
            value: raw.to_string(),
            message: e.to_string(),
        })
}

/// Parses and validates the base URL; only http(s) URLs are accepted
fn parse_base_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme {:?}", url.scheme()),
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = from_lookup(|_| None).unwrap();

        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
        assert!(config.headless);
        assert_eq!(
            config.request_delay,
            Duration::from_secs(DEFAULT_REQUEST_DELAY_SECS)
        );
        assert_eq!(config.base_url.as_str(), "https://www.flipkart.com/");
    }

    #[test]
    fn test_overrides_applied() {
        let lookup = lookup_from(&[
            ("DATABASE_PATH", "/tmp/products.db"),
            ("MAX_PAGES", "7"),
            ("HEADLESS_MODE", "false"),
            ("REQUEST_DELAY", "0"),
            ("BASE_URL", "https://shop.example.com"),
        ]);

        let config = from_lookup(lookup).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/products.db"));
        assert_eq!(config.max_pages, 7);
        assert!(!config.headless);
        assert_eq!(config.request_delay, Duration::ZERO);
        assert_eq!(config.base_url.host_str(), Some("shop.example.com"));
    }

    #[test]
    fn test_max_pages_zero_rejected() {
        let result = from_lookup(lookup_from(&[("MAX_PAGES", "0")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "MAX_PAGES",
                ..
            })
        ));
    }

    #[test]
    fn test_max_pages_garbage_rejected() {
        let result = from_lookup(lookup_from(&[("MAX_PAGES", "three")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_headless_accepts_common_spellings() {
        for raw in ["true", "TRUE", "yes", "1"] {
            let config = from_lookup(lookup_from(&[("HEADLESS_MODE", raw)])).unwrap();
            assert!(config.headless, "{:?} should mean headless", raw);
        }
        for raw in ["false", "No", "0"] {
            let config = from_lookup(lookup_from(&[("HEADLESS_MODE", raw)])).unwrap();
            assert!(!config.headless, "{:?} should mean headful", raw);
        }
    }

    #[test]
    fn test_headless_garbage_rejected() {
        let result = from_lookup(lookup_from(&[("HEADLESS_MODE", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_delay_rejected() {
        let result = from_lookup(lookup_from(&[("REQUEST_DELAY", "-2")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let result = from_lookup(lookup_from(&[("BASE_URL", "ftp://example.com")]));
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_base_url_must_parse() {
        let result = from_lookup(lookup_from(&[("BASE_URL", "not a url")]));
        assert!(result.is_err());
    }
}
