//! Admin API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_SHOP` - Store handle (e.g., "copihue-books"); a full
//!   `*.myshopify.com` domain is also accepted
//! - `SHOPIFY_CLIENT_ID` - Client ID from Dev Dashboard > Settings
//! - `SHOPIFY_CLIENT_SECRET` - Client secret from Dev Dashboard > Settings
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01, format YYYY-MM)

use secrecy::SecretString;
use thiserror::Error;

/// Default Admin API version.
pub const DEFAULT_API_VERSION: &str = "2026-01";

/// Configuration failure listing every invalid field at once, so a
/// misconfigured environment is fixed in one pass.
#[derive(Debug, Error)]
#[error("Invalid environment variables:\n{}", issues.iter().map(|i| format!("  - {i}")).collect::<Vec<_>>().join("\n"))]
pub struct ConfigError {
    /// One entry per invalid field, as `NAME: problem`.
    pub issues: Vec<String>,
}

/// Admin API configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct AdminApiConfig {
    /// Store handle or domain as configured.
    pub shop: String,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: SecretString,
    /// Admin API version (e.g., 2026-01).
    pub api_version: String,
}

impl std::fmt::Debug for AdminApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiConfig")
            .field("shop", &self.shop)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AdminApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` enumerating every missing or invalid field.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut issues = Vec::new();

        let shop = required("SHOPIFY_SHOP", "store handle is required (e.g., 'copihue-books', not the full URL)", &mut issues);
        let client_id = required(
            "SHOPIFY_CLIENT_ID",
            "client ID is required (from Dev Dashboard > Settings)",
            &mut issues,
        );
        let client_secret = required(
            "SHOPIFY_CLIENT_SECRET",
            "client secret is required (from Dev Dashboard > Settings)",
            &mut issues,
        );

        let api_version = std::env::var("SHOPIFY_API_VERSION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        if !is_valid_api_version(&api_version) {
            issues.push(format!(
                "SHOPIFY_API_VERSION: must be a valid API version (e.g., {DEFAULT_API_VERSION}), got '{api_version}'"
            ));
        }

        if issues.is_empty() {
            Ok(Self {
                shop,
                client_id,
                client_secret: SecretString::from(client_secret),
                api_version,
            })
        } else {
            Err(ConfigError { issues })
        }
    }

    /// Fully qualified shop domain.
    ///
    /// Accepts `copihue-books`, `copihue-books.myshopify.com`, or a full URL;
    /// strips scheme and path, and appends `.myshopify.com` to a bare handle.
    #[must_use]
    pub fn shop_domain(&self) -> String {
        normalize_shop_domain(&self.shop)
    }
}

fn required(name: &str, problem: &str, issues: &mut Vec<String>) -> String {
    match std::env::var(name).ok().filter(|v| !v.trim().is_empty()) {
        Some(value) => value,
        None => {
            issues.push(format!("{name}: {problem}"));
            String::new()
        }
    }
}

/// API versions look like `YYYY-MM`.
fn is_valid_api_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 7
        && bytes.iter().take(4).all(u8::is_ascii_digit)
        && bytes.get(4) == Some(&b'-')
        && bytes.iter().skip(5).all(u8::is_ascii_digit)
}

/// Normalize a shop handle, domain, or URL into a bare `*.myshopify.com`
/// domain.
fn normalize_shop_domain(shop: &str) -> String {
    let mut shop = shop.trim();
    shop = shop.strip_prefix("https://").unwrap_or(shop);
    shop = shop.strip_prefix("http://").unwrap_or(shop);
    let shop = shop.split('/').next().unwrap_or_default();

    if shop.contains('.') {
        shop.to_string()
    } else {
        format!("{shop}.myshopify.com")
    }
}
