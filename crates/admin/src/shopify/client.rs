//! Admin API GraphQL client with client-credentials token caching.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};

use super::{AdminError, GraphQLError};
use crate::config::AdminApiConfig;

/// Tokens are refreshed this many seconds before their actual expiry, so a
/// request never goes out with a token about to lapse mid-flight.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Cached bearer token from a client-credentials grant.
#[derive(Debug, Clone)]
struct AccessToken {
    /// Bearer string for the `X-Shopify-Access-Token` header.
    token: SecretString,
    /// Unix timestamp when the token expires.
    expires_at: i64,
}

impl AccessToken {
    /// Usable if expiry is more than the refresh margin away.
    const fn is_fresh(&self, now: i64) -> bool {
        now < self.expires_at - REFRESH_MARGIN_SECS
    }
}

/// Response from the OAuth token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds (24 hours for Admin API tokens).
    expires_in: i64,
    #[serde(default)]
    scope: String,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
}

/// Shopify Admin API client.
///
/// Authenticates lazily via the client-credentials grant and reuses the
/// bearer token across calls until 60 seconds before expiry.
///
/// Cheap to clone; all clones share one HTTP pool and token cache. If two
/// calls race a refresh, both issue a grant and the later response wins -
/// grant requests are idempotent and call volume is low, so the cache is not
/// single-flighted.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    http: reqwest::Client,
    token_url: String,
    graphql_url: String,
    client_id: String,
    client_secret: SecretString,
    /// In-memory token cache
    token: RwLock<Option<AccessToken>>,
}

impl AdminClient {
    /// Create a client for the configured shop.
    #[must_use]
    pub fn new(config: &AdminApiConfig) -> Self {
        let domain = config.shop_domain();
        Self::with_endpoints(
            format!("https://{domain}/admin/oauth/access_token"),
            format!(
                "https://{domain}/admin/api/{}/graphql.json",
                config.api_version
            ),
            config.client_id.clone(),
            config.client_secret.clone(),
        )
    }

    /// Create a client against explicit endpoint URLs.
    ///
    /// Used by tests and local tooling that point at a stand-in server.
    #[must_use]
    pub fn with_endpoints(
        token_url: String,
        graphql_url: String,
        client_id: String,
        client_secret: SecretString,
    ) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                http: reqwest::Client::new(),
                token_url,
                graphql_url,
                client_id,
                client_secret,
                token: RwLock::new(None),
            }),
        }
    }

    /// Get a usable bearer token, requesting a new grant if the cached one
    /// is missing or within the refresh margin.
    async fn access_token(&self) -> Result<String, AdminError> {
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = self.inner.token.read().await.as_ref()
            && token.is_fresh(now)
        {
            return Ok(token.token.expose_secret().to_string());
        }

        let token = self.request_grant(now).await?;
        let bearer = token.token.expose_secret().to_string();
        *self.inner.token.write().await = Some(token);

        Ok(bearer)
    }

    /// Exchange client credentials for a bearer token.
    ///
    /// A non-success response is a configuration problem (wrong shop handle,
    /// bad credentials, app not installed); the error is built for terminal
    /// diagnostics and must not be retried.
    #[instrument(skip(self))]
    async fn request_grant(&self, now: i64) -> Result<AccessToken, AdminError> {
        debug!(url = %self.inner.token_url, "Requesting admin access token");

        let response = self
            .inner
            .http
            .post(&self.inner.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.inner.client_id.as_str()),
                ("client_secret", self.inner.client_secret.expose_secret()),
            ])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = response.text().await.unwrap_or_default();
            let detail = token_error_detail(&content_type, &body);

            error!(status = %status, detail = %detail, "Token request failed");

            return Err(AdminError::TokenRequestFailed {
                status: status.as_u16(),
                detail,
            });
        }

        let token_response: TokenResponse = response.json().await?;

        debug!(scopes = %token_response.scope, "Token obtained");

        Ok(AccessToken {
            token: SecretString::from(token_response.access_token),
            expires_at: now + token_response.expires_in,
        })
    }

    /// Execute a GraphQL document against the Admin API.
    ///
    /// This layer surfaces failures as-is; retrying and classifying user
    /// errors is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::TokenRequestFailed` if a grant was needed and
    /// rejected, `AdminError::RequestFailed` on a non-success HTTP status,
    /// and `AdminError::GraphQL` for errors in the response envelope.
    #[instrument(skip(self, query, variables))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AdminError> {
        let access_token = self.access_token().await?;

        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .inner
            .http
            .post(&self.inner.graphql_url)
            .header("X-Shopify-Access-Token", access_token)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(AdminError::RequestFailed {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let envelope: GraphQLResponse<T> = serde_json::from_str(&response_text)?;

        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            return Err(AdminError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError { message: e.message })
                    .collect(),
            ));
        }

        envelope.data.ok_or_else(|| {
            AdminError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
            }])
        })
    }
}

/// Distill a failed token response body into a one-line diagnostic.
///
/// JSON bodies are echoed compactly; Shopify's HTML error pages are reduced
/// to their `<title>` text.
fn token_error_detail(content_type: &str, body: &str) -> String {
    if content_type.contains("application/json") {
        return serde_json::from_str::<serde_json::Value>(body)
            .map_or_else(|_| body.to_string(), |v| v.to_string());
    }

    html_title(body)
        .map_or_else(|| format!("(HTML response, {} bytes)", body.len()), String::from)
}

/// Extract the text of the first `<title>` element, if any.
fn html_title(html: &str) -> Option<&str> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<title>")? + "<title>".len();
    let end = lower.get(start..)?.find("</title>")? + start;
    html.get(start..end).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_fresh_until_the_refresh_margin() {
        let token = AccessToken {
            token: SecretString::from("shpat_abc"),
            expires_at: 1_000,
        };

        assert!(token.is_fresh(0));
        assert!(token.is_fresh(939));
        // Exactly at expiry minus the margin the token is refreshed
        assert!(!token.is_fresh(940));
        assert!(!token.is_fresh(1_000));
        assert!(!token.is_fresh(2_000));
    }

    #[test]
    fn json_error_body_is_echoed() {
        let detail = token_error_detail(
            "application/json; charset=utf-8",
            r#"{"error":"invalid_client"}"#,
        );
        assert!(detail.contains("invalid_client"));
    }

    #[test]
    fn html_error_body_is_reduced_to_title() {
        let body = "<html><head><TITLE>Oops - something went wrong</TITLE></head><body>...</body></html>";
        assert_eq!(
            token_error_detail("text/html", body),
            "Oops - something went wrong"
        );
    }

    #[test]
    fn html_without_title_reports_length() {
        let detail = token_error_detail("text/html", "<html></html>");
        assert_eq!(detail, "(HTML response, 13 bytes)");
    }

    #[test]
    fn malformed_json_falls_back_to_raw_body() {
        let detail = token_error_detail("application/json", "not json at all");
        assert_eq!(detail, "not json at all");
    }
}
