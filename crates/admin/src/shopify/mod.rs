//! Shopify Admin API client.
//!
//! # Architecture
//!
//! - Client-credentials OAuth grant exchanged for a bearer token; tokens are
//!   cached in memory and refreshed 60 seconds before expiry
//! - Raw GraphQL documents with `serde_json` variables, POSTed via `reqwest`
//! - A failed token grant is fatal by contract: it means misconfiguration
//!   (wrong shop handle, bad credentials, app not installed) that a retry
//!   cannot fix, so callers terminate instead of retrying

pub mod client;

pub use client::AdminClient;

use thiserror::Error;

/// Errors that can occur when interacting with the Admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint rejected the client-credentials grant.
    ///
    /// Fatal: indicates misconfiguration, never retried.
    #[error("Token request failed (HTTP {status}): {detail}")]
    TokenRequestFailed {
        /// HTTP status from the token endpoint.
        status: u16,
        /// Diagnostic parsed from the JSON body, or scraped from an HTML
        /// error page's title.
        detail: String,
    },

    /// The GraphQL endpoint returned a non-success HTTP status.
    #[error("GraphQL request failed ({status}): {body}")]
    RequestFailed {
        /// HTTP status.
        status: u16,
        /// Response body, for the caller's diagnostics.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AdminError {
    /// Whether the error is a fatal token-grant failure.
    #[must_use]
    pub const fn is_token_failure(&self) -> bool {
        matches!(self, Self::TokenRequestFailed { .. })
    }
}

/// A GraphQL error returned by the Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failure_display_carries_status_and_detail() {
        let err = AdminError::TokenRequestFailed {
            status: 401,
            detail: "invalid client credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Token request failed (HTTP 401): invalid client credentials"
        );
        assert!(err.is_token_failure());
    }

    #[test]
    fn graphql_errors_are_joined() {
        let err = AdminError::GraphQL(vec![
            GraphQLError {
                message: "Access denied".to_string(),
            },
            GraphQLError {
                message: "Throttled".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "GraphQL errors: Access denied; Throttled");
        assert!(!err.is_token_failure());
    }

    #[test]
    fn empty_graphql_errors() {
        let err = AdminError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }
}
