//! Shopify Storefront API client implementation.
//!
//! Sends raw GraphQL documents with `reqwest` 0.13. Cart operations are never
//! cached - every mutation returns the authoritative cart, which is the
//! reconciliation input for the local cart state.

mod conversions;
pub mod queries;

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::{GraphQLError, ShopifyError};
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput};

use conversions::{
    AddToCartData, CartMutationPayload, CreateCartData, GetCartData, RemoveFromCartData,
    UpdateCartLinesData, convert_cart, join_user_errors,
};

/// GraphQL response envelope.
#[derive(Debug, serde::Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, serde::Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store, config.api_version
        );

        Self::with_endpoint(
            endpoint,
            config.storefront_private_token.expose_secret().to_string(),
        )
    }

    /// Create a client against an explicit endpoint URL.
    ///
    /// Used by tests and local tooling that point at a stand-in server.
    #[must_use]
    pub fn with_endpoint(endpoint: String, access_token: String) -> Self {
        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token,
            }),
        }
    }

    /// Execute a GraphQL document.
    async fn execute<T: DeserializeOwned>(
        &self,
        document: String,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = json!({
            "query": document,
            "variables": variables,
        });

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            // See: https://shopify.dev/docs/storefronts/headless/building-with-the-storefront-api/getting-started
            .header(
                "Shopify-Storefront-Private-Token",
                &self.inner.access_token,
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            ))]));
        }

        let envelope: GraphQLResponse<T> = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Storefront GraphQL response"
            );
            ShopifyError::Parse(e)
        })?;

        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        path: e.path,
                    })
                    .collect(),
            ));
        }

        envelope
            .data
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }

    /// Unwrap a cart mutation payload into the authoritative cart.
    fn cart_from_payload(
        payload: Option<CartMutationPayload>,
        operation: &str,
    ) -> Result<Cart, ShopifyError> {
        if let Some(payload) = payload {
            if !payload.user_errors.is_empty() {
                return Err(ShopifyError::UserError(join_user_errors(
                    &payload.user_errors,
                )));
            }

            if let Some(cart) = payload.cart {
                return Ok(convert_cart(cart));
            }
        }

        Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
            "Failed to {operation}"
        ))]))
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Create a new empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, ShopifyError> {
        let data: CreateCartData = self
            .execute(queries::document(queries::CREATE_CART), json!({}))
            .await?;

        Self::cart_from_payload(data.cart_create, "create cart")
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is not found or the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart, ShopifyError> {
        let data: GetCartData = self
            .execute(
                queries::document(queries::GET_CART),
                json!({ "cartId": cart_id }),
            )
            .await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let data: AddToCartData = self
            .execute(
                queries::document(queries::ADD_TO_CART),
                json!({ "cartId": cart_id, "lines": lines }),
            )
            .await?;

        Self::cart_from_payload(data.cart_lines_add, "add to cart")
    }

    /// Update cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let data: UpdateCartLinesData = self
            .execute(
                queries::document(queries::UPDATE_CART_LINES),
                json!({ "cartId": cart_id, "lines": lines }),
            )
            .await?;

        Self::cart_from_payload(data.cart_lines_update, "update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        let data: RemoveFromCartData = self
            .execute(
                queries::document(queries::REMOVE_FROM_CART),
                json!({ "cartId": cart_id, "lineIds": line_ids }),
            )
            .await?;

        Self::cart_from_payload(data.cart_lines_remove, "remove from cart")
    }
}
