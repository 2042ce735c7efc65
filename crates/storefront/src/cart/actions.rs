//! Remote cart actions against the Storefront API.
//!
//! Each action resolves the shopper's intent (expressed in merchandise ids)
//! into the concrete Shopify mutation (which wants server-assigned line ids)
//! and returns the authoritative cart for reconciliation. Failures carry a
//! [`CartActionError`] kind instead of leaking raw messages, so callers can
//! tell an error from valid cart data.

use thiserror::Error;
use tracing::instrument;

use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput};
use crate::shopify::{ShopifyError, StorefrontClient};

/// Cookie under which the caller persists the cart id between sessions.
/// The id is the only durable cart state; everything else lives in Shopify.
pub const CART_ID_COOKIE: &str = "cartId";

/// Why a remote cart action did not produce an updated cart.
#[derive(Debug, Error)]
pub enum CartActionError {
    /// No variant was selected before adding to cart.
    #[error("No variant selected")]
    MissingVariant,

    /// The remote cart could not be fetched.
    #[error("Cart not found")]
    CartNotFound,

    /// No cart line exists for the given merchandise id.
    #[error("Item not found in cart: {0}")]
    LineNotFound(String),

    /// The Storefront API call failed.
    #[error("Shopify error: {0}")]
    Remote(#[from] ShopifyError),
}

/// Create a new remote cart.
///
/// The caller persists `cart.id` (e.g., in the [`CART_ID_COOKIE`] cookie) -
/// it is the handle every later action needs.
///
/// # Errors
///
/// Returns `CartActionError::Remote` if cart creation fails.
#[instrument(skip(client))]
pub async fn create_cart(client: &StorefrontClient) -> Result<Cart, CartActionError> {
    Ok(client.create_cart().await?)
}

/// Add one unit of a variant to the cart.
///
/// # Errors
///
/// Returns `CartActionError::MissingVariant` when no variant id is given (no
/// mutation is attempted), or `CartActionError::Remote` on API failure.
#[instrument(skip(client), fields(cart_id = %cart_id))]
pub async fn add_item(
    client: &StorefrontClient,
    cart_id: &str,
    variant_id: Option<&str>,
) -> Result<Cart, CartActionError> {
    let Some(variant_id) = variant_id else {
        return Err(CartActionError::MissingVariant);
    };

    let cart = client
        .add_to_cart(
            cart_id,
            vec![CartLineInput {
                merchandise_id: variant_id.to_string(),
                quantity: 1,
            }],
        )
        .await?;

    Ok(cart)
}

/// Remove the line for a merchandise id from the cart.
///
/// # Errors
///
/// Returns `CartActionError::LineNotFound` when no server line exists for the
/// merchandise id, or `CartActionError::Remote` on API failure.
#[instrument(skip(client), fields(cart_id = %cart_id, merchandise_id = %merchandise_id))]
pub async fn remove_item(
    client: &StorefrontClient,
    cart_id: &str,
    merchandise_id: &str,
) -> Result<Cart, CartActionError> {
    let cart = client.get_cart(cart_id).await.map_err(|e| match e {
        ShopifyError::NotFound(_) => CartActionError::CartNotFound,
        other => CartActionError::Remote(other),
    })?;

    let line_id = cart
        .line_for_merchandise(merchandise_id)
        .and_then(|line| line.id.clone())
        .ok_or_else(|| CartActionError::LineNotFound(merchandise_id.to_string()))?;

    Ok(client.remove_from_cart(cart_id, vec![line_id]).await?)
}

/// Set the quantity for a merchandise id.
///
/// Quantity zero removes the line. A merchandise id without a server line is
/// added fresh when the quantity is positive; otherwise the cart is returned
/// unchanged.
///
/// # Errors
///
/// Returns `CartActionError::CartNotFound` when the cart cannot be fetched,
/// or `CartActionError::Remote` on API failure.
#[instrument(skip(client), fields(cart_id = %cart_id, merchandise_id = %merchandise_id, quantity))]
pub async fn update_item_quantity(
    client: &StorefrontClient,
    cart_id: &str,
    merchandise_id: &str,
    quantity: i64,
) -> Result<Cart, CartActionError> {
    let cart = client.get_cart(cart_id).await.map_err(|e| match e {
        ShopifyError::NotFound(_) => CartActionError::CartNotFound,
        other => CartActionError::Remote(other),
    })?;

    let line_id = cart
        .line_for_merchandise(merchandise_id)
        .and_then(|line| line.id.clone());

    match line_id {
        Some(line_id) => {
            if quantity == 0 {
                Ok(client.remove_from_cart(cart_id, vec![line_id]).await?)
            } else {
                Ok(client
                    .update_cart(
                        cart_id,
                        vec![CartLineUpdateInput {
                            id: line_id,
                            merchandise_id: merchandise_id.to_string(),
                            quantity,
                        }],
                    )
                    .await?)
            }
        }
        None if quantity > 0 => Ok(client
            .add_to_cart(
                cart_id,
                vec![CartLineInput {
                    merchandise_id: merchandise_id.to_string(),
                    quantity,
                }],
            )
            .await?),
        None => Ok(cart),
    }
}
