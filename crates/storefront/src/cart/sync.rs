//! Overlay of optimistic local state and remote confirmation.
//!
//! Each helper applies the local mutation first (immediately visible to
//! subscribers), then runs the matching remote action and feeds the
//! authoritative cart back through [`CartStore::set_cart`].
//!
//! On remote failure the optimistic state is deliberately left in place as
//! the shopper's working view - there is no rollback. The error is returned
//! so the caller can surface a "could not sync" signal; local and remote
//! state stay diverged until the next successful sync.
//!
//! When two syncs overlap, both optimistic updates apply immediately and
//! whichever remote response resolves last wins the reconciliation.

use tracing::warn;

use crate::cart::actions::{self, CartActionError};
use crate::cart::{CartStore, UpdateKind};
use crate::shopify::StorefrontClient;
use crate::shopify::types::{Product, ProductVariant};

/// Add one unit of a variant, then reconcile with the server.
///
/// # Errors
///
/// Returns the remote failure; local state keeps the optimistic add.
pub async fn add_item(
    store: &CartStore,
    client: &StorefrontClient,
    cart_id: &str,
    variant: &ProductVariant,
    product: &Product,
) -> Result<(), CartActionError> {
    store.add_item(variant, product);

    match actions::add_item(client, cart_id, Some(&variant.id)).await {
        Ok(cart) => {
            store.set_cart(cart);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "cart add failed to sync; keeping optimistic state");
            Err(e)
        }
    }
}

/// Adjust or remove a line, then reconcile with the server.
///
/// The target quantity for the remote update is derived from the local line
/// before the optimistic change is applied.
///
/// # Errors
///
/// Returns the remote failure; local state keeps the optimistic update.
pub async fn update_item(
    store: &CartStore,
    client: &StorefrontClient,
    cart_id: &str,
    merchandise_id: &str,
    kind: UpdateKind,
) -> Result<(), CartActionError> {
    let current_quantity = store
        .cart()
        .line_for_merchandise(merchandise_id)
        .map_or(0, |line| line.quantity);

    store.update_item(merchandise_id, kind);

    let result = match kind {
        UpdateKind::Remove => actions::remove_item(client, cart_id, merchandise_id).await,
        UpdateKind::Increment => {
            actions::update_item_quantity(client, cart_id, merchandise_id, current_quantity + 1)
                .await
        }
        UpdateKind::Decrement => {
            actions::update_item_quantity(
                client,
                cart_id,
                merchandise_id,
                (current_quantity - 1).max(0),
            )
            .await
        }
    };

    match result {
        Ok(cart) => {
            store.set_cart(cart);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "cart update failed to sync; keeping optimistic state");
            Err(e)
        }
    }
}
