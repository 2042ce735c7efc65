//! In-memory cart state with optimistic updates.
//!
//! [`CartStore`] is the single source of truth for the shopper's cart. Local
//! mutations (add, increment, decrement, remove) apply synchronously against
//! the previous state and are always infallible; the authoritative Shopify
//! cart arrives later through [`CartStore::set_cart`] and overwrites local
//! state wholesale (see [`sync`]).
//!
//! State changes publish immutable snapshots over a `tokio::sync::watch`
//! channel; consumers subscribe and pull the latest snapshot instead of being
//! re-rendered implicitly.

pub mod actions;
pub mod sync;

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::watch;

use copihue_core::Money;

use crate::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartMerchandise, Product, ProductVariant,
};

/// Currency used for an empty cart before any line sets one.
pub const FALLBACK_CURRENCY: &str = "CLP";

/// How to adjust an existing cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Increase quantity by one.
    Increment,
    /// Decrease quantity by one; the line is dropped at zero.
    Decrement,
    /// Drop the line unconditionally.
    Remove,
}

/// Immutable snapshot of cart state.
#[derive(Debug, Clone)]
pub struct CartState {
    /// The current cart value.
    pub cart: Cart,
    /// Whether the cart sheet is shown.
    pub open: bool,
}

/// Shared, observable cart state.
///
/// Cheap to clone; all clones publish to and observe the same state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    tx: watch::Sender<CartState>,
}

impl CartStore {
    /// Create a store from a server cart, or an empty cart if none exists yet.
    #[must_use]
    pub fn new(server_cart: Option<Cart>) -> Self {
        let cart = server_cart.unwrap_or_else(|| Cart::empty(FALLBACK_CURRENCY));
        let (tx, _rx) = watch::channel(CartState { cart, open: false });

        Self {
            inner: Arc::new(CartStoreInner { tx }),
        }
    }

    /// Subscribe to state snapshots.
    ///
    /// The receiver observes every published snapshot; use
    /// `borrow_and_update` to pull the latest.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.tx.subscribe()
    }

    /// Clone of the current cart value.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.tx.borrow().cart.clone()
    }

    /// Whether the cart sheet is currently shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.tx.borrow().open
    }

    /// Flip cart sheet visibility.
    pub fn toggle(&self) {
        self.inner.tx.send_modify(|state| state.open = !state.open);
    }

    /// Optimistically add one unit of a variant.
    ///
    /// An existing line for the variant gains one unit, with its cost
    /// recomputed as unit price x new quantity; otherwise a new line with
    /// quantity 1 is appended. Never fails.
    pub fn add_item(&self, variant: &ProductVariant, product: &Product) {
        self.inner.tx.send_modify(|state| {
            let cart = &mut state.cart;

            if let Some(line) = cart
                .lines
                .iter_mut()
                .find(|line| line.merchandise.id == variant.id)
            {
                line.quantity += 1;
                line.cost.total_amount = Money::from_decimal(
                    variant.price.decimal() * Decimal::from(line.quantity),
                    &variant.price.currency_code,
                );
            } else {
                cart.lines.push(new_line(variant, product));
            }

            recompute_totals(cart);
        });
    }

    /// Optimistically adjust the line for a merchandise id.
    ///
    /// Unknown merchandise ids are a no-op; the remote sync layer reports
    /// those as [`actions::CartActionError::LineNotFound`].
    pub fn update_item(&self, merchandise_id: &str, kind: UpdateKind) {
        self.inner.tx.send_modify(|state| {
            let cart = &mut state.cart;

            let mut lines = Vec::with_capacity(cart.lines.len());
            for line in cart.lines.drain(..) {
                if line.merchandise.id == merchandise_id {
                    if let Some(updated) = adjust_line(line, kind) {
                        lines.push(updated);
                    }
                } else {
                    lines.push(line);
                }
            }
            cart.lines = lines;

            recompute_totals(cart);
        });
    }

    /// Replace the local cart with an authoritative server value.
    ///
    /// The reconciliation point: no merging, last writer wins. The sheet
    /// visibility flag is preserved.
    pub fn set_cart(&self, cart: Cart) {
        self.inner.tx.send_modify(|state| state.cart = cart);
    }
}

/// Build a fresh quantity-1 line for a variant.
fn new_line(variant: &ProductVariant, product: &Product) -> CartLine {
    CartLine {
        id: None,
        quantity: 1,
        cost: CartLineCost {
            total_amount: variant.price.clone(),
        },
        merchandise: CartMerchandise {
            id: variant.id.clone(),
            title: variant.title.clone(),
            selected_options: variant.selected_options.clone(),
            product: product.clone(),
        },
    }
}

/// Apply an adjustment to a line. `None` means the line is dropped.
///
/// Increment/decrement recompute cost proportionally from the line's own
/// per-unit cost rather than re-reading the catalog price, so cycles of
/// decrement and increment stay numerically stable.
fn adjust_line(line: CartLine, kind: UpdateKind) -> Option<CartLine> {
    let delta = match kind {
        UpdateKind::Remove => return None,
        UpdateKind::Increment => 1,
        UpdateKind::Decrement => -1,
    };

    let new_quantity = line.quantity + delta;
    if new_quantity <= 0 {
        return None;
    }

    let per_unit = line.cost.total_amount.decimal() / Decimal::from(line.quantity);
    let currency = line.cost.total_amount.currency_code.clone();

    Some(CartLine {
        quantity: new_quantity,
        cost: CartLineCost {
            total_amount: Money::from_decimal(per_unit * Decimal::from(new_quantity), currency),
        },
        ..line
    })
}

/// Recompute aggregate quantity and cost from the lines.
///
/// Currency comes from the first line; an emptied cart keeps its previous
/// currency code with all amounts reset to zero. Tax is always zero in local
/// math; the server value arrives with the next reconciliation.
fn recompute_totals(cart: &mut Cart) {
    let currency = cart.lines.first().map_or_else(
        || cart.cost.total_amount.currency_code.clone(),
        |line| line.cost.total_amount.currency_code.clone(),
    );

    cart.total_quantity = cart.lines.iter().map(|line| line.quantity).sum();

    let total: Decimal = cart
        .lines
        .iter()
        .map(|line| line.cost.total_amount.decimal())
        .sum();

    cart.cost = CartCost {
        subtotal_amount: Money::from_decimal(total, &currency),
        total_amount: Money::from_decimal(total, &currency),
        total_tax_amount: Money::zero(&currency),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: &str, amount: &str) -> ProductVariant {
        ProductVariant {
            id: format!("gid://shopify/ProductVariant/{id}"),
            title: "Tapa blanda".to_string(),
            price: Money::new(amount, "CLP"),
            selected_options: vec![],
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: format!("gid://shopify/Product/{id}"),
            handle: "la-casa-de-los-espiritus".to_string(),
            title: "La casa de los espíritus".to_string(),
            featured_image: None,
        }
    }

    fn merchandise_id(id: &str) -> String {
        format!("gid://shopify/ProductVariant/{id}")
    }

    fn assert_totals_consistent(cart: &Cart) {
        let quantity_sum: i64 = cart.lines.iter().map(|l| l.quantity).sum();
        assert_eq!(cart.total_quantity, quantity_sum);

        let cost_sum: Decimal = cart
            .lines
            .iter()
            .map(|l| l.cost.total_amount.decimal())
            .sum();
        assert_eq!(cart.cost.total_amount.decimal(), cost_sum);
        assert_eq!(cart.cost.subtotal_amount.decimal(), cost_sum);
    }

    #[test]
    fn add_new_item_creates_quantity_one_line() {
        let store = CartStore::new(None);
        store.add_item(&variant("1", "1000"), &product("1"));

        let cart = store.cart();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_quantity, 1);
        assert_eq!(cart.cost.total_amount.amount, "1000");
        assert_eq!(cart.cost.total_amount.currency_code, "CLP");
        assert_totals_consistent(&cart);
    }

    #[test]
    fn add_same_variant_increments_existing_line() {
        let store = CartStore::new(None);
        store.add_item(&variant("1", "1000"), &product("1"));
        store.add_item(&variant("1", "1000"), &product("1"));

        let cart = store.cart();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.cost.total_amount.amount, "2000");
        assert_totals_consistent(&cart);
    }

    #[test]
    fn concrete_scenario_add_add_decrement_decrement() {
        // Empty cart -> add V1 (1000 CLP) -> add V1 -> decrement -> decrement
        let store = CartStore::new(None);
        let v1 = variant("1", "1000");

        store.add_item(&v1, &product("1"));
        assert_eq!(store.cart().cost.total_amount.amount, "1000");

        store.add_item(&v1, &product("1"));
        assert_eq!(store.cart().cost.total_amount.amount, "2000");

        store.update_item(&merchandise_id("1"), UpdateKind::Decrement);
        let cart = store.cart();
        assert_eq!(cart.total_quantity, 1);
        assert_eq!(cart.cost.total_amount.amount, "1000");

        store.update_item(&merchandise_id("1"), UpdateKind::Decrement);
        let cart = store.cart();
        assert!(cart.lines.is_empty());
        assert_eq!(cart.total_quantity, 0);
        assert!(cart.cost.total_amount.is_zero());
        assert_totals_consistent(&cart);
    }

    #[test]
    fn decrementing_quantity_one_removes_the_line() {
        let store = CartStore::new(None);
        store.add_item(&variant("1", "5990"), &product("1"));
        store.update_item(&merchandise_id("1"), UpdateKind::Decrement);

        assert!(store.cart().lines.is_empty());
    }

    #[test]
    fn remove_drops_line_regardless_of_quantity() {
        let store = CartStore::new(None);
        for _ in 0..5 {
            store.add_item(&variant("1", "1000"), &product("1"));
        }
        store.update_item(&merchandise_id("1"), UpdateKind::Remove);

        let cart = store.cart();
        assert!(cart.lines.is_empty());
        assert_eq!(cart.total_quantity, 0);
    }

    #[test]
    fn proportional_cost_is_stable_across_cycles() {
        // qty 1 @ P, increment to 3, decrement back to 1 -> cost is P again
        let store = CartStore::new(None);
        store.add_item(&variant("1", "12990"), &product("1"));

        store.update_item(&merchandise_id("1"), UpdateKind::Increment);
        store.update_item(&merchandise_id("1"), UpdateKind::Increment);
        store.update_item(&merchandise_id("1"), UpdateKind::Decrement);
        store.update_item(&merchandise_id("1"), UpdateKind::Decrement);

        let cart = store.cart();
        let line = cart.lines.first().expect("line present");
        assert_eq!(line.quantity, 1);
        assert_eq!(
            line.cost.total_amount.decimal(),
            Money::new("12990", "CLP").decimal()
        );
    }

    #[test]
    fn unknown_merchandise_id_is_a_no_op() {
        let store = CartStore::new(None);
        store.add_item(&variant("1", "1000"), &product("1"));

        store.update_item(&merchandise_id("99"), UpdateKind::Increment);

        let cart = store.cart();
        assert_eq!(cart.total_quantity, 1);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn totals_stay_consistent_across_mixed_lines() {
        let store = CartStore::new(None);
        store.add_item(&variant("1", "1000"), &product("1"));
        store.add_item(&variant("2", "2500"), &product("2"));
        store.add_item(&variant("2", "2500"), &product("2"));

        let cart = store.cart();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.total_quantity, 3);
        assert_eq!(cart.cost.total_amount.amount, "6000");
        assert_totals_consistent(&cart);

        store.update_item(&merchandise_id("2"), UpdateKind::Decrement);
        let cart = store.cart();
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.cost.total_amount.amount, "3500");
        assert_totals_consistent(&cart);
    }

    #[test]
    fn emptied_cart_keeps_currency_code() {
        let store = CartStore::new(None);
        store.add_item(&variant("1", "1000"), &product("1"));
        store.update_item(&merchandise_id("1"), UpdateKind::Remove);

        let cart = store.cart();
        assert_eq!(cart.cost.total_amount.currency_code, "CLP");
        assert!(cart.cost.total_amount.is_zero());
    }

    #[test]
    fn set_cart_replaces_state_and_is_idempotent() {
        let store = CartStore::new(None);
        store.add_item(&variant("1", "1000"), &product("1"));

        let mut server_cart = Cart::empty("CLP");
        server_cart.id = Some("gid://shopify/Cart/abc".to_string());
        server_cart.checkout_url = "https://shop.example/checkout".to_string();

        store.set_cart(server_cart.clone());
        let once = store.cart();

        store.set_cart(server_cart);
        let twice = store.cart();

        assert_eq!(once, twice);
        assert_eq!(once.id.as_deref(), Some("gid://shopify/Cart/abc"));
        assert!(once.lines.is_empty());
    }

    #[test]
    fn toggle_flips_visibility_only() {
        let store = CartStore::new(None);
        assert!(!store.is_open());

        store.toggle();
        assert!(store.is_open());

        store.add_item(&variant("1", "1000"), &product("1"));
        // Mutations leave the sheet flag alone
        assert!(store.is_open());

        store.toggle();
        assert!(!store.is_open());
    }

    #[test]
    fn subscribers_observe_published_snapshots() {
        let store = CartStore::new(None);
        let mut rx = store.subscribe();

        store.add_item(&variant("1", "1000"), &product("1"));

        assert!(rx.has_changed().expect("sender alive"));
        let state = rx.borrow_and_update();
        assert_eq!(state.cart.total_quantity, 1);
    }

    #[test]
    fn store_starts_from_server_cart_when_present() {
        let mut server_cart = Cart::empty("CLP");
        server_cart.id = Some("gid://shopify/Cart/existing".to_string());

        let store = CartStore::new(Some(server_cart));
        assert_eq!(
            store.cart().id.as_deref(),
            Some("gid://shopify/Cart/existing")
        );
    }
}
