//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw wire
//! shapes (see the client's `conversions` module).

use copihue_core::Money;
use serde::{Deserialize, Serialize};

// =============================================================================
// Image / Option Types
// =============================================================================

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Formato").
    pub name: String,
    /// Selected value (e.g., "Tapa dura").
    pub value: String,
}

// =============================================================================
// Product Summaries
// =============================================================================

/// Product summary carried by cart merchandise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Featured image.
    pub featured_image: Option<Image>,
}

/// Purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID (the merchandise id used in cart lines).
    pub id: String,
    /// Variant title.
    pub title: String,
    /// Current unit price.
    pub price: Money,
    /// Selected options.
    pub selected_options: Vec<SelectedOption>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Merchandise in a cart line (the purchasable variant plus product summary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: String,
    /// Variant title.
    pub title: String,
    /// Selected options.
    pub selected_options: Vec<SelectedOption>,
    /// Parent product info.
    pub product: Product,
}

/// Cost for a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineCost {
    /// Total for the line (unit price x quantity, or server-computed).
    pub total_amount: Money,
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID. Absent until the server assigns one.
    pub id: Option<String>,
    /// Quantity. Always positive while the line is present.
    pub quantity: i64,
    /// Line cost.
    pub cost: CartLineCost,
    /// Product variant.
    pub merchandise: CartMerchandise,
}

/// Cart cost summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    pub subtotal_amount: Money,
    /// Total amount.
    pub total_amount: Money,
    /// Total tax amount. Always zero in local math.
    pub total_tax_amount: Money,
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID. Absent until a remote cart has been created.
    pub id: Option<String>,
    /// Checkout URL.
    pub checkout_url: String,
    /// Total item quantity.
    pub total_quantity: i64,
    /// Cart cost summary.
    pub cost: CartCost,
    /// Cart lines.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart priced in the given currency.
    #[must_use]
    pub fn empty(currency_code: &str) -> Self {
        Self {
            id: None,
            checkout_url: String::new(),
            total_quantity: 0,
            cost: CartCost {
                subtotal_amount: Money::zero(currency_code),
                total_amount: Money::zero(currency_code),
                total_tax_amount: Money::zero(currency_code),
            },
            lines: Vec::new(),
        }
    }

    /// Look up a line by merchandise (variant) id.
    #[must_use]
    pub fn line_for_merchandise(&self, merchandise_id: &str) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.merchandise.id == merchandise_id)
    }
}

// =============================================================================
// Mutation Inputs
// =============================================================================

/// Input for adding a line to a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: String,
    /// Quantity to add.
    pub quantity: i64,
}

/// Input for updating an existing cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: String,
    /// New merchandise ID.
    pub merchandise_id: String,
    /// New quantity.
    pub quantity: i64,
}
