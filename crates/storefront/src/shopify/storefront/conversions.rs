//! Wire shapes for Storefront API responses and their conversions into
//! domain types.
//!
//! The API speaks camelCase JSON with connection wrappers (`lines.edges[].node`);
//! these structs mirror that exactly and are flattened into the domain `Cart`.

use copihue_core::Money;
use serde::Deserialize;

use crate::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartMerchandise, Image, Product, SelectedOption,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMoney {
    pub amount: String,
    pub currency_code: String,
}

impl From<WireMoney> for Money {
    fn from(money: WireMoney) -> Self {
        Self::new(money.amount, money.currency_code)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireSelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub featured_image: Option<WireImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMerchandise {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selected_options: Vec<WireSelectedOption>,
    pub product: WireProduct,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLineCost {
    pub total_amount: WireMoney,
}

#[derive(Debug, Deserialize)]
pub struct WireLine {
    pub id: Option<String>,
    pub quantity: i64,
    pub cost: WireLineCost,
    pub merchandise: WireMerchandise,
}

#[derive(Debug, Deserialize)]
pub struct WireLineEdge {
    pub node: WireLine,
}

#[derive(Debug, Deserialize)]
pub struct WireLineConnection {
    pub edges: Vec<WireLineEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCartCost {
    pub subtotal_amount: WireMoney,
    pub total_amount: WireMoney,
    /// Null until Shopify has computed tax for the cart.
    pub total_tax_amount: Option<WireMoney>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCart {
    pub id: String,
    pub checkout_url: String,
    pub total_quantity: i64,
    pub cost: WireCartCost,
    pub lines: WireLineConnection,
}

/// User error attached to a cart mutation payload.
#[derive(Debug, Deserialize)]
pub struct WireUserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Common payload shape shared by all cart mutations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutationPayload {
    pub cart: Option<WireCart>,
    #[serde(default)]
    pub user_errors: Vec<WireUserError>,
}

// Per-operation response data.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartData {
    pub cart_create: Option<CartMutationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct GetCartData {
    pub cart: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartData {
    pub cart_lines_add: Option<CartMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLinesData {
    pub cart_lines_update: Option<CartMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartData {
    pub cart_lines_remove: Option<CartMutationPayload>,
}

/// Flatten a wire cart into the domain type.
pub fn convert_cart(cart: WireCart) -> Cart {
    let total_currency = cart.cost.total_amount.currency_code.clone();
    let total_tax_amount = cart
        .cost
        .total_tax_amount
        .map_or_else(|| Money::zero(&total_currency), Money::from);

    Cart {
        id: Some(cart.id),
        checkout_url: cart.checkout_url,
        total_quantity: cart.total_quantity,
        cost: CartCost {
            subtotal_amount: cart.cost.subtotal_amount.into(),
            total_amount: cart.cost.total_amount.into(),
            total_tax_amount,
        },
        lines: cart.lines.edges.into_iter().map(convert_line).collect(),
    }
}

fn convert_line(edge: WireLineEdge) -> CartLine {
    let line = edge.node;
    CartLine {
        id: line.id,
        quantity: line.quantity,
        cost: CartLineCost {
            total_amount: line.cost.total_amount.into(),
        },
        merchandise: CartMerchandise {
            id: line.merchandise.id,
            title: line.merchandise.title,
            selected_options: line
                .merchandise
                .selected_options
                .into_iter()
                .map(|option| SelectedOption {
                    name: option.name,
                    value: option.value,
                })
                .collect(),
            product: Product {
                id: line.merchandise.product.id,
                handle: line.merchandise.product.handle,
                title: line.merchandise.product.title,
                featured_image: line.merchandise.product.featured_image.map(|image| Image {
                    url: image.url,
                    alt_text: image.alt_text,
                }),
            },
        },
    }
}

/// Join user error messages for a `ShopifyError::UserError`.
pub fn join_user_errors(errors: &[WireUserError]) -> String {
    errors
        .iter()
        .map(|e| {
            e.field.as_ref().map_or_else(
                || e.message.clone(),
                |field| format!("{}: {}", field.join("."), e.message),
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_wire_cart_with_null_tax() {
        let wire: WireCart = serde_json::from_value(json!({
            "id": "gid://shopify/Cart/abc",
            "checkoutUrl": "https://copihue-books.myshopify.com/checkout/abc",
            "totalQuantity": 2,
            "cost": {
                "subtotalAmount": {"amount": "2000", "currencyCode": "CLP"},
                "totalAmount": {"amount": "2000", "currencyCode": "CLP"},
                "totalTaxAmount": null
            },
            "lines": {"edges": [{"node": {
                "id": "gid://shopify/CartLine/1",
                "quantity": 2,
                "cost": {"totalAmount": {"amount": "2000", "currencyCode": "CLP"}},
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/1",
                    "title": "Default Title",
                    "selectedOptions": [],
                    "product": {
                        "id": "gid://shopify/Product/1",
                        "handle": "rayuela",
                        "title": "Rayuela",
                        "featuredImage": null
                    }
                }
            }}]}
        }))
        .expect("wire cart");

        let cart = convert_cart(wire);
        assert_eq!(cart.id.as_deref(), Some("gid://shopify/Cart/abc"));
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.lines.len(), 1);
        // Missing tax becomes a zero in the cart currency
        assert!(cart.cost.total_tax_amount.is_zero());
        assert_eq!(cart.cost.total_tax_amount.currency_code, "CLP");
    }

    #[test]
    fn joins_user_errors_with_field_paths() {
        let errors = vec![
            WireUserError {
                field: Some(vec!["lines".to_string(), "quantity".to_string()]),
                message: "must be positive".to_string(),
            },
            WireUserError {
                field: None,
                message: "cart is locked".to_string(),
            },
        ];
        assert_eq!(
            join_user_errors(&errors),
            "lines.quantity: must be positive; cart is locked"
        );
    }
}
