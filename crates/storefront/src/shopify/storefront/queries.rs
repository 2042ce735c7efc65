//! Raw GraphQL documents for Storefront API cart operations.
//!
//! All cart mutations share the same cart selection so every response carries
//! the full authoritative cart for reconciliation. Use [`document`] to append
//! the shared fragment to an operation before sending it.

/// Shared cart selection set.
const CART_FRAGMENT: &str = r"
fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  cost {
    subtotalAmount { amount currencyCode }
    totalAmount { amount currencyCode }
    totalTaxAmount { amount currencyCode }
  }
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        cost {
          totalAmount { amount currencyCode }
        }
        merchandise {
          ... on ProductVariant {
            id
            title
            selectedOptions { name value }
            product {
              id
              handle
              title
              featuredImage { url altText }
            }
          }
        }
      }
    }
  }
}
";

/// Append the shared cart fragment to an operation.
#[must_use]
pub fn document(operation: &str) -> String {
    format!("{operation}{CART_FRAGMENT}")
}

pub const CREATE_CART: &str = r"
mutation CreateCart {
  cartCreate {
    cart { ...CartFields }
    userErrors { field message }
  }
}
";

pub const GET_CART: &str = r"
query GetCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}
";

pub const ADD_TO_CART: &str = r"
mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message }
  }
}
";

pub const UPDATE_CART_LINES: &str = r"
mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message }
  }
}
";

pub const REMOVE_FROM_CART: &str = r"
mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { field message }
  }
}
";
