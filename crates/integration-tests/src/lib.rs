//! Integration tests for Copihue Books.
//!
//! All tests run against [`mock::MockShopify`], an in-process axum stand-in
//! for Shopify's OAuth token endpoint, Admin GraphQL endpoint, and
//! Storefront GraphQL endpoint - no network access required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p copihue-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `admin_token_cache` - token grant, caching, and refresh behavior
//! - `admin_provisioner` - idempotent definition provisioning
//! - `storefront_cart_sync` - optimistic cart state reconciliation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod mock;
