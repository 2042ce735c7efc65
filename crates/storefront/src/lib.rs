//! Copihue Storefront library.
//!
//! Storefront-side building blocks for the Copihue Books shop:
//!
//! - [`cart`] - In-memory cart state with optimistic updates and server
//!   reconciliation
//! - [`shopify`] - Shopify Storefront API client (cart operations)
//! - [`config`] - Environment-based configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod shopify;
