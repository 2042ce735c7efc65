//! Copihue Admin library.
//!
//! Admin-side building blocks for Copihue Books store setup:
//!
//! - [`shopify`] - Admin API GraphQL client with client-credentials OAuth and
//!   in-memory token caching
//! - [`provision`] - Idempotent creation of metafield and metaobject
//!   definitions
//! - [`config`] - Environment-based configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod provision;
pub mod shopify;
