//! Copihue Core - Shared types library.
//!
//! This crate provides common types used across all Copihue Books components:
//! - `storefront` - Public-facing bookstore site (cart, Storefront API)
//! - `admin` - Admin API client and schema provisioning
//! - `cli` - Command-line tools for store setup
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Money and currency handling shared by both API surfaces

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
