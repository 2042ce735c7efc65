//! Shared type definitions.

mod money;

pub use money::Money;
