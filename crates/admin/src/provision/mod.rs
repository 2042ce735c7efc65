//! Idempotent provisioning of custom-data schema on the shop.
//!
//! Walks the static definition lists in [`definitions`] and ensures each
//! exists remotely exactly once. "Already exists" user errors are counted as
//! skips, so the provisioner is safe to re-run from deployment automation
//! without tracking state.

pub mod definitions;
mod metafields;
mod metaobjects;

pub use metafields::ensure_metafield_definitions;
pub use metaobjects::ensure_metaobject_definitions;

use serde::Deserialize;

/// User error codes meaning the definition already exists.
const ALREADY_EXISTS_CODES: &[&str] = &["TAKEN", "RESERVED_NAMESPACE_KEY", "TYPE_ALREADY_EXISTS"];

/// User error attached to a definition-create mutation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    /// Field path that caused the error.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code.
    #[serde(default)]
    pub code: Option<String>,
}

impl UserError {
    /// Render as `field.path: message` for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        self.field.as_ref().map_or_else(
            || self.message.clone(),
            |field| format!("{}: {}", field.join("."), self.message),
        )
    }
}

/// Result of provisioning a single definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The mutation created the definition.
    Created,
    /// The definition already existed; treated as success.
    Skipped,
    /// Any other user error or transport failure.
    Failed,
}

/// Classify a mutation's user errors.
///
/// No errors means created; an "already exists" code means skipped;
/// everything else is a failure.
#[must_use]
pub fn classify(user_errors: &[UserError]) -> Outcome {
    if user_errors.is_empty() {
        return Outcome::Created;
    }

    let already_exists = user_errors.iter().any(|e| {
        e.code
            .as_deref()
            .is_some_and(|code| ALREADY_EXISTS_CODES.contains(&code))
    });

    if already_exists {
        Outcome::Skipped
    } else {
        Outcome::Failed
    }
}

/// Counts for a full provisioning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisionSummary {
    /// Definitions newly created.
    pub created: usize,
    /// Definitions that already existed.
    pub skipped: usize,
    /// Definitions that could not be created.
    pub failed: usize,
}

impl ProvisionSummary {
    /// Record one per-definition outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// A run succeeds iff nothing failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: Self) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

impl std::fmt::Display for ProvisionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} skipped, {} failed",
            self.created, self.skipped, self.failed
        )
    }
}
