//! Metafield definition provisioning.

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument};

use super::definitions::{METAFIELD_DEFINITIONS, MetafieldDefinition};
use super::{Outcome, ProvisionSummary, UserError, classify};
use crate::shopify::AdminClient;
use crate::shopify::AdminError;

const CREATE_METAFIELD_DEFINITION: &str = r"
mutation CreateMetafieldDefinition($definition: MetafieldDefinitionInput!) {
  metafieldDefinitionCreate(definition: $definition) {
    createdDefinition {
      id
      name
      namespace
      key
    }
    userErrors {
      field
      message
      code
    }
  }
}
";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMetafieldData {
    metafield_definition_create: Option<CreateMetafieldPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMetafieldPayload {
    created_definition: Option<CreatedDefinition>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct CreatedDefinition {
    id: String,
}

/// Ensure every metafield definition in the static list exists on the shop.
///
/// Per-definition failures are counted and do not abort the walk; the
/// summary reports created/skipped/failed for the whole run.
///
/// # Errors
///
/// Returns early only on a token-grant failure, which is fatal
/// misconfiguration that would fail every remaining item identically.
#[instrument(skip(client))]
pub async fn ensure_metafield_definitions(
    client: &AdminClient,
) -> Result<ProvisionSummary, AdminError> {
    info!(
        count = METAFIELD_DEFINITIONS.len(),
        "Creating metafield definitions"
    );

    let mut summary = ProvisionSummary::default();

    for definition in METAFIELD_DEFINITIONS {
        let identifier = definition.identifier();

        match create_definition(client, definition).await {
            Ok(outcome) => summary.record(outcome),
            Err(e) if e.is_token_failure() => return Err(e),
            Err(e) => {
                error!(definition = %identifier, error = %e, "Metafield definition failed");
                summary.record(Outcome::Failed);
            }
        }
    }

    info!(%summary, "Metafield definitions done");
    Ok(summary)
}

async fn create_definition(
    client: &AdminClient,
    definition: &MetafieldDefinition,
) -> Result<Outcome, AdminError> {
    let identifier = definition.identifier();

    let data: CreateMetafieldData = client
        .execute(
            CREATE_METAFIELD_DEFINITION,
            json!({ "definition": definition.as_input() }),
        )
        .await?;

    let Some(payload) = data.metafield_definition_create else {
        error!(definition = %identifier, "Mutation returned no payload");
        return Ok(Outcome::Failed);
    };

    let outcome = classify(&payload.user_errors);
    match outcome {
        Outcome::Created => {
            let id = payload
                .created_definition
                .map(|d| d.id)
                .unwrap_or_default();
            info!(definition = %identifier, id = %id, "Created");
        }
        Outcome::Skipped => {
            info!(definition = %identifier, "Already exists, skipping");
        }
        Outcome::Failed => {
            for user_error in &payload.user_errors {
                error!(definition = %identifier, error = %user_error.describe(), "User error");
            }
        }
    }

    Ok(outcome)
}
