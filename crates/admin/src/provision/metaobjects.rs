//! Metaobject definition provisioning.

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument};

use super::definitions::{METAOBJECT_DEFINITIONS, MetaobjectDefinition};
use super::{Outcome, ProvisionSummary, UserError, classify};
use crate::shopify::AdminClient;
use crate::shopify::AdminError;

const CREATE_METAOBJECT_DEFINITION: &str = r"
mutation CreateMetaobjectDefinition($definition: MetaobjectDefinitionCreateInput!) {
  metaobjectDefinitionCreate(definition: $definition) {
    metaobjectDefinition {
      id
      type
      name
      fieldDefinitions {
        key
      }
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
struct CreateMetaobjectData {
    metaobject_definition_create: Option<CreateMetaobjectPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMetaobjectPayload {
    metaobject_definition: Option<CreatedMetaobject>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedMetaobject {
    id: String,
    #[serde(default)]
    field_definitions: Vec<CreatedField>,
}

#[derive(Debug, Deserialize)]
struct CreatedField {
    key: String,
}

/// Ensure every metaobject definition in the static list exists on the shop.
///
/// Per-definition failures are counted and do not abort the walk.
///
/// # Errors
///
/// Returns early only on a fatal token-grant failure.
#[instrument(skip(client))]
pub async fn ensure_metaobject_definitions(
    client: &AdminClient,
) -> Result<ProvisionSummary, AdminError> {
    info!(
        count = METAOBJECT_DEFINITIONS.len(),
        "Creating metaobject definitions"
    );

    let mut summary = ProvisionSummary::default();

    for definition in METAOBJECT_DEFINITIONS {
        match create_definition(client, definition).await {
            Ok(outcome) => summary.record(outcome),
            Err(e) if e.is_token_failure() => return Err(e),
            Err(e) => {
                error!(definition = %definition.object_type, error = %e, "Metaobject definition failed");
                summary.record(Outcome::Failed);
            }
        }
    }

    info!(%summary, "Metaobject definitions done");
    Ok(summary)
}

async fn create_definition(
    client: &AdminClient,
    definition: &MetaobjectDefinition,
) -> Result<Outcome, AdminError> {
    let data: CreateMetaobjectData = client
        .execute(
            CREATE_METAOBJECT_DEFINITION,
            json!({ "definition": definition.as_input() }),
        )
        .await?;

    let Some(payload) = data.metaobject_definition_create else {
        error!(definition = %definition.object_type, "Mutation returned no payload");
        return Ok(Outcome::Failed);
    };

    let outcome = classify(&payload.user_errors);
    match outcome {
        Outcome::Created => {
            let (id, fields) = payload.metaobject_definition.map_or_else(
                || (String::new(), String::new()),
                |created| {
                    let fields = created
                        .field_definitions
                        .iter()
                        .map(|f| f.key.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    (created.id, fields)
                },
            );
            info!(definition = %definition.object_type, id = %id, fields = %fields, "Created");
        }
        Outcome::Skipped => {
            info!(definition = %definition.object_type, "Already exists, skipping");
        }
        Outcome::Failed => {
            for user_error in &payload.user_errors {
                error!(
                    definition = %definition.object_type,
                    error = %user_error.describe(),
                    "User error"
                );
            }
        }
    }

    Ok(outcome)
}
