//! Provision remote schema definitions through the Admin API.

use tracing::error;

use copihue_admin::config::AdminApiConfig;
use copihue_admin::provision::{
    ProvisionSummary, ensure_metafield_definitions, ensure_metaobject_definitions,
};
use copihue_admin::shopify::{AdminClient, AdminError};

/// Ensure metafield definitions exist.
///
/// # Errors
///
/// Returns an error on invalid configuration or a fatal token failure;
/// per-definition failures are reported in the summary instead.
pub async fn metafields() -> Result<ProvisionSummary, Box<dyn std::error::Error>> {
    let (client, config) = client_from_env()?;

    ensure_metafield_definitions(&client)
        .await
        .map_err(|e| fatal(&config, e))
}

/// Ensure metaobject definitions exist.
///
/// # Errors
///
/// Returns an error on invalid configuration or a fatal token failure.
pub async fn metaobjects() -> Result<ProvisionSummary, Box<dyn std::error::Error>> {
    let (client, config) = client_from_env()?;

    ensure_metaobject_definitions(&client)
        .await
        .map_err(|e| fatal(&config, e))
}

/// Ensure all definitions exist, metafields first.
///
/// # Errors
///
/// Returns an error on invalid configuration or a fatal token failure.
pub async fn all() -> Result<ProvisionSummary, Box<dyn std::error::Error>> {
    let (client, config) = client_from_env()?;

    let mut summary = ensure_metafield_definitions(&client)
        .await
        .map_err(|e| fatal(&config, e))?;
    summary.merge(
        ensure_metaobject_definitions(&client)
            .await
            .map_err(|e| fatal(&config, e))?,
    );

    Ok(summary)
}

fn client_from_env() -> Result<(AdminClient, AdminApiConfig), Box<dyn std::error::Error>> {
    let config = AdminApiConfig::from_env()?;
    let client = AdminClient::new(&config);
    Ok((client, config))
}

/// Log the misconfiguration checklist for a fatal token failure, then pass
/// the error through for the exit path.
fn fatal(config: &AdminApiConfig, e: AdminError) -> Box<dyn std::error::Error> {
    if e.is_token_failure() {
        error!("{e}");
        error!("Checklist:");
        error!(
            "  1. SHOPIFY_SHOP should be your store handle (e.g., 'copihue-books'); currently resolving to: {}",
            config.shop_domain()
        );
        error!("  2. SHOPIFY_CLIENT_ID and SHOPIFY_CLIENT_SECRET must be from Dev Dashboard > Settings");
        error!("  3. The app must have a released version with scopes: write_products, read_products");
        error!("  4. The app must be installed on the store (Dev Dashboard > Home > Install app)");
    }
    Box::new(e)
}
