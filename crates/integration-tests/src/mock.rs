//! In-process stand-in for the Shopify endpoints the clients talk to.
//!
//! Serves three routes on an ephemeral port:
//!
//! - `POST /admin/oauth/access_token` - client-credentials grants, counted
//!   per request so tests can assert on token reuse
//! - `POST /admin/api/{version}/graphql.json` - metafield/metaobject
//!   definition creates with "already exists" semantics on re-runs
//! - `POST /api/{version}/graphql.json` - Storefront cart operations over an
//!   in-memory cart, every mock variant priced at 1000 CLP per unit

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};

use copihue_admin::shopify::AdminClient;
use copihue_storefront::shopify::StorefrontClient;

/// API version baked into the mock routes.
pub const API_VERSION: &str = "2026-01";

/// Unit price of every mock variant, in CLP.
pub const VARIANT_PRICE: i64 = 1000;

/// How the token endpoint should reject grants.
#[derive(Debug, Clone, Copy)]
pub enum TokenFailure {
    /// 401 with a JSON error body.
    Json,
    /// 404 with an HTML error page.
    Html,
}

/// A line in the mock server-side cart.
#[derive(Debug, Clone)]
pub struct MockLine {
    pub id: String,
    pub merchandise_id: String,
    pub quantity: i64,
}

/// The mock server-side cart.
#[derive(Debug, Clone, Default)]
pub struct MockCart {
    pub id: String,
    pub lines: Vec<MockLine>,
}

/// Mutable behavior and observed traffic.
#[derive(Debug)]
pub struct MockState {
    /// Number of token grants issued.
    pub grants: usize,
    /// Lifetime reported for each issued token.
    pub expires_in: i64,
    /// When set, the token endpoint rejects all grants.
    pub token_failure: Option<TokenFailure>,
    /// Identifiers of definitions that already exist.
    pub definitions: HashSet<String>,
    /// Identifiers forced to fail with a non-exists user error.
    pub failing_definitions: HashSet<String>,
    /// Access tokens observed on Admin GraphQL calls, in order.
    pub tokens_seen: Vec<String>,
    /// Server-side cart, if one has been created.
    pub cart: Option<MockCart>,
    /// Counter for assigning line ids.
    next_line_id: u64,
    /// When set, Storefront GraphQL calls answer 502.
    pub storefront_unavailable: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            grants: 0,
            expires_in: 86_400,
            token_failure: None,
            definitions: HashSet::new(),
            failing_definitions: HashSet::new(),
            tokens_seen: Vec::new(),
            cart: None,
            next_line_id: 0,
            storefront_unavailable: false,
        }
    }
}

type SharedState = Arc<Mutex<MockState>>;

/// A running mock Shopify instance.
pub struct MockShopify {
    addr: SocketAddr,
    state: SharedState,
}

impl MockShopify {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound; tests cannot proceed without it.
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState::default()));

        let router = Router::new()
            .route("/admin/oauth/access_token", post(token_handler))
            .route(
                &format!("/admin/api/{API_VERSION}/graphql.json"),
                post(admin_graphql_handler),
            )
            .route(
                &format!("/api/{API_VERSION}/graphql.json"),
                post(storefront_graphql_handler),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state }
    }

    /// Lock the mock state for inspection or adjustment.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock")
    }

    /// Grants issued so far.
    #[must_use]
    pub fn grants(&self) -> usize {
        self.state().grants
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        format!("http://{}/admin/oauth/access_token", self.addr)
    }

    #[must_use]
    pub fn admin_graphql_url(&self) -> String {
        format!("http://{}/admin/api/{API_VERSION}/graphql.json", self.addr)
    }

    #[must_use]
    pub fn storefront_graphql_url(&self) -> String {
        format!("http://{}/api/{API_VERSION}/graphql.json", self.addr)
    }

    /// Admin client wired to this mock.
    #[must_use]
    pub fn admin_client(&self) -> AdminClient {
        AdminClient::with_endpoints(
            self.token_url(),
            self.admin_graphql_url(),
            "mock-client-id".to_string(),
            SecretString::from("mock-client-secret"),
        )
    }

    /// Storefront client wired to this mock.
    #[must_use]
    pub fn storefront_client(&self) -> StorefrontClient {
        StorefrontClient::with_endpoint(
            self.storefront_graphql_url(),
            "mock-private-token".to_string(),
        )
    }
}

// =============================================================================
// Token endpoint
// =============================================================================

#[derive(Deserialize)]
struct TokenRequest {
    grant_type: String,
    #[allow(dead_code)]
    client_id: String,
    #[allow(dead_code)]
    client_secret: String,
}

async fn token_handler(
    State(state): State<SharedState>,
    Form(request): Form<TokenRequest>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");

    if let Some(failure) = state.token_failure {
        return match failure {
            TokenFailure::Json => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid_client"})),
            )
                .into_response(),
            TokenFailure::Html => (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/html")],
                "<html><head><title>Shop not found</title></head><body>404</body></html>",
            )
                .into_response(),
        };
    }

    if request.grant_type != "client_credentials" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        )
            .into_response();
    }

    state.grants += 1;
    let token = format!("mock-token-{}", state.grants);

    Json(json!({
        "access_token": token,
        "expires_in": state.expires_in,
        "scope": "read_products,write_products",
    }))
    .into_response()
}

// =============================================================================
// Admin GraphQL endpoint
// =============================================================================

async fn admin_graphql_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");

    let token = headers
        .get("x-shopify-access-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.tokens_seen.push(token);

    let query = body["query"].as_str().unwrap_or_default();
    let definition = &body["variables"]["definition"];

    if query.contains("metafieldDefinitionCreate") {
        let identifier = format!(
            "{}.{}",
            definition["namespace"].as_str().unwrap_or_default(),
            definition["key"].as_str().unwrap_or_default()
        );
        let payload = definition_payload(
            &mut state,
            &identifier,
            "TAKEN",
            |id| json!({"createdDefinition": {"id": format!("gid://shopify/MetafieldDefinition/{id}"), "name": definition["name"], "namespace": definition["namespace"], "key": definition["key"]}}),
        );
        return Json(json!({"data": {"metafieldDefinitionCreate": payload}})).into_response();
    }

    if query.contains("metaobjectDefinitionCreate") {
        let identifier = definition["type"].as_str().unwrap_or_default().to_string();
        let fields = definition["fieldDefinitions"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(|f| json!({"key": f["key"]}))
            .collect::<Vec<_>>();
        let payload = definition_payload(
            &mut state,
            &identifier,
            "TYPE_ALREADY_EXISTS",
            |id| json!({"metaobjectDefinition": {"id": format!("gid://shopify/MetaobjectDefinition/{id}"), "type": definition["type"], "name": definition["name"], "fieldDefinitions": fields}}),
        );
        return Json(json!({"data": {"metaobjectDefinitionCreate": payload}})).into_response();
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({"errors": [{"message": "unknown operation"}]})),
    )
        .into_response()
}

/// Create/skip/fail semantics shared by both definition mutations.
fn definition_payload(
    state: &mut MockState,
    identifier: &str,
    exists_code: &str,
    created: impl FnOnce(usize) -> Value,
) -> Value {
    if state.failing_definitions.contains(identifier) {
        return json!({
            "userErrors": [{
                "field": ["definition", "type"],
                "message": "Type is invalid",
                "code": "INVALID_OPTION",
            }],
        });
    }

    if state.definitions.contains(identifier) {
        return json!({
            "userErrors": [{
                "field": null,
                "message": "is already taken",
                "code": exists_code,
            }],
        });
    }

    state.definitions.insert(identifier.to_string());
    let mut payload = created(state.definitions.len());
    payload["userErrors"] = json!([]);
    payload
}

// =============================================================================
// Storefront GraphQL endpoint
// =============================================================================

async fn storefront_graphql_handler(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state lock");

    if state.storefront_unavailable {
        return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response();
    }

    let query = body["query"].as_str().unwrap_or_default();
    let variables = body["variables"].clone();

    if query.contains("cartCreate") {
        let cart = MockCart {
            id: "gid://shopify/Cart/mock".to_string(),
            lines: Vec::new(),
        };
        let rendered = render_cart(&cart);
        state.cart = Some(cart);
        return Json(json!({"data": {"cartCreate": {"cart": rendered, "userErrors": []}}}))
            .into_response();
    }

    if query.contains("cartLinesAdd") {
        let Some(mut cart) = cart_for(&state, &variables) else {
            return unknown_cart_response("cartLinesAdd");
        };
        for line in variables["lines"].as_array().cloned().unwrap_or_default() {
            let merchandise_id = line["merchandiseId"].as_str().unwrap_or_default().to_string();
            let quantity = line["quantity"].as_i64().unwrap_or(1);
            if let Some(existing) = cart
                .lines
                .iter_mut()
                .find(|l| l.merchandise_id == merchandise_id)
            {
                existing.quantity += quantity;
            } else {
                state.next_line_id += 1;
                cart.lines.push(MockLine {
                    id: format!("gid://shopify/CartLine/{}", state.next_line_id),
                    merchandise_id,
                    quantity,
                });
            }
        }
        let rendered = render_cart(&cart);
        state.cart = Some(cart);
        return Json(json!({"data": {"cartLinesAdd": {"cart": rendered, "userErrors": []}}}))
            .into_response();
    }

    if query.contains("cartLinesUpdate") {
        let Some(mut cart) = cart_for(&state, &variables) else {
            return unknown_cart_response("cartLinesUpdate");
        };
        for update in variables["lines"].as_array().cloned().unwrap_or_default() {
            let line_id = update["id"].as_str().unwrap_or_default();
            let quantity = update["quantity"].as_i64().unwrap_or(0);
            cart.lines.retain(|l| l.id != line_id || quantity > 0);
            if let Some(line) = cart.lines.iter_mut().find(|l| l.id == line_id) {
                line.quantity = quantity;
            }
        }
        let rendered = render_cart(&cart);
        state.cart = Some(cart);
        return Json(json!({"data": {"cartLinesUpdate": {"cart": rendered, "userErrors": []}}}))
            .into_response();
    }

    if query.contains("cartLinesRemove") {
        let Some(mut cart) = cart_for(&state, &variables) else {
            return unknown_cart_response("cartLinesRemove");
        };
        let line_ids: Vec<String> = variables["lineIds"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
        cart.lines.retain(|l| !line_ids.contains(&l.id));
        let rendered = render_cart(&cart);
        state.cart = Some(cart);
        return Json(json!({"data": {"cartLinesRemove": {"cart": rendered, "userErrors": []}}}))
            .into_response();
    }

    if query.contains("query GetCart") {
        let rendered = cart_for(&state, &variables).map(|cart| render_cart(&cart));
        return Json(json!({"data": {"cart": rendered}})).into_response();
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({"errors": [{"message": "unknown operation"}]})),
    )
        .into_response()
}

/// The stored cart, if the request addresses it by the right id.
fn cart_for(state: &MockState, variables: &Value) -> Option<MockCart> {
    let cart_id = variables["cartId"].as_str()?;
    state.cart.clone().filter(|cart| cart.id == cart_id)
}

fn unknown_cart_response(operation: &str) -> Response {
    Json(json!({"data": {(operation): {
        "cart": null,
        "userErrors": [{"field": ["cartId"], "message": "cart does not exist"}],
    }}}))
    .into_response()
}

/// Render the cart in Storefront API wire shape.
///
/// Tax is rendered as null, matching a cart Shopify has not priced yet.
fn render_cart(cart: &MockCart) -> Value {
    let total_quantity: i64 = cart.lines.iter().map(|l| l.quantity).sum();
    let total_amount: i64 = cart.lines.iter().map(|l| l.quantity * VARIANT_PRICE).sum();

    json!({
        "id": cart.id,
        "checkoutUrl": format!("https://copihue-books.myshopify.com/checkout/{}", cart.id),
        "totalQuantity": total_quantity,
        "cost": {
            "subtotalAmount": {"amount": total_amount.to_string(), "currencyCode": "CLP"},
            "totalAmount": {"amount": total_amount.to_string(), "currencyCode": "CLP"},
            "totalTaxAmount": null,
        },
        "lines": {"edges": cart.lines.iter().map(|line| json!({"node": {
            "id": line.id,
            "quantity": line.quantity,
            "cost": {"totalAmount": {
                "amount": (line.quantity * VARIANT_PRICE).to_string(),
                "currencyCode": "CLP",
            }},
            "merchandise": {
                "id": line.merchandise_id,
                "title": "Tapa blanda",
                "selectedOptions": [],
                "product": {
                    "id": "gid://shopify/Product/1",
                    "handle": "el-libro-mock",
                    "title": "El libro mock",
                    "featuredImage": null,
                },
            },
        }})).collect::<Vec<_>>()},
    })
}
