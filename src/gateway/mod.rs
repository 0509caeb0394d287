// Local HTTP gateway over a provisioned TenantStack.
//
// Every (path, method) in the route tree becomes an axum route. Gated methods go
// through the authorizer and API key check before the binding's invoker runs.

pub mod concierge;
pub mod invoker;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, MethodFilter, MethodRouter},
    Router,
};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::compute::BindingId;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::middleware::{enforce_gate, ApiResponse, ApiResult, Authorizer};
use crate::provision::{ProvisionError, TenantStack};
use crate::routes::tree::is_parameter_segment;
use crate::routes::MethodOptions;
use crate::types::HttpMethod;

pub use concierge::{ConciergeBackend, ConciergeInvoker, ConciergeReply, ConciergeRequest, EchoBackend, Envelope};
pub use invoker::{EchoInvoker, Invocation, InvocationResponse, InvokeError, Invoker, InvokerRegistry};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Route {0} has more than one parameter child")]
    AmbiguousParameter(String),
}

#[derive(Debug, Clone, Default)]
pub struct GatewayOptions {
    pub api_keys: BTreeSet<String>,
    pub enable_cors: bool,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
    pub enable_request_logging: bool,
}

impl GatewayOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_keys: config.security.api_keys.iter().cloned().collect(),
            enable_cors: config.security.enable_cors,
            cors_origins: config.security.cors_origins.clone(),
            enable_request_logging: config.gateway.enable_request_logging,
        }
    }
}

#[derive(Clone)]
pub struct GatewayState {
    stack: Arc<TenantStack>,
    authorizer: Arc<dyn Authorizer>,
    invokers: InvokerRegistry,
    api_keys: Arc<BTreeSet<String>>,
    fingerprint: Arc<str>,
}

#[derive(Debug)]
struct RouteTarget {
    method: HttpMethod,
    resource: String,
    binding: BindingId,
    options: MethodOptions,
}

/// Build the gateway router for a provisioned stack
pub fn router(
    stack: Arc<TenantStack>,
    options: GatewayOptions,
    authorizer: Arc<dyn Authorizer>,
    invokers: InvokerRegistry,
) -> Result<Router, GatewayError> {
    let fingerprint: Arc<str> = stack.fingerprint()?.into();
    let tree = &stack.routes;

    let mut app: Router<GatewayState> = Router::new();

    for id in tree.walk() {
        let node = tree.node(id)?;
        let resource = tree.path(id);

        let parameter_children = node
            .children
            .iter()
            .filter_map(|child| tree.node(*child).ok())
            .filter(|child| child.is_parameter())
            .count();
        if parameter_children > 1 {
            return Err(GatewayError::AmbiguousParameter(resource));
        }

        if node.methods.is_empty() {
            continue;
        }

        let mut method_router: MethodRouter<GatewayState> = MethodRouter::new();
        for (method, bound) in &node.methods {
            let target = Arc::new(RouteTarget {
                method: *method,
                resource: resource.clone(),
                binding: bound.binding.clone(),
                options: bound.options,
            });

            method_router = method_router.on(
                method_filter(*method),
                move |State(state): State<GatewayState>,
                      params: Option<Path<HashMap<String, String>>>,
                      uri: Uri,
                      headers: HeaderMap,
                      body: Bytes| async move {
                    let params = params.map(|Path(p)| p).unwrap_or_default();
                    dispatch(state, &target, params, uri, headers, body).await
                },
            );
        }

        tracing::debug!("Mounted {} ({} methods)", resource, node.methods.len());
        app = app.route(&axum_path(&resource), method_router);
    }

    if tree.node(tree.root())?.methods.is_empty() {
        app = app.route("/", get(describe));
    }
    if tree.lookup("health").is_none() {
        app = app.route("/health", get(health));
    }

    let state = GatewayState {
        stack,
        authorizer,
        invokers,
        api_keys: Arc::new(options.api_keys.clone()),
        fingerprint,
    };

    let mut app = app.with_state(state);

    if options.enable_cors {
        app = app.layer(cors_layer(&options.cors_origins));
    }
    if options.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    Ok(app)
}

/// Invokers for running a stack locally: the concierge binding talks to the echo
/// backend and every other binding reflects its invocation.
pub fn local_invokers(stack: &TenantStack) -> InvokerRegistry {
    InvokerRegistry::new()
        .register(
            stack.ai_concierge.binding.id.clone(),
            Arc::new(ConciergeInvoker::new(EchoBackend)),
        )
        .with_fallback(Arc::new(EchoInvoker))
}

/// `/products/{id}` becomes `/products/:id`
pub fn axum_path(resource: &str) -> String {
    resource
        .split('/')
        .map(|segment| {
            if is_parameter_segment(segment) {
                format!(":{}", &segment[1..segment.len() - 1])
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn dispatch(
    state: GatewayState,
    target: &RouteTarget,
    params: HashMap<String, String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let principal = enforce_gate(
        &target.options,
        &target.resource,
        &headers,
        state.authorizer.as_ref(),
        &state.api_keys,
    )
    .await?;

    let binding = state
        .stack
        .binding(&target.binding)
        .ok_or_else(|| InvokeError::UnknownBinding(target.binding.to_string()))?;
    let invoker = state.invokers.resolve(&binding.id)?;

    let invocation = Invocation {
        method: target.method,
        resource: target.resource.clone(),
        path: uri.path().to_string(),
        path_parameters: params.into_iter().collect(),
        body: parse_body(&body)?,
        principal,
    };

    let response = invoker.invoke(binding, invocation).await?;
    let status = StatusCode::from_u16(response.status_code).map_err(|_| {
        ApiError::bad_gateway(format!("Binding returned invalid status {}", response.status_code))
    })?;

    Ok((status, Json(response.body)).into_response())
}

fn parse_body(body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))
}

async fn describe(State(state): State<GatewayState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Tenant Provisioner",
        "version": env!("CARGO_PKG_VERSION"),
        "tenantId": state.stack.tenant_id,
        "endpoints": state.stack.routes.endpoints(),
    })))
}

async fn health(State(state): State<GatewayState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "tenantId": state.stack.tenant_id,
        "fingerprint": &*state.fingerprint,
        "routes": state.stack.routes.route_count(),
        "methods": state.stack.routes.method_count(),
    })))
}
