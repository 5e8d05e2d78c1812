//! Tally Web Server
//!
//! Axum-based REST API for the Tally personal finance tracker.
//!
//! Security features:
//! - Authentication by proxy header or API key (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Input validation (pagination limits, filter parsing)
//! - Audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use tally_core::db::Database;

mod handlers;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header set by an authenticating proxy (Cloudflare Access) with the user's email
const ACCESS_USER_HEADER: &str = "cf-access-authenticated-user-email";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Identity used for every request when authentication is disabled
pub const LOCAL_DEV_EMAIL: &str = "local-dev@localhost";

/// Environment variable holding `email=key` API key pairs
pub const API_KEYS_ENV: &str = "TALLY_API_KEYS";

/// Environment variable holding allowed CORS origins
pub const ALLOWED_ORIGINS_ENV: &str = "TALLY_ALLOWED_ORIGINS";

/// A bearer key and the user it authenticates as
#[derive(Clone)]
pub struct ApiKey {
    pub email: String,
    pub key: String,
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("email", &self.email)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys for bearer-token access
    /// Format: "Bearer <key>" in Authorization header
    pub api_keys: Vec<ApiKey>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

impl ServerConfig {
    /// Build a config from `TALLY_API_KEYS` and `TALLY_ALLOWED_ORIGINS`
    pub fn from_env(require_auth: bool) -> Self {
        let api_keys = std::env::var(API_KEYS_ENV)
            .map(|s| parse_api_keys(&s))
            .unwrap_or_default();
        let allowed_origins = std::env::var(ALLOWED_ORIGINS_ENV)
            .map(|s| parse_list(&s))
            .unwrap_or_default();

        Self {
            require_auth,
            allowed_origins,
            api_keys,
        }
    }
}

/// Split a comma-separated list, dropping blanks
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse comma-separated `email=key` pairs
///
/// Malformed entries are skipped with a warning.
pub fn parse_api_keys(input: &str) -> Vec<ApiKey> {
    parse_list(input)
        .into_iter()
        .filter_map(|entry| match entry.split_once('=') {
            Some((email, key)) if !email.trim().is_empty() && !key.trim().is_empty() => {
                Some(ApiKey {
                    email: email.trim().to_string(),
                    key: key.trim().to_string(),
                })
            }
            _ => {
                warn!("Ignoring malformed API key entry (expected email=key)");
                None
            }
        })
        .collect()
}

/// How a caller was authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    AccessHeader,
    ApiKey,
    None,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessHeader => "access_header",
            Self::ApiKey => "api_key",
            Self::None => "none",
        }
    }
}

/// Caller identity resolved by the auth middleware, stored in request extensions
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
    pub method: AuthMethod,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// Authentication middleware - resolves the caller from the proxy header or an API key
///
/// # Security Notes
///
/// **Proxy header**: The `Cf-Access-Authenticated-User-Email` header is trusted as-is.
/// This is safe behind an authenticating tunnel (which strips/rewrites the header), but
/// can be spoofed if the server is exposed directly to the internet.
///
/// **API keys**: Compared using constant-time comparison to prevent timing attacks.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_identity(request.headers(), &state.config) {
        Some(identity) => {
            if identity.method != AuthMethod::None {
                info!(
                    user = %identity.email,
                    method = identity.method.as_str(),
                    path = %request.uri().path(),
                    "Authenticated request"
                );
            }
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        None => {
            warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Authentication required"
                })),
            )
                .into_response()
        }
    }
}

/// Resolve the caller identity for a request, or `None` if unauthenticated
pub fn resolve_identity(headers: &axum::http::HeaderMap, config: &ServerConfig) -> Option<Identity> {
    if !config.require_auth {
        return Some(Identity {
            email: LOCAL_DEV_EMAIL.to_string(),
            method: AuthMethod::None,
        });
    }

    let access_user = headers
        .get(ACCESS_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    if let Some(email) = access_user {
        return Some(Identity {
            email: email.to_string(),
            method: AuthMethod::AccessHeader,
        });
    }

    headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .and_then(|key| validate_api_key(key.trim(), &config.api_keys))
        .map(|email| Identity {
            email: email.to_string(),
            method: AuthMethod::ApiKey,
        })
}

/// Find the user an API key belongs to, using constant-time comparison
/// to prevent timing attacks.
fn validate_api_key<'a>(provided: &str, valid_keys: &'a [ApiKey]) -> Option<&'a str> {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    let mut matched = None;
    for entry in valid_keys {
        let key_bytes = entry.key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        if provided_bytes.len() == key_bytes.len()
            && bool::from(provided_bytes.ct_eq(key_bytes))
            && matched.is_none()
        {
            matched = Some(entry.email.as_str());
        }
    }
    matched
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    let api_routes = Router::new()
        // Auth
        .route("/me", get(handlers::get_me))
        // Reports
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/analytics", get(handlers::get_analytics))
        // Catalog
        .route("/categories", get(handlers::list_categories))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        );

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // CSP: restrict scripts to same-origin, allow inline styles, allow data: images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the frontend bundle if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        info!(
            "No API keys configured (set {}); only proxy-authenticated requests will be accepted",
            API_KEYS_ENV
        );
    }

    // Categories are seeded at startup so a fresh database is usable
    let seeded = db.seed_default_categories()?;
    if seeded.created > 0 {
        info!("Seeded {} default categories", seeded.created);
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Client-facing core errors keep their message
        match err.downcast_ref::<tally_core::Error>() {
            Some(tally_core::Error::InvalidData(msg)) => return Self::bad_request(msg),
            Some(tally_core::Error::NotFound(msg)) => return Self::not_found(msg),
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
