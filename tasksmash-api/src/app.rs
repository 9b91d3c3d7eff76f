/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasksmash_api::{app::AppState, config::Config};
/// use tasksmash_shared::mail::LogMailer;
/// use tasksmash_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(LogMailer), config);
/// let app = tasksmash_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tasksmash_shared::auth::middleware::authenticate;
use tasksmash_shared::mail::MailSender;
use tasksmash_shared::services::Services;
use tasksmash_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// Domain services over `store`
    pub services: Services,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn MailSender>, config: Config) -> Self {
        let services = Services::new(
            store.clone(),
            mailer,
            config.token_settings(),
            config.api.public_base_url.clone(),
        );

        Self {
            store,
            services,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── GET|POST /reset_password/:token   # Mailed reset link (public)
/// └── /v1/
///     ├── /auth/                       # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /password-reset
///     │   └── GET|POST /password-reset/:token
///     └── (session gate)
///         ├── GET /me, PUT /me/password
///         ├── GET /dashboard
///         ├── GET|POST /tasks, GET|PUT|DELETE /tasks/:id
///         ├── GET|POST /tasks/:id/comments
///         ├── GET /comments/:id/replies
///         ├── GET /follows, GET /followers
///         └── POST|DELETE /follows/:account_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Session gate (protected routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Path of the link in reset mails
    let reset_link_routes = Router::new().route(
        "/reset_password/:token",
        get(routes::password_reset::verify_reset).post(routes::password_reset::confirm_reset),
    );

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/password-reset", post(routes::password_reset::request_reset))
        .route(
            "/password-reset/:token",
            get(routes::password_reset::verify_reset).post(routes::password_reset::confirm_reset),
        );

    // Everything else requires a session
    let protected_routes = Router::new()
        .route("/me", get(routes::me::current_account))
        .route("/me/password", put(routes::me::change_password))
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/tasks/:id/comments",
            get(routes::comments::list_comments).post(routes::comments::add_comment),
        )
        .route("/comments/:id/replies", get(routes::comments::list_replies))
        .route("/follows", get(routes::follows::list_following))
        .route("/followers", get(routes::follows::list_followers))
        .route(
            "/follows/:account_id",
            post(routes::follows::follow).delete(routes::follows::unfollow),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_gate,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .merge(reset_link_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// Session gate
///
/// Validates the bearer session token and injects [`AuthContext`] into
/// request extensions. Handlers read the acting account from there.
///
/// [`AuthContext`]: tasksmash_shared::auth::middleware::AuthContext
async fn session_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(path = %req.uri().path(), error = ?e, "Session rejected");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
