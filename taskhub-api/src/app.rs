/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::from_config(pool, config)?;
/// let app = taskhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::auth::actor::authenticate;
use taskhub_shared::storygen::groq::GroqGenerator;
use taskhub_shared::storygen::{GenerationError, StoryGenerator};
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
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// User story text provider
    pub generator: Arc<dyn StoryGenerator>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, generator: Arc<dyn StoryGenerator>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            generator,
        }
    }

    /// Creates state with the Groq generator described by `config`
    pub fn from_config(db: PgPool, config: Config) -> Result<Self, GenerationError> {
        let generator = GroqGenerator::new(config.groq.to_client_config())?;
        Ok(Self::new(db, config, Arc::new(generator)))
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
/// ├── GET /                         # Banner (public)
/// ├── GET /health                   # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register        # public
///     │   ├── POST /login           # public, form encoded
///     │   └── GET  /me
///     ├── /users/                   # GET list, GET/PUT/DELETE /:id
///     ├── /projects/                # POST, GET list, GET/PUT/DELETE /:id
///     ├── /tasks/                   # POST, GET list, GET /my-tasks,
///     │                             # GET/PUT/DELETE /:id, GET/POST /:id/comments
///     ├── /ai/
///     │   ├── POST /generate-user-stories
///     │   ├── POST /generate-and-save/:project_id
///     │   └── GET  /user-stories/:project_id
///     └── /dashboard/
///         ├── GET /stats
///         ├── GET /project-stats
///         └── GET /project-stats/:project_id
/// ```
///
/// Everything under `/api` except register and login requires a bearer
/// token.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login));

    let auth_routes = Router::new().route("/me", get(routes::auth::me));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        );

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        );

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/my-tasks", get(routes::tasks::my_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/:id/comments",
            get(routes::tasks::list_comments).post(routes::tasks::add_comment),
        );

    let ai_routes = Router::new()
        .route(
            "/generate-user-stories",
            post(routes::ai::generate_user_stories),
        )
        .route(
            "/generate-and-save/:project_id",
            post(routes::ai::generate_and_save_user_stories),
        )
        .route(
            "/user-stories/:project_id",
            get(routes::ai::list_user_stories),
        );

    let dashboard_routes = Router::new()
        .route("/stats", get(routes::dashboard::stats))
        .route("/project-stats", get(routes::dashboard::project_stats))
        .route(
            "/project-stats/:project_id",
            get(routes::dashboard::single_project_stats),
        );

    // Every route below requires a valid bearer token
    let protected_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/ai", ai_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.allows_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
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

    Router::new()
        .merge(public_routes)
        .nest("/api", protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Resolves the bearer token to an [`Actor`](taskhub_shared::auth::actor::Actor)
/// and injects it into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let actor = authenticate(&state.db, authorization, state.jwt_secret()).await?;

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
