// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{article, auth, category, comment, like, tag},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, optional_auth_middleware},
};

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Assembles the main application router.
///
/// * Everything but `/health` lives under `/api/v1`.
/// * Each resource has a public router (optional auth), a protected router
///   (auth required) and, for categories and tags, an admin router.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me).put(auth::update_me))
                .layer(require_auth()),
        );

    let public_routes = Router::new()
        .route("/articles", get(article::list_articles))
        .route("/articles/{id}", get(article::get_article))
        .route("/articles/{id}/comments", get(comment::list_comments))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected_routes = Router::new()
        .route("/articles", post(article::create_article))
        .route(
            "/articles/{id}",
            put(article::update_article).delete(article::delete_article),
        )
        .route("/articles/{id}/comments", post(comment::create_comment))
        .route("/articles/{id}/like", post(like::toggle_article_like))
        .route(
            "/comments/{id}",
            put(comment::update_comment).delete(comment::delete_comment),
        )
        .route("/comments/{id}/like", post(like::toggle_comment_like))
        .layer(require_auth());

    let taxonomy_routes = Router::new()
        .route("/categories", get(category::list_categories))
        .route("/categories/{id}", get(category::get_category))
        .route("/categories/slug/{slug}", get(category::get_category_by_slug))
        .route("/tags", get(tag::list_tags))
        .route("/tags/{id}", get(tag::get_tag))
        .route("/tags/slug/{slug}", get(tag::get_tag_by_slug));

    // Auth first, then the admin check
    let admin_routes = Router::new()
        .route("/categories", post(category::create_category))
        .route(
            "/categories/{id}",
            put(category::update_category).delete(category::delete_category),
        )
        .route("/tags", post(tag::create_tag))
        .route("/tags/{id}", put(tag::update_tag).delete(tag::delete_tag))
        .layer(middleware::from_fn(admin_middleware))
        .layer(require_auth());

    let api = Router::new()
        .nest("/auth", auth_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .merge(taxonomy_routes)
        .merge(admin_routes);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
