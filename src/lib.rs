// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::middleware::auth::{admin_guard, auth_guard};

/// Monta o router completo da aplicação. Fica na lib (e não no main)
/// para os testes de integração dirigirem o app em processo.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas protegidas por sessão
    let session_routes = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        .route(
            "/sales",
            get(handlers::sales::list_sales).post(handlers::sales::create_sale),
        )
        .route("/sales/preview", post(handlers::sales::preview_sale))
        .route(
            "/sales/{id}",
            put(handlers::sales::update_sale).delete(handlers::sales::delete_sale),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas exclusivas de admin (auth primeiro, depois o papel)
    let admin_routes = Router::new()
        .route("/users", get(handlers::auth::list_users))
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal; o painel estático fica no
    // fallback, então /api sempre ganha.
    Router::new()
        .route("/api/login", post(handlers::auth::login))
        .nest("/api", session_routes)
        .nest("/api", admin_routes)
        .fallback_service(ServeDir::new("public"))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
