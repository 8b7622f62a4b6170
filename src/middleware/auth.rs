// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{common::error::AppError, config::AppState, models::auth::SessionIdentity};

// Nome do cookie de sessão.
pub const SESSION_COOKIE: &str = "sid";

// O middleware em si: resolve o cookie de sessão e injeta a identidade
// nos "extensions" da requisição. Sem cookie ou com token desconhecido,
// a requisição morre aqui com 401.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let identity = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| app_state.auth_service.resolve_session(cookie.value()))
        .ok_or(AppError::NaoAutenticado)?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// Guarda secundária para rotas exclusivas de admin. Assume que o
// auth_guard já rodou (roda por cima dele na pilha de layers).
pub async fn admin_guard(
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<SessionIdentity>()
        .ok_or(AppError::NaoAutenticado)?;

    if !identity.role.is_admin() {
        return Err(AppError::AcessoNegado);
    }
    Ok(next.run(request).await)
}

// Extrator para obter a identidade autenticada diretamente nos handlers
pub struct AuthenticatedUser(pub SessionIdentity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionIdentity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::NaoAutenticado)
    }
}
