// src/handlers/auth.rs

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, SESSION_COOKIE},
    models::auth::{LoginPayload, LoginResponse, SessionIdentity, UserPublic},
};

// Handler de login. Credenciais vazias seguem o mesmo caminho de
// qualquer credencial errada: 401, sem vazar qual campo faltou.
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let (identity, token) = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();

    tracing::info!("🔓 Login de {} ({:?})", identity.username, identity.role);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            ok: true,
            role: identity.role,
            name: identity.name,
            username: identity.username,
        }),
    ))
}

// Handler de logout: destrói a sessão e limpa o cookie
pub async fn logout(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        app_state.auth_service.logout(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Ok((jar, Json(json!({ "ok": true }))))
}

#[derive(Serialize)]
pub struct MeResponse {
    ok: bool,
    #[serde(flatten)]
    identity: SessionIdentity,
}

// Handler da rota protegida /me
pub async fn me(AuthenticatedUser(identity): AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse { ok: true, identity })
}

#[derive(Serialize)]
pub struct UsersResponse {
    ok: bool,
    users: Vec<UserPublic>,
}

// Lista de usuários (somente admin), redigida na borda: o modelo
// persistido carrega o hash, a resposta carrega `UserPublic`.
pub async fn list_users(
    State(app_state): State<AppState>,
) -> Result<Json<UsersResponse>, AppError> {
    let users = app_state
        .store
        .list_users()
        .await?
        .into_iter()
        .map(UserPublic::from)
        .collect();
    Ok(Json(UsersResponse { ok: true, users }))
}
