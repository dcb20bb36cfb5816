use crate::domain::capabilities::Capabilities;
use crate::domain::models::{UserProfile, UserRole};
use crate::error::{PortalError, PortalResult};
use crate::events::AuthEvent;
use crate::state::SharedState;
use crate::web::session::{self, Session};
use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub role: UserRole,
    pub full_name: String,
    pub token: String,
}

#[derive(Serialize)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub role: Option<UserRole>,
    pub profile: Option<UserProfile>,
    pub capabilities: Capabilities,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .with_state(state)
}

fn cookie_headers(cookie: String) -> PortalResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| PortalError::Store(anyhow::anyhow!("bad cookie header: {}", e)))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

async fn login(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> PortalResult<impl IntoResponse> {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    if !state.login_limiter.check(&ip).await {
        tracing::warn!("Login rate limit exceeded for IP: {}", ip);
        return Err(PortalError::RateLimited);
    }

    let email = payload.email.trim().to_lowercase();
    let profile = state
        .store
        .find_profile_by_email(&email)
        .await?
        .ok_or(PortalError::BadCredentials)?;

    let parsed_hash =
        PasswordHash::new(&profile.password_hash).map_err(|_| PortalError::BadCredentials)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| PortalError::BadCredentials)?;

    let token = session::sign_session(profile.id, &state.session_key)
        .map_err(|e| PortalError::Store(anyhow::anyhow!("failed to sign session: {}", e)))?;
    let headers = cookie_headers(session::session_cookie(&token, state.secure_cookies))?;

    state
        .auth_events
        .publish(AuthEvent::SignedIn { user_id: profile.id });
    tracing::info!("User {} signed in", profile.id);

    Ok((
        headers,
        Json(LoginResponse {
            user_id: profile.id,
            role: profile.role,
            full_name: profile.full_name,
            token,
        }),
    ))
}

async fn logout(
    session: Option<Session>,
    State(state): State<SharedState>,
) -> PortalResult<impl IntoResponse> {
    if let Some(Session(ctx)) = session {
        state
            .auth_events
            .publish(AuthEvent::SignedOut { user_id: ctx.user_id });
        tracing::info!("User {} signed out", ctx.user_id);
    }
    let headers = cookie_headers(session::cleared_cookie(state.secure_cookies))?;
    Ok((StatusCode::NO_CONTENT, headers))
}

async fn refresh(
    Session(ctx): Session,
    State(state): State<SharedState>,
) -> PortalResult<impl IntoResponse> {
    let token = session::sign_session(ctx.user_id, &state.session_key)
        .map_err(|e| PortalError::Store(anyhow::anyhow!("failed to sign session: {}", e)))?;
    let headers = cookie_headers(session::session_cookie(&token, state.secure_cookies))?;
    state
        .auth_events
        .publish(AuthEvent::TokenRefreshed { user_id: ctx.user_id });

    Ok((headers, Json(serde_json::json!({ "token": token }))))
}

async fn me(Session(ctx): Session) -> Json<CurrentUser> {
    Json(CurrentUser {
        user_id: ctx.user_id,
        role: ctx.role(),
        capabilities: ctx.capabilities,
        profile: ctx.profile,
    })
}
