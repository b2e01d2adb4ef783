// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth login and session token routes.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::Url;
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use validator::Validate;

use crate::config::{Config, OAuthClientConfig};
use crate::error::{AppError, Result};
use crate::middleware::auth::{decode_token, issue_token_pair, TokenPair, TokenType};
use crate::models::User;
use crate::services::OAuthProvider;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of an OAuth `state` parameter.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/refresh", post(refresh))
        .route("/auth/{provider}", get(auth_start))
        .route("/auth/{provider}/callback", get(auth_callback))
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

fn enabled_client(config: &Config, provider: OAuthProvider) -> Result<&OAuthClientConfig> {
    config
        .oauth_client(provider)
        .ok_or_else(|| AppError::NotFound(format!("Provider '{provider}' is not enabled")))
}

/// Only the configured frontend origin and local development hosts may
/// receive tokens. URLs carrying userinfo are refused outright.
fn is_allowed_frontend(url: &str, config: &Config) -> bool {
    let Ok(candidate) = Url::parse(url) else {
        return false;
    };
    if !candidate.username().is_empty() || candidate.password().is_some() {
        return false;
    }

    let local_dev = candidate.scheme() == "http"
        && matches!(candidate.host_str(), Some("localhost" | "127.0.0.1"));

    local_dev
        || Url::parse(&config.frontend_url)
            .is_ok_and(|frontend| frontend.origin() == candidate.origin())
}

// ─── Signed State ────────────────────────────────────────────

/// Sign `provider|frontend_url|timestamp_hex` and append the hex signature.
pub fn sign_state(
    provider: OAuthProvider,
    frontend_url: &str,
    timestamp_ms: u128,
    key: &[u8],
) -> Result<String> {
    let payload = format!("{}|{}|{:x}", provider, frontend_url, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify a signed state and return its frontend URL.
///
/// Fails on a bad signature, a different provider, or a state older than
/// ten minutes.
pub fn verify_state(
    state: &str,
    provider: OAuthProvider,
    key: &[u8],
    now_ms: u128,
) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // The frontend URL may itself contain '|', so split the fixed fields off the ends.
    let (provider_str, rest) = state_str.split_once('|')?;
    let (rest, signature_hex) = rest.rsplit_once('|')?;
    let (frontend_url, timestamp_hex) = rest.rsplit_once('|')?;

    let payload = format!("{}|{}|{}", provider_str, frontend_url, timestamp_hex);
    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(payload.as_bytes());
    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    if provider_str != provider.as_str() {
        tracing::warn!(expected = %provider, got = provider_str, "OAuth state provider mismatch");
        return None;
    }

    let issued_ms = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(issued_ms) > STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(frontend_url.to_string())
}

// ─── Login Flow ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Frontend URL to return to after login (defaults to FRONTEND_URL).
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Start OAuth flow - redirect to the provider's authorization page.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(params): Query<AuthStartParams>,
) -> Result<Redirect> {
    let provider: OAuthProvider = provider.parse()?;
    let client = enabled_client(&state.config, provider)?;

    let frontend_url = params
        .redirect_uri
        .filter(|url| is_allowed_frontend(url, &state.config))
        .unwrap_or_else(|| state.config.frontend_url.clone());

    let oauth_state = sign_state(
        provider,
        &frontend_url,
        now_millis()?,
        &state.config.oauth_state_key,
    )?;
    let auth_url = state.oauth.authorize_url(provider, client, &oauth_state);

    tracing::info!(
        provider = %provider,
        frontend_url = %frontend_url,
        "Starting OAuth flow"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn error_redirect(frontend_url: &str, error: &str) -> Redirect {
    Redirect::temporary(&format!(
        "{}/auth/callback?error={}",
        frontend_url,
        urlencoding::encode(error)
    ))
}

/// OAuth callback - exchange the code, upsert the user, hand out tokens.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let provider: OAuthProvider = provider.parse()?;
    let client = enabled_client(&state.config, provider)?;

    let now = now_millis()?;
    let frontend_url = params
        .state
        .as_deref()
        .and_then(|s| verify_state(s, provider, &state.config.oauth_state_key, now))
        .unwrap_or_else(|| {
            tracing::warn!("Invalid or expired state parameter, falling back to default frontend URL");
            state.config.frontend_url.clone()
        });

    if let Some(error) = params.error {
        tracing::warn!(provider = %provider, error = %error, "OAuth error from provider");
        return Ok(error_redirect(&frontend_url, &error));
    }

    let Some(code) = params.code else {
        return Ok(error_redirect(&frontend_url, "missing_code"));
    };

    match complete_login(&state, provider, client, &code, params.state.as_deref()).await {
        Ok(tokens) => Ok(Redirect::temporary(&format!(
            "{}/auth/callback?accessToken={}&refreshToken={}",
            frontend_url,
            urlencoding::encode(&tokens.access_token),
            urlencoding::encode(&tokens.refresh_token)
        ))),
        Err(LoginError::AccountDeleted) => Ok(error_redirect(&frontend_url, "account_deleted")),
        Err(LoginError::App(e)) => {
            tracing::warn!(provider = %provider, error = %e, "OAuth login failed");
            Ok(error_redirect(&frontend_url, e.code()))
        }
    }
}

enum LoginError {
    AccountDeleted,
    App(AppError),
}

impl From<AppError> for LoginError {
    fn from(e: AppError) -> Self {
        LoginError::App(e)
    }
}

async fn complete_login(
    state: &AppState,
    provider: OAuthProvider,
    client: &OAuthClientConfig,
    code: &str,
    oauth_state: Option<&str>,
) -> std::result::Result<TokenPair, LoginError> {
    let tokens = state
        .oauth
        .exchange_code(provider, client, code, oauth_state.unwrap_or_default())
        .await?;
    let identity = state.oauth.fetch_identity(provider, tokens).await?;

    if let Some(existing) = state
        .db
        .get_user_by_provider(provider.as_str(), &identity.provider_account_id)
        .await?
    {
        if existing.is_deleted() {
            tracing::info!(user_id = existing.id, "Login attempt for deleted account");
            return Err(LoginError::AccountDeleted);
        }
    }

    let user: User = state.db.find_or_create_user(&identity.to_new_user()).await?;
    tracing::info!(user_id = user.id, provider = %provider, "OAuth login successful");

    Ok(issue_token_pair(&user, &state.config)?)
}

// ─── Refresh ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    refresh_token: String,
}

/// Trade a refresh token for a new token pair.
async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    body.validate()?;

    let claims = decode_token(
        &body.refresh_token,
        &state.config.jwt_secret,
        TokenType::Refresh,
    )
    .ok_or(AppError::InvalidToken)?;
    let user_id: i64 = claims.sub.parse().map_err(|_| AppError::InvalidToken)?;

    let user = state
        .db
        .get_active_user(user_id)
        .await?
        .ok_or(AppError::InvalidToken)?;

    Ok(Json(issue_token_pair(&user, &state.config)?))
}
