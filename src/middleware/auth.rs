// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication.
//!
//! Every request passes through [`authenticate`], which resolves the bearer
//! token (if any) into an [`AuthOutcome`] and stores it in the request
//! extensions. Routes then declare which outcomes they accept through an
//! [`AccessPolicy`]: protected routes go through [`require_auth`] (or take an
//! [`AuthUser`] argument), public routes take a [`MaybeUser`].
//!
//! A token is only honored while its subject exists and is not soft-deleted,
//! so each authenticated request costs one user lookup.

use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which kind of session token a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Email at the time the token was issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    pub typ: TokenType,
}

/// Access/refresh token pair handed to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Create a signed token for `user_id`.
pub fn create_token(
    user_id: i64,
    email: Option<&str>,
    typ: TokenType,
    ttl_secs: i64,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        iat: now,
        exp: now + ttl_secs.max(0) as usize,
        typ,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Issue a fresh access/refresh pair for a user.
pub fn issue_token_pair(user: &User, config: &Config) -> Result<TokenPair, AppError> {
    let email = user.email.as_deref();
    let access_token = create_token(
        user.id,
        email,
        TokenType::Access,
        config.access_token_ttl_secs,
        &config.jwt_secret,
    )?;
    let refresh_token = create_token(
        user.id,
        email,
        TokenType::Refresh,
        config.refresh_token_ttl_secs,
        &config.jwt_secret,
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Verify signature, expiry and token type. Returns `None` on any failure.
pub fn decode_token(token: &str, signing_key: &[u8], expected: TokenType) -> Option<Claims> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(token, &key, &validation).ok()?;
    (data.claims.typ == expected).then_some(data.claims)
}

// ─── Request Authentication ─────────────────────────────────────

/// Normalized caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub email: Option<String>,
}

/// Why a presented token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// `Authorization` header present but not a bearer token
    MalformedHeader,
    /// Bad signature, expired, or wrong token type
    InvalidToken,
    /// Subject does not exist or is soft-deleted
    UnknownUser,
}

/// Result of examining a request's credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Identity),
    Anonymous,
    Rejected(RejectReason),
}

/// Which outcomes a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Only `Authenticated` passes.
    Protected,
    /// Everything passes; rejected credentials are treated as anonymous.
    Public,
}

impl AccessPolicy {
    /// Apply the policy, yielding the identity (if any) the handler sees.
    pub fn admit(self, outcome: &AuthOutcome) -> Result<Option<Identity>, AppError> {
        match (self, outcome) {
            (_, AuthOutcome::Authenticated(identity)) => Ok(Some(identity.clone())),
            (AccessPolicy::Public, _) => Ok(None),
            (AccessPolicy::Protected, AuthOutcome::Anonymous) => Err(AppError::Unauthorized),
            (AccessPolicy::Protected, AuthOutcome::Rejected(reason)) => {
                tracing::debug!(?reason, "Rejected credentials on protected route");
                Err(AppError::InvalidToken)
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, RejectReason> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| RejectReason::MalformedHeader)?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(RejectReason::MalformedHeader),
    }
}

/// Resolve request headers into an [`AuthOutcome`].
pub async fn resolve_outcome(state: &AppState, headers: &HeaderMap) -> Result<AuthOutcome, AppError> {
    let token = match bearer_token(headers) {
        Ok(Some(token)) => token,
        Ok(None) => return Ok(AuthOutcome::Anonymous),
        Err(reason) => return Ok(AuthOutcome::Rejected(reason)),
    };

    let Some(claims) = decode_token(token, &state.config.jwt_secret, TokenType::Access) else {
        return Ok(AuthOutcome::Rejected(RejectReason::InvalidToken));
    };

    let Ok(user_id) = claims.sub.parse::<i64>() else {
        return Ok(AuthOutcome::Rejected(RejectReason::InvalidToken));
    };

    match state.db.get_active_user(user_id).await? {
        Some(user) => Ok(AuthOutcome::Authenticated(Identity {
            user_id: user.id,
            email: user.email,
        })),
        None => Ok(AuthOutcome::Rejected(RejectReason::UnknownUser)),
    }
}

/// Middleware that records the [`AuthOutcome`] for every request.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let outcome = resolve_outcome(&state, request.headers()).await?;
    request.extensions_mut().insert(outcome);
    Ok(next.run(request).await)
}

/// Middleware that requires an authenticated caller.
pub async fn require_auth(request: Request, next: Next) -> Result<Response, AppError> {
    let outcome = request
        .extensions()
        .get::<AuthOutcome>()
        .cloned()
        .unwrap_or(AuthOutcome::Anonymous);

    AccessPolicy::Protected.admit(&outcome)?;
    Ok(next.run(request).await)
}

fn outcome_from_parts(parts: &Parts) -> AuthOutcome {
    parts
        .extensions
        .get::<AuthOutcome>()
        .cloned()
        .unwrap_or(AuthOutcome::Anonymous)
}

/// Authenticated caller, for protected handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: Option<String>,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = AccessPolicy::Protected
            .admit(&outcome_from_parts(parts))?
            .ok_or(AppError::Unauthorized)?;
        Ok(Self {
            user_id: identity.user_id,
            email: identity.email,
        })
    }
}

/// Optional caller, for public handlers.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Identity>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|i| i.user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(AccessPolicy::Public.admit(&outcome_from_parts(parts))?))
    }
}
