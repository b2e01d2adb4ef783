// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth login through Google, Kakao and Naver.
//!
//! Handles:
//! - Building the provider authorization URL
//! - Exchanging the callback code for provider tokens
//! - Fetching the provider profile and normalizing it into an [`OAuthIdentity`]

use crate::config::OAuthClientConfig;
use crate::error::AppError;
use crate::models::user::NewUser;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Supported login providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthProvider {
    Google,
    Kakao,
    Naver,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Kakao => "kakao",
            OAuthProvider::Naver => "naver",
        }
    }

    /// Name used when the provider profile has no display name.
    pub fn placeholder_name(&self) -> String {
        let label = match self {
            OAuthProvider::Google => "Google",
            OAuthProvider::Kakao => "Kakao",
            OAuthProvider::Naver => "Naver",
        };
        format!("{label} Runner")
    }

    fn endpoints(&self) -> ProviderEndpoints {
        match self {
            OAuthProvider::Google => ProviderEndpoints {
                authorize: "https://accounts.google.com/o/oauth2/v2/auth",
                token: "https://oauth2.googleapis.com/token",
                profile: "https://openidconnect.googleapis.com/v1/userinfo",
                scope: Some("openid email profile"),
            },
            OAuthProvider::Kakao => ProviderEndpoints {
                authorize: "https://kauth.kakao.com/oauth/authorize",
                token: "https://kauth.kakao.com/oauth/token",
                profile: "https://kapi.kakao.com/v2/user/me",
                scope: Some("profile_nickname profile_image account_email"),
            },
            OAuthProvider::Naver => ProviderEndpoints {
                authorize: "https://nid.naver.com/oauth2.0/authorize",
                token: "https://nid.naver.com/oauth2.0/token",
                profile: "https://openapi.naver.com/v1/nid/me",
                scope: None,
            },
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            "kakao" => Ok(OAuthProvider::Kakao),
            "naver" => Ok(OAuthProvider::Naver),
            other => Err(AppError::NotFound(format!("Unknown provider '{other}'"))),
        }
    }
}

struct ProviderEndpoints {
    authorize: &'static str,
    token: &'static str,
    profile: &'static str,
    scope: Option<&'static str>,
}

/// Provider-independent login identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub provider: OAuthProvider,
    pub provider_account_id: String,
    pub email: Option<String>,
    pub name: String,
    pub profile_image: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl OAuthIdentity {
    /// Values for creating the local account on first login.
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            provider: self.provider.as_str().to_string(),
            provider_account_id: self.provider_account_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            profile_image: self.profile_image.clone(),
        }
    }
}

/// Tokens returned by a provider's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// ─── Provider Profile Shapes ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KakaoProfile {
    pub id: i64,
    #[serde(default)]
    pub kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KakaoAccount {
    pub email: Option<String>,
    pub profile: Option<KakaoProfileDetails>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KakaoProfileDetails {
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NaverEnvelope {
    pub resultcode: String,
    pub message: String,
    pub response: Option<NaverProfile>,
}

#[derive(Debug, Deserialize)]
pub struct NaverProfile {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub profile_image: Option<String>,
}

/// Drop empty strings that providers send instead of omitting a field.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn normalize_google(profile: GoogleProfile, tokens: ProviderTokens) -> OAuthIdentity {
    let provider = OAuthProvider::Google;
    OAuthIdentity {
        provider,
        provider_account_id: profile.sub,
        email: non_empty(profile.email),
        name: non_empty(profile.name).unwrap_or_else(|| provider.placeholder_name()),
        profile_image: non_empty(profile.picture),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }
}

pub fn normalize_kakao(profile: KakaoProfile, tokens: ProviderTokens) -> OAuthIdentity {
    let provider = OAuthProvider::Kakao;
    let account = profile.kakao_account.unwrap_or_default();
    let details = account.profile.unwrap_or_default();
    OAuthIdentity {
        provider,
        provider_account_id: profile.id.to_string(),
        email: non_empty(account.email),
        name: non_empty(details.nickname).unwrap_or_else(|| provider.placeholder_name()),
        profile_image: non_empty(details.profile_image_url),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }
}

pub fn normalize_naver(
    envelope: NaverEnvelope,
    tokens: ProviderTokens,
) -> Result<OAuthIdentity, AppError> {
    let provider = OAuthProvider::Naver;
    let profile = match (envelope.resultcode.as_str(), envelope.response) {
        ("00", Some(profile)) => profile,
        (code, _) => {
            return Err(AppError::OAuthProvider(format!(
                "Naver profile error {code}: {}",
                envelope.message
            )))
        }
    };

    Ok(OAuthIdentity {
        provider,
        provider_account_id: profile.id,
        email: non_empty(profile.email),
        name: non_empty(profile.name)
            .or_else(|| non_empty(profile.nickname))
            .unwrap_or_else(|| provider.placeholder_name()),
        profile_image: non_empty(profile.profile_image),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    })
}

// ─── HTTP Client ────────────────────────────────────────────────

/// OAuth client for all providers.
#[derive(Clone, Default)]
pub struct OAuthService {
    http: reqwest::Client,
}

impl OAuthService {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Provider authorization URL carrying our signed `state`.
    pub fn authorize_url(
        &self,
        provider: OAuthProvider,
        client: &OAuthClientConfig,
        state: &str,
    ) -> String {
        let endpoints = provider.endpoints();
        let mut url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&state={}",
            endpoints.authorize,
            urlencoding::encode(&client.client_id),
            urlencoding::encode(&client.callback_url),
            urlencoding::encode(state)
        );
        if let Some(scope) = endpoints.scope {
            url.push_str("&scope=");
            url.push_str(&urlencoding::encode(scope));
        }
        url
    }

    /// Exchange an authorization code for provider tokens.
    pub async fn exchange_code(
        &self,
        provider: OAuthProvider,
        client: &OAuthClientConfig,
        code: &str,
        state: &str,
    ) -> Result<ProviderTokens, AppError> {
        let response = self
            .http
            .post(provider.endpoints().token)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.as_str()),
                ("redirect_uri", client.callback_url.as_str()),
                ("code", code),
                ("state", state),
            ])
            .send()
            .await
            .map_err(|e| AppError::OAuthProvider(format!("Token request failed: {}", e)))?;

        check_response_json(provider, response).await
    }

    /// Fetch the provider profile and normalize it.
    pub async fn fetch_identity(
        &self,
        provider: OAuthProvider,
        tokens: ProviderTokens,
    ) -> Result<OAuthIdentity, AppError> {
        let response = self
            .http
            .get(provider.endpoints().profile)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| AppError::OAuthProvider(format!("Profile request failed: {}", e)))?;

        match provider {
            OAuthProvider::Google => {
                let profile = check_response_json(provider, response).await?;
                Ok(normalize_google(profile, tokens))
            }
            OAuthProvider::Kakao => {
                let profile = check_response_json(provider, response).await?;
                Ok(normalize_kakao(profile, tokens))
            }
            OAuthProvider::Naver => {
                let envelope = check_response_json(provider, response).await?;
                normalize_naver(envelope, tokens)
            }
        }
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    provider: OAuthProvider,
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::OAuthProvider(format!(
            "{provider} HTTP {status}: {body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::OAuthProvider(format!("{provider} JSON parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> ProviderTokens {
        ProviderTokens {
            access_token: "at".to_string(),
            refresh_token: Some("rt".to_string()),
        }
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("kakao".parse::<OAuthProvider>().unwrap(), OAuthProvider::Kakao);
        assert!(matches!(
            "github".parse::<OAuthProvider>(),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(OAuthProvider::Naver.to_string(), "naver");
    }

    #[test]
    fn test_normalize_google() {
        let profile: GoogleProfile = serde_json::from_value(serde_json::json!({
            "sub": "1093",
            "email": "runner@gmail.com",
            "name": "Kim Runner",
            "picture": "https://lh3.googleusercontent.com/a.png",
            "email_verified": true
        }))
        .unwrap();

        let identity = normalize_google(profile, tokens());
        assert_eq!(identity.provider_account_id, "1093");
        assert_eq!(identity.email.as_deref(), Some("runner@gmail.com"));
        assert_eq!(identity.name, "Kim Runner");
        assert_eq!(identity.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn test_normalize_kakao_without_account() {
        let profile: KakaoProfile =
            serde_json::from_value(serde_json::json!({ "id": 987654321 })).unwrap();

        let identity = normalize_kakao(profile, tokens());
        assert_eq!(identity.provider_account_id, "987654321");
        assert_eq!(identity.email, None);
        assert_eq!(identity.name, "Kakao Runner");
        assert_eq!(identity.profile_image, None);
    }

    #[test]
    fn test_normalize_kakao_full() {
        let profile: KakaoProfile = serde_json::from_value(serde_json::json!({
            "id": 42,
            "kakao_account": {
                "email": "k@kakao.com",
                "profile": { "nickname": "달리기", "profile_image_url": "http://k.kakaocdn.net/p.jpg" }
            }
        }))
        .unwrap();

        let identity = normalize_kakao(profile, tokens());
        assert_eq!(identity.name, "달리기");
        assert_eq!(identity.email.as_deref(), Some("k@kakao.com"));
        assert_eq!(
            identity.profile_image.as_deref(),
            Some("http://k.kakaocdn.net/p.jpg")
        );
    }

    #[test]
    fn test_normalize_naver_prefers_name_then_nickname() {
        let envelope: NaverEnvelope = serde_json::from_value(serde_json::json!({
            "resultcode": "00",
            "message": "success",
            "response": { "id": "nv-1", "nickname": "swift", "name": "" }
        }))
        .unwrap();

        let identity = normalize_naver(envelope, tokens()).unwrap();
        assert_eq!(identity.provider_account_id, "nv-1");
        assert_eq!(identity.name, "swift");
    }

    #[test]
    fn test_normalize_naver_error_envelope() {
        let envelope: NaverEnvelope = serde_json::from_value(serde_json::json!({
            "resultcode": "024",
            "message": "Authentication failed"
        }))
        .unwrap();

        assert!(matches!(
            normalize_naver(envelope, tokens()),
            Err(AppError::OAuthProvider(_))
        ));
    }

    #[test]
    fn test_authorize_url() {
        let client = OAuthClientConfig {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            callback_url: "http://localhost:8080/auth/google/callback".to_string(),
        };

        let url = OAuthService::new().authorize_url(OAuthProvider::Google, &client, "st");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?client_id=cid"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(!url.contains("secret"));
    }
}
