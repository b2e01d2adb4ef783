// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session token tests.
//!
//! These tests pin the claim format handed to clients so that the token
//! issuer and the request guard cannot drift apart.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use runcrew::config::Config;
use runcrew::middleware::auth::{create_token, decode_token, Claims, TokenType};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

/// Wire format clients and other services may rely on.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    exp: usize,
    iat: usize,
    typ: String,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

#[test]
fn test_jwt_wire_format() {
    let token = create_token(42, Some("runner@example.com"), TokenType::Access, 3600, KEY).unwrap();

    let data = decode::<WireClaims>(
        &token,
        &DecodingKey::from_secret(KEY),
        &Validation::new(Algorithm::HS256),
    )
    .expect("Token should decode");

    assert_eq!(data.claims.sub, "42");
    assert_eq!(data.claims.typ, "access");
    assert_eq!(data.claims.exp - data.claims.iat, 3600);
}

#[test]
fn test_expired_token_rejected() {
    let issued = now() - 7200;
    let claims = WireClaims {
        sub: "42".to_string(),
        iat: issued,
        exp: issued + 60,
        typ: "access".to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    assert!(decode_token(&token, KEY, TokenType::Access).is_none());
}

#[test]
fn test_token_without_type_rejected() {
    #[derive(Serialize)]
    struct Untyped {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let token = encode(
        &Header::new(Algorithm::HS256),
        &Untyped {
            sub: "42".to_string(),
            exp: now() + 3600,
            iat: now(),
        },
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    assert!(decode_token(&token, KEY, TokenType::Access).is_none());
}

#[test]
fn test_other_algorithm_rejected() {
    let claims = WireClaims {
        sub: "42".to_string(),
        iat: now(),
        exp: now() + 3600,
        typ: "access".to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    assert!(decode_token(&token, KEY, TokenType::Access).is_none());
}

#[test]
fn test_configured_ttls() {
    let config = Config::test_default();
    let token = create_token(
        7,
        None,
        TokenType::Refresh,
        config.refresh_token_ttl_secs,
        &config.jwt_secret,
    )
    .unwrap();

    let claims: Claims = decode_token(&token, &config.jwt_secret, TokenType::Refresh).unwrap();
    assert_eq!(
        (claims.exp - claims.iat) as i64,
        config.refresh_token_ttl_secs
    );
    assert!(claims.email.is_none());
}
