use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use super::Identity;
use crate::configuration::SessionSettings;
use crate::server::error::ApiError;

pub const SESSION_COOKIE: &str = "session_token";

/// Signing material for the stateless session tokens. Cheap to clone, safe
/// to share through the router state.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub ttl: Duration,
}

impl SessionKeys {
    pub fn new(settings: &SessionSettings) -> Self {
        let secret = settings.secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(settings.token_ttl_hours),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: i64,
    email: String,
    name: String,
    surname: String,
    role: String,
    exp: i64,
}

/// Creates a signed, tamper-evident token embedding the identity.
pub fn issue(keys: &SessionKeys, identity: &Identity) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: identity.id,
        email: identity.email.clone(),
        name: identity.name.clone(),
        surname: identity.surname.clone(),
        role: identity.role.clone(),
        exp: (Utc::now() + keys.ttl).timestamp(),
    };
    encode(&Header::default(), &claims, &keys.encoding)
}

/// Verifies signature and expiry. Any failure (bad signature, expired,
/// malformed) yields `None` — the anonymous identity — never an error.
pub fn resolve(keys: &SessionKeys, token: &str) -> Option<Identity> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::default()).ok()?;
    let claims = data.claims;
    Some(Identity {
        id: claims.sub,
        email: claims.email,
        name: claims.name,
        surname: claims.surname,
        role: claims.role,
    })
}

pub fn session_cookie(token: String, ttl: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// The request's identity, if any. Extraction never fails; a missing or
/// invalid token is simply `None`.
pub struct AuthSession(pub Option<Identity>);

/// Extraction rejects anonymous requests with 401, so protected handlers
/// receive the identity as an explicit argument.
pub struct RequireAuth(pub Identity);

fn identity_from_parts(parts: &Parts, keys: &SessionKeys) -> Option<Identity> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(SESSION_COOKIE)?;
    resolve(keys, cookie.value())
}

impl<S> FromRequestParts<S> for AuthSession
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        Ok(AuthSession(identity_from_parts(parts, &keys)))
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        identity_from_parts(parts, &keys)
            .map(RequireAuth)
            .ok_or(ApiError::Unauthorized)
    }
}
