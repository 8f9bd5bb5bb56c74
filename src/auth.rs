use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    authz::RoleSet, config::AppConfig, error::ApiError, models::RoleName,
    repository::RepositoryState,
};

/// Claims
///
/// The payload carried inside an access token. The subject is the user's
/// login and `roles` is a snapshot of the role names held at issuance time.
/// Tokens carry no expiry claim; revocation happens through the ban flag at
/// login and through user deletion, both checked against the store.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's login.
    pub sub: String,
    /// Lowercase role-name literals valid at issuance time.
    pub roles: Vec<String>,
}

/// Signs a token for the given login and role set. Pure given the secret.
pub fn issue_token(login: &str, roles: &[RoleName], secret: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: login.to_string(),
        roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token encoding failed: {:?}", e);
        ApiError::Internal
    })
}

/// Verifies signature and shape, returning the embedded claims. Pure decode;
/// the caller re-resolves the full user record by login when entity data
/// (id, ban flag) is needed.
pub fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    // Tokens carry no exp claim, so expiry is neither required nor checked.
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}

/// Identity
///
/// The resolved identity of an authenticated request: the user's id and
/// login from the store, plus the role snapshot from the token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub login: String,
    pub roles: RoleSet,
}

/// Principal
///
/// Who is making the request. Read paths accept `Anonymous`; every
/// authorization check pattern-matches this explicitly instead of threading
/// a nullable user through the handlers.
#[derive(Debug, Clone)]
pub enum Principal {
    Anonymous,
    Authenticated(Identity),
}

impl Principal {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(ident) => Some(ident),
        }
    }
}

/// Principal Extractor
///
/// Resolves the request's principal from the Authorization header:
/// - no header at all: `Principal::Anonymous` (read paths allow this);
/// - malformed header or undecodable token: 401;
/// - valid token: the user is re-resolved by login from the store, which
///   rejects tokens for users deleted after issuance.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        else {
            return Ok(Principal::Anonymous);
        };

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthenticated("malformed authorization header".to_string())
        })?;

        let config = AppConfig::from_ref(state);
        let claims = decode_token(token, &config.jwt_secret).ok_or_else(|| {
            ApiError::Unauthenticated("could not validate credentials".to_string())
        })?;

        let repo = RepositoryState::from_ref(state);
        let user = repo
            .find_user_by_login(&claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| {
                ApiError::Unauthenticated("could not validate credentials".to_string())
            })?;

        Ok(Principal::Authenticated(Identity {
            user_id: user.id,
            login: user.login,
            roles: RoleSet::from_names(claims.roles.iter().map(String::as_str)),
        }))
    }
}

/// Identity Extractor
///
/// Same resolution as `Principal`, but anonymous requests are rejected.
/// Used by every handler on the protected route tiers.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Principal::from_request_parts(parts, state).await? {
            Principal::Authenticated(ident) => Ok(ident),
            Principal::Anonymous => Err(ApiError::Unauthenticated(
                "authentication required".to_string(),
            )),
        }
    }
}
