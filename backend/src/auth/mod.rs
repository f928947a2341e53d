use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use crates::domain::value_objects::consultations::PatientIdentity;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::config_model::Identity;
use crate::usecases::errors::ConsultationError;

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub exp: usize,
}

/// Verified caller. `uid` is the identity provider's opaque user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AuthUser {
    pub fn to_patient(&self) -> PatientIdentity {
        PatientIdentity {
            id: self.uid.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

pub fn validate_identity_token(token: &str, identity: &Identity) -> anyhow::Result<IdentityClaims> {
    let decoding_key = DecodingKey::from_secret(identity.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    match identity.audience.as_deref() {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let token_data = decode::<IdentityClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    if token_data.claims.sub.trim().is_empty() {
        anyhow::bail!("token subject is empty");
    }

    Ok(token_data.claims)
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(axum::http::header::AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

// Browsers cannot set headers on a WebSocket handshake.
fn query_token(parts: &Parts) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri).ok()?;
    params.get("token").cloned().filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ConsultationError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Arc<Identity>>()
            .cloned()
            .ok_or_else(|| {
                error!("auth: identity settings missing from request extensions");
                ConsultationError::Internal(anyhow::anyhow!("identity settings not installed"))
            })?;

        let token = bearer_token(parts)
            .or_else(|| query_token(parts))
            .ok_or_else(|| {
                warn!(path = %parts.uri.path(), "auth: missing bearer token");
                ConsultationError::AuthInvalid
            })?;

        let claims = validate_identity_token(&token, &identity).map_err(|err| {
            warn!(path = %parts.uri.path(), error = %err, "auth: token rejected");
            ConsultationError::AuthInvalid
        })?;

        Ok(AuthUser {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}
