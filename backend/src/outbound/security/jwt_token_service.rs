//! HS256 JSON Web Token adapter for the `TokenService` port.
//!
//! Timestamps come from an injected [`Clock`]; expiry is checked against that
//! clock rather than the system time so tests can move time forward.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{AccessToken, TokenError, TokenService};
use crate::domain::{AuthenticatedUser, Role, User, UserId, Username};

use super::TokenSettings;

/// Claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Claims {
    user_id: String,
    username: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies HS256 bearer tokens.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Create a service from validated settings and a clock.
    pub fn new(settings: &TokenSettings, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(settings.secret()),
            decoding: DecodingKey::from_secret(settings.secret()),
            validation,
            ttl_secs: i64::try_from(settings.ttl().as_secs()).unwrap_or(i64::MAX),
            clock,
        }
    }

    fn claims_to_identity(claims: Claims) -> Result<AuthenticatedUser, TokenError> {
        let user_id = UserId::new(&claims.user_id)
            .map_err(|err| TokenError::invalid(format!("user_id: {err}")))?;
        let username = Username::new(&claims.username)
            .map_err(|err| TokenError::invalid(format!("username: {err}")))?;
        let role: Role = claims
            .role
            .parse()
            .map_err(|err| TokenError::invalid(format!("role: {err}")))?;
        Ok(AuthenticatedUser {
            user_id,
            username,
            role,
        })
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<AccessToken, TokenError> {
        let iat = self.clock.utc().timestamp();
        let claims = Claims {
            user_id: user.id().to_string(),
            username: user.username().to_string(),
            role: user.role().as_str().to_owned(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                TokenError::invalid(err.to_string())
            })?;

        let now = self.clock.utc().timestamp();
        if data.claims.exp <= now {
            debug!(exp = data.claims.exp, now, "bearer token expired");
            return Err(TokenError::invalid("token expired"));
        }
        Self::claims_to_identity(data.claims)
    }
}
