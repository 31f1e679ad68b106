//! Bearer token authentication for HTTP handlers.
//!
//! Handlers that need an identity take a [`BearerAuth`] argument; the
//! extractor reads `Authorization: Bearer <token>`, verifies it through the
//! configured [`TokenService`] and yields the embedded identity. Every
//! failure collapses into the same `401` so clients cannot tell which check
//! rejected them; the cause is only logged at debug level.

use actix_web::http::header::{self, HeaderValue};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::{debug, error};

use crate::domain::ports::TokenService;
use crate::domain::{AuthenticatedUser, Error, Role};

use super::state::HttpState;

const BEARER_SCHEME: &str = "Bearer";
const INVALID_TOKEN: &str = "invalid or expired token";

/// Identity of the caller, recovered from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerAuth(AuthenticatedUser);

impl BearerAuth {
    /// Borrow the verified identity.
    pub fn identity(&self) -> &AuthenticatedUser {
        &self.0
    }

    /// Consume the extractor and return the identity.
    pub fn into_inner(self) -> AuthenticatedUser {
        self.0
    }

    /// Require one of `allowed` or fail with `403 Forbidden`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<&AuthenticatedUser, Error> {
        self.0.require_role(allowed).inspect_err(|_| {
            debug!(user_id = %self.0.user_id, role = %self.0.role, "role check failed");
        })?;
        Ok(&self.0)
    }
}

fn bearer_token(value: Option<&HeaderValue>) -> Result<&str, &'static str> {
    let value = value.ok_or("missing authorization header")?;
    let value = value
        .to_str()
        .map_err(|_| "authorization header is not visible ASCII")?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or("authorization header has no scheme")?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err("unsupported authorization scheme");
    }
    let token = token.trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}

/// Verify the `Authorization` header value and return the caller identity.
///
/// Missing header, wrong scheme, malformed token, bad signature and expiry
/// all yield the same `Unauthorized` error.
pub fn authenticate(
    tokens: &dyn TokenService,
    authorization: Option<&HeaderValue>,
) -> Result<AuthenticatedUser, Error> {
    let token = bearer_token(authorization).map_err(|reason| {
        debug!(reason, "bearer authentication failed");
        Error::unauthorized(INVALID_TOKEN)
    })?;
    tokens.verify(token).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        Error::unauthorized(INVALID_TOKEN)
    })
}

impl FromRequest for BearerAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<HttpState>>() {
            Some(state) => authenticate(
                state.tokens.as_ref(),
                req.headers().get(header::AUTHORIZATION),
            )
            .map(BearerAuth),
            None => {
                error!("HTTP state missing from app data");
                Err(Error::internal("HTTP state not configured"))
            }
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockTokenService, TokenError};
    use crate::domain::{ErrorCode, UserId, Username};
    use rstest::rstest;

    fn identity() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: UserId::random(),
            username: Username::new("alice").expect("valid username"),
            role: Role::Employee,
        }
    }

    fn rejecting_tokens() -> MockTokenService {
        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .returning(|_| Err(TokenError::invalid("signature mismatch")));
        tokens
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic YWxpY2U6c2VjcmV0"))]
    #[case(Some("Bearer"))]
    #[case(Some("Bearer    "))]
    #[case(Some("tokenwithoutscheme"))]
    fn malformed_headers_are_unauthorised(#[case] header: Option<&str>) {
        let mut tokens = MockTokenService::new();
        tokens.expect_verify().never();
        let value = header.map(|raw| HeaderValue::from_str(raw).expect("valid header"));

        let err = authenticate(&tokens, value.as_ref()).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), INVALID_TOKEN);
    }

    #[rstest]
    fn rejected_token_uses_same_error() {
        let tokens = rejecting_tokens();
        let value = HeaderValue::from_static("Bearer tampered");

        let err = authenticate(&tokens, Some(&value)).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), INVALID_TOKEN);
    }

    #[rstest]
    #[case("Bearer good-token")]
    #[case("bearer good-token")]
    fn verified_token_yields_identity(#[case] header: &str) {
        let expected = identity();
        let returned = expected.clone();
        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .withf(|token| token == "good-token")
            .times(1)
            .return_once(move |_| Ok(returned));
        let value = HeaderValue::from_str(header).expect("valid header");

        let user = authenticate(&tokens, Some(&value)).expect("authenticated");
        assert_eq!(user, expected);
    }

    #[rstest]
    fn employee_fails_manager_gate() {
        let auth = BearerAuth(identity());
        let err = auth.require_role(&[Role::Manager]).expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
