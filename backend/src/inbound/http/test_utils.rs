//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use crate::domain::ports::{
    MockImageStore, MockTicketCommand, MockTicketQuery, MockTokenService, MockUserCommand,
    TokenError,
};
use crate::domain::{AuthenticatedUser, Role, UserId, Username};

use super::state::{HttpState, HttpStatePorts};

const BOUNDARY: &str = "reimburse-test-boundary";
/// Bearer token the mocked token service resolves to [`employee`].
pub const EMPLOYEE_TOKEN: &str = "employee-token";
/// Bearer token the mocked token service resolves to [`manager`].
pub const MANAGER_TOKEN: &str = "manager-token";

/// Fixed employee identity.
pub fn employee() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: UserId::new("11111111-1111-4111-8111-111111111111").expect("fixture id"),
        username: Username::new("employee").expect("fixture username"),
        role: Role::Employee,
    }
}

/// Fixed manager identity.
pub fn manager() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: UserId::new("22222222-2222-4222-8222-222222222222").expect("fixture id"),
        username: Username::new("manager").expect("fixture username"),
        role: Role::Manager,
    }
}

/// `Authorization` header tuple for a bearer token.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("authorization", format!("Bearer {token}"))
}

/// Mocked ports; configure expectations then call [`MockPorts::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub users: MockUserCommand,
    pub tickets: MockTicketCommand,
    pub tickets_query: MockTicketQuery,
    pub tokens: MockTokenService,
    pub images: MockImageStore,
}

impl MockPorts {
    /// Ports whose token service recognises [`EMPLOYEE_TOKEN`] and
    /// [`MANAGER_TOKEN`] and rejects everything else.
    pub fn with_known_tokens() -> Self {
        let mut ports = Self::default();
        ports.tokens.expect_verify().returning(|token| match token {
            EMPLOYEE_TOKEN => Ok(employee()),
            MANAGER_TOKEN => Ok(manager()),
            _ => Err(TokenError::invalid("unknown test token")),
        });
        ports
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            users: Arc::new(self.users),
            tickets: Arc::new(self.tickets),
            tickets_query: Arc::new(self.tickets_query),
            tokens: Arc::new(self.tokens),
            images: Arc::new(self.images),
        })
    }
}

/// One part of a hand-built `multipart/form-data` body.
pub struct MultipartPart<'a> {
    name: &'a str,
    file: Option<(&'a str, &'a str)>,
    data: &'a [u8],
}

impl<'a> MultipartPart<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file: Some((file_name, content_type)),
            data,
        }
    }
}

/// Encode parts as a multipart body; returns the content type and payload.
pub fn multipart_body(parts: &[MultipartPart<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
