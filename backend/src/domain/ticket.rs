//! Reimbursement ticket model and its status state machine.
//!
//! ```text
//! Pending --(process, Manager)--> Approved | Rejected
//! ```
//!
//! Approved and Rejected are terminal. A ticket leaves `Pending` exactly
//! once and the resolver is recorded on that transition only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ImageRef, UserId};

/// Validation errors raised while building ticket values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketValidationError {
    /// Amount was zero or negative.
    #[error("Amount cannot be negative")]
    AmountNotPositive,
    /// Amount was NaN or infinite.
    #[error("amount must be a finite number")]
    AmountNotFinite,
    /// Description was blank.
    #[error("description must not be empty")]
    EmptyDescription,
    /// Ticket identifier was not a UUID.
    #[error("ticket id must be a valid UUID")]
    InvalidId,
    /// Status string was not recognised.
    #[error("unknown ticket status: {0}")]
    UnknownStatus(String),
    /// Requested decision is not a terminal status.
    #[error("status must be Approved or Rejected, got {0}")]
    InvalidDecision(String),
}

/// Errors raised by [`Ticket::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketTransitionError {
    /// The ticket has already left `Pending`.
    #[error("Ticket already processed")]
    AlreadyProcessed {
        /// Status the ticket currently holds.
        current: TicketStatus,
    },
}

/// Stable ticket identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(Uuid);

impl TicketId {
    /// Parse a ticket identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, TicketValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| TicketValidationError::InvalidId)
    }

    /// Wrap an existing UUID, typically loaded from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<TicketId> for String {
    fn from(value: TicketId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for TicketId {
    type Error = TicketValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Reimbursement amount; finite and strictly greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    /// Validate and construct an [`Amount`].
    ///
    /// Zero is rejected alongside negative values even though the message
    /// only names negativity.
    pub fn new(value: f64) -> Result<Self, TicketValidationError> {
        if !value.is_finite() {
            return Err(TicketValidationError::AmountNotFinite);
        }
        if value <= 0.0 {
            return Err(TicketValidationError::AmountNotPositive);
        }
        Ok(Self(value))
    }

    /// Raw numeric value.
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Free-text justification for the expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    /// Validate and construct a [`Description`].
    pub fn new(value: impl Into<String>) -> Result<Self, TicketValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TicketValidationError::EmptyDescription);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Awaiting a manager decision.
    Pending,
    /// Accepted for reimbursement.
    Approved,
    /// Declined.
    Rejected,
}

impl TicketStatus {
    /// Stable storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Whether the status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            other => Err(TicketValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Manager decision applied to a pending ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketDecision {
    /// Move the ticket to [`TicketStatus::Approved`].
    Approved,
    /// Move the ticket to [`TicketStatus::Rejected`].
    Rejected,
}

impl TicketDecision {
    /// Terminal status produced by this decision.
    pub fn status(self) -> TicketStatus {
        match self {
            Self::Approved => TicketStatus::Approved,
            Self::Rejected => TicketStatus::Rejected,
        }
    }
}

impl FromStr for TicketDecision {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(TicketValidationError::InvalidDecision(s.to_owned())),
        }
    }
}

/// Decision plus the manager who made it; applied atomically by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketResolution {
    /// Requested terminal status.
    pub decision: TicketDecision,
    /// Manager recorded as resolver.
    pub resolver: UserId,
}

/// Validated submission payload for a new ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketDraft {
    amount: Amount,
    description: Description,
}

impl TicketDraft {
    /// Validate raw request values.
    ///
    /// # Examples
    /// ```
    /// use reimburse::domain::{TicketDraft, TicketValidationError};
    ///
    /// let err = TicketDraft::try_from_parts(0.0, "Taxi").unwrap_err();
    /// assert_eq!(err, TicketValidationError::AmountNotPositive);
    /// ```
    pub fn try_from_parts(
        amount: f64,
        description: impl Into<String>,
    ) -> Result<Self, TicketValidationError> {
        Ok(Self {
            amount: Amount::new(amount)?,
            description: Description::new(description)?,
        })
    }
}

/// Stored components of a ticket, used to rebuild it from a row.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketParts {
    /// Identifier.
    pub id: TicketId,
    /// Reimbursement amount.
    pub amount: Amount,
    /// Justification text.
    pub description: Description,
    /// Submitting user.
    pub author: UserId,
    /// Current status.
    pub status: TicketStatus,
    /// Manager who processed the ticket.
    pub resolver: Option<UserId>,
    /// Attached receipt image.
    pub image: Option<ImageRef>,
}

/// Reimbursement request.
///
/// ## Invariants
/// - `resolver` is `Some` exactly when `status` is terminal for tickets
///   created through [`Ticket::submit`] and [`Ticket::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    id: TicketId,
    amount: Amount,
    description: Description,
    author: UserId,
    status: TicketStatus,
    resolver: Option<UserId>,
    image: Option<ImageRef>,
}

impl Ticket {
    /// Create a pending ticket authored by `author` with a fresh identifier.
    pub fn submit(draft: TicketDraft, author: UserId) -> Self {
        let TicketDraft {
            amount,
            description,
        } = draft;
        Self {
            id: TicketId::random(),
            amount,
            description,
            author,
            status: TicketStatus::Pending,
            resolver: None,
            image: None,
        }
    }

    /// Rebuild a ticket from stored components.
    pub fn from_parts(parts: TicketParts) -> Self {
        let TicketParts {
            id,
            amount,
            description,
            author,
            status,
            resolver,
            image,
        } = parts;
        Self {
            id,
            amount,
            description,
            author,
            status,
            resolver,
            image,
        }
    }

    /// Apply a manager decision, consuming the pending ticket.
    ///
    /// # Examples
    /// ```
    /// use reimburse::domain::{
    ///     Ticket, TicketDecision, TicketDraft, TicketResolution, TicketStatus, UserId,
    /// };
    ///
    /// let draft = TicketDraft::try_from_parts(200.0, "Reimbursement").unwrap();
    /// let ticket = Ticket::submit(draft, UserId::random());
    /// let resolver = UserId::random();
    /// let resolved = ticket
    ///     .resolve(TicketResolution { decision: TicketDecision::Approved, resolver })
    ///     .unwrap();
    /// assert_eq!(resolved.status(), TicketStatus::Approved);
    /// assert_eq!(resolved.resolver(), Some(&resolver));
    /// ```
    pub fn resolve(mut self, resolution: TicketResolution) -> Result<Self, TicketTransitionError> {
        if self.status.is_terminal() {
            return Err(TicketTransitionError::AlreadyProcessed {
                current: self.status,
            });
        }
        self.status = resolution.decision.status();
        self.resolver = Some(resolution.resolver);
        Ok(self)
    }

    /// Return a copy carrying the given receipt image.
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    /// Ticket identifier.
    pub fn id(&self) -> &TicketId {
        &self.id
    }

    /// Reimbursement amount.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Justification text.
    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Submitting user.
    pub fn author(&self) -> &UserId {
        &self.author
    }

    /// Current status.
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// Manager who processed the ticket, once processed.
    pub fn resolver(&self) -> Option<&UserId> {
        self.resolver.as_ref()
    }

    /// Attached receipt image.
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }
}

/// Result of attaching an image to a ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketImage {
    /// Ticket that received the image.
    pub ticket_id: TicketId,
    /// Stored image reference.
    pub image: ImageRef,
    /// Ticket record after the update.
    pub ticket: Ticket,
}
