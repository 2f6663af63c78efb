//! Domain-level error type used across the engine and services.
//!
//! This error type is transport-agnostic. Websocket and HTTP handlers
//! convert it through `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Rule violations by the acting player. Rejected synchronously,
/// nothing is mutated, surfaced only to the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    NotYourTurn,
    CardNotInHand,
    InvalidBrelan,
    NotARespondent,
    NoChallengePending,
    FortialNotAvailable,
    Other(String),
}

/// Failures of the room/game lifecycle preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreconditionKind {
    RoomFull,
    RoomNotFound,
    NotInRoom,
    GameInProgress,
    GameNotInProgress,
    GameAlreadyEnded,
    JoinNotAllowed,
    NotEnoughPlayers,
    TeamFull,
}

/// Failures crossing the identity/balance trust boundary. These abort the
/// room-level operation and every affected human seat is notified.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExternalKind {
    IdentityUnresolved,
    BalanceUnavailable,
    InsufficientFunds,
}

impl ExternalKind {
    /// Stable reason code sent to affected players.
    pub fn reason_code(&self) -> &'static str {
        match self {
            ExternalKind::IdentityUnresolved => "not_authenticated",
            ExternalKind::BalanceUnavailable => "balance_unavailable",
            ExternalKind::InsufficientFunds => "insufficient_tokens",
        }
    }
}

/// Central domain error type.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Player action violating a game rule.
    Validation(ValidationKind, String),
    /// Room/game lifecycle precondition not met.
    Precondition(PreconditionKind, String),
    /// Identity/balance boundary failure.
    External(ExternalKind, String),
    /// Invariant violation the data model should have made impossible.
    /// Fatal for the affected room only; never crashes the process.
    Internal(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Precondition(kind, d) => write!(f, "precondition {kind:?}: {d}"),
            DomainError::External(kind, d) => write!(f, "external {kind:?}: {d}"),
            DomainError::Internal(d) => write!(f, "internal: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn precondition(kind: PreconditionKind, detail: impl Into<String>) -> Self {
        Self::Precondition(kind, detail.into())
    }
    pub fn external(kind: ExternalKind, detail: impl Into<String>) -> Self {
        Self::External(kind, detail.into())
    }
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }
}
