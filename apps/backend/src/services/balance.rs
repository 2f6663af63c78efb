//! Identity and balance boundary.
//!
//! The engine never stores balances itself; it talks to these traits
//! and treats every failure as an external-dependency error. The
//! in-memory ledger backs development and tests.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::domain::{DomainError, ExternalKind};

#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve a connection token into a stable identity.
    async fn resolve(&self, connection_token: &str) -> Result<Identity, DomainError>;
}

#[async_trait]
pub trait BalanceService: Send + Sync {
    async fn get_balance(&self, email: &str) -> Result<i64, DomainError>;
    async fn debit(&self, email: &str, amount: i64) -> Result<(), DomainError>;
    async fn credit(&self, email: &str, amount: i64) -> Result<(), DomainError>;
}

/// Token ledger held in process memory.
#[derive(Default)]
pub struct InMemoryLedger {
    balances: DashMap<String, i64>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, email: &str, amount: i64) {
        self.balances.insert(email.to_string(), amount);
    }
}

#[async_trait]
impl BalanceService for InMemoryLedger {
    async fn get_balance(&self, email: &str) -> Result<i64, DomainError> {
        Ok(self.balances.get(email).map(|b| *b).unwrap_or(0))
    }

    async fn debit(&self, email: &str, amount: i64) -> Result<(), DomainError> {
        let mut balance = self.balances.entry(email.to_string()).or_insert(0);
        if *balance < amount {
            return Err(DomainError::external(
                ExternalKind::InsufficientFunds,
                format!("{email} holds {} of {amount} required", *balance),
            ));
        }
        *balance -= amount;
        Ok(())
    }

    async fn credit(&self, email: &str, amount: i64) -> Result<(), DomainError> {
        let mut balance = self.balances.entry(email.to_string()).or_insert(0);
        *balance += amount;
        Ok(())
    }
}

/// Identity source that trusts the token as `user_id:email`. Stands in
/// for the real session lookup in development and tests.
#[derive(Default)]
pub struct StaticIdentityService;

#[async_trait]
impl IdentityService for StaticIdentityService {
    async fn resolve(&self, connection_token: &str) -> Result<Identity, DomainError> {
        let (user_id, email) = connection_token.split_once(':').ok_or_else(|| {
            DomainError::external(
                ExternalKind::IdentityUnresolved,
                "connection token is not attributable to a user",
            )
        })?;
        if user_id.is_empty() || email.is_empty() {
            return Err(DomainError::external(
                ExternalKind::IdentityUnresolved,
                "connection token is not attributable to a user",
            ));
        }
        Ok(Identity {
            user_id: user_id.to_string(),
            email: email.to_string(),
        })
    }
}
