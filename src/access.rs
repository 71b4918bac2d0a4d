//! Access control for privileged operations.
//!
//! Only token registration is privileged. The exchange asks its policy
//! whether the caller may register and otherwise never consults it.

use tracing::info;

use crate::error::{ExchangeError, Result};
use crate::types::AccountId;

/// Decides which callers may perform privileged operations
pub trait AccessPolicy {
    fn is_privileged(&self, caller: AccountId) -> bool;
}

/// Single-owner policy: exactly one account is privileged, and only that
/// account can hand the role on.
///
/// ```
/// use token_dex::access::{AccessPolicy, Owner};
/// use token_dex::types::AccountId;
///
/// let mut owner = Owner::new(AccountId(1));
/// assert!(owner.is_privileged(AccountId(1)));
///
/// owner.transfer(AccountId(1), AccountId(2)).unwrap();
/// assert!(!owner.is_privileged(AccountId(1)));
/// assert!(owner.transfer(AccountId(1), AccountId(3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    owner: AccountId,
}

impl Owner {
    pub fn new(owner: AccountId) -> Self {
        Self { owner }
    }

    #[inline]
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    /// Hand ownership to `new_owner`. Only the current owner may do this.
    pub fn transfer(&mut self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        info!(from = %self.owner, to = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    /// `Unauthorized` unless `caller` is the owner
    pub fn ensure_owner(&self, caller: AccountId) -> Result<()> {
        if caller != self.owner {
            return Err(ExchangeError::Unauthorized(format!(
                "{caller} is not the owner"
            )));
        }
        Ok(())
    }
}

impl AccessPolicy for Owner {
    fn is_privileged(&self, caller: AccountId) -> bool {
        caller == self.owner
    }
}

/// Policy with no privileged callers at all
#[derive(Debug, Clone, Copy, Default)]
pub struct Nobody;

impl AccessPolicy for Nobody {
    fn is_privileged(&self, _caller: AccountId) -> bool {
        false
    }
}
