//! Custody of the external tokens backing internal balances.
//!
//! A [`Custodian`] moves value between an account's external holdings and
//! the exchange. The exchange credits a deposit only after `pull_in` returns
//! `Ok`, and debits a withdrawal only after `push_out` returns `Ok`.
//!
//! [`InMemoryCustodian`] behaves like a set of ERC-20 tokens where the
//! exchange is the spender: deposits need a prior `approve`, withdrawals are
//! plain transfers out of the exchange's holdings.

use std::collections::{HashMap, HashSet};

use crate::error::CustodyError;
use crate::types::{AccountId, TokenRef};

/// Moves value in and out of the exchange's custody
pub trait Custodian {
    /// Move `amount` of `token` from `account` into the exchange
    fn pull_in(&mut self, token: TokenRef, account: AccountId, amount: u64) -> Result<(), CustodyError>;

    /// Move `amount` of `token` from the exchange back to `account`
    fn push_out(&mut self, token: TokenRef, account: AccountId, amount: u64) -> Result<(), CustodyError>;
}

impl<C: Custodian + ?Sized> Custodian for Box<C> {
    fn pull_in(&mut self, token: TokenRef, account: AccountId, amount: u64) -> Result<(), CustodyError> {
        (**self).pull_in(token, account, amount)
    }

    fn push_out(&mut self, token: TokenRef, account: AccountId, amount: u64) -> Result<(), CustodyError> {
        (**self).push_out(token, account, amount)
    }
}

/// Token balances, allowances and exchange holdings kept in memory.
///
/// ```
/// use token_dex::custody::{Custodian, InMemoryCustodian};
/// use token_dex::types::{AccountId, TokenRef};
///
/// let token = TokenRef::from_low_u64(1);
/// let mut custodian = InMemoryCustodian::new();
/// custodian.mint(token, AccountId(1), 1_000_000);
/// custodian.approve(token, AccountId(1), 500);
///
/// custodian.pull_in(token, AccountId(1), 100).unwrap();
///
/// assert_eq!(custodian.balance_of(token, AccountId(1)), 999_900);
/// assert_eq!(custodian.allowance(token, AccountId(1)), 400);
/// assert_eq!(custodian.held(token), 100);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustodian {
    balances: HashMap<(TokenRef, AccountId), u64>,
    /// Amount each holder lets the exchange pull
    allowances: HashMap<(TokenRef, AccountId), u64>,
    /// Tokens currently in the exchange's custody
    holdings: HashMap<TokenRef, u64>,
    /// Tokens the custodian refuses to move
    frozen: Vec<TokenRef>,
    /// Tokens with at least one mint
    minted: HashSet<TokenRef>,
}

impl InMemoryCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new tokens owned by `account`
    pub fn mint(&mut self, token: TokenRef, account: AccountId, amount: u64) {
        self.minted.insert(token);
        let balance = self.balances.entry((token, account)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Set how much of `token` the exchange may pull from `account`
    pub fn approve(&mut self, token: TokenRef, account: AccountId, amount: u64) {
        self.allowances.insert((token, account), amount);
    }

    /// Make every transfer of `token` fail
    pub fn freeze(&mut self, token: TokenRef) {
        if !self.frozen.contains(&token) {
            self.frozen.push(token);
        }
    }

    pub fn balance_of(&self, token: TokenRef, account: AccountId) -> u64 {
        self.balances.get(&(token, account)).copied().unwrap_or(0)
    }

    pub fn allowance(&self, token: TokenRef, account: AccountId) -> u64 {
        self.allowances.get(&(token, account)).copied().unwrap_or(0)
    }

    /// Amount of `token` in the exchange's custody
    pub fn held(&self, token: TokenRef) -> u64 {
        self.holdings.get(&token).copied().unwrap_or(0)
    }

    /// A token exists once something has been minted for it
    pub fn knows(&self, token: TokenRef) -> bool {
        self.minted.contains(&token)
    }

    fn check_movable(&self, token: TokenRef) -> Result<(), CustodyError> {
        if !self.knows(token) {
            return Err(CustodyError::UnknownToken(token.to_string()));
        }
        if self.frozen.contains(&token) {
            return Err(CustodyError::Rejected(format!("token {token} is frozen")));
        }
        Ok(())
    }
}

impl Custodian for InMemoryCustodian {
    fn pull_in(&mut self, token: TokenRef, account: AccountId, amount: u64) -> Result<(), CustodyError> {
        self.check_movable(token)?;

        let allowance = self.allowance(token, account);
        if allowance < amount {
            return Err(CustodyError::InsufficientAllowance);
        }
        let balance = self.balance_of(token, account);
        if balance < amount {
            return Err(CustodyError::InsufficientFunds);
        }
        let held = self
            .held(token)
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Rejected("custody total overflow".to_string()))?;

        self.allowances.insert((token, account), allowance - amount);
        self.balances.insert((token, account), balance - amount);
        self.holdings.insert(token, held);
        Ok(())
    }

    fn push_out(&mut self, token: TokenRef, account: AccountId, amount: u64) -> Result<(), CustodyError> {
        self.check_movable(token)?;

        let held = self.held(token);
        if held < amount {
            return Err(CustodyError::InsufficientFunds);
        }
        let balance = self
            .balance_of(token, account)
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Rejected("holder balance overflow".to_string()))?;

        self.holdings.insert(token, held - amount);
        self.balances.insert((token, account), balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: TokenRef = TokenRef([0x11; 20]);

    #[test]
    fn test_pull_in_requires_allowance() {
        let mut custodian = InMemoryCustodian::new();
        custodian.mint(TOKEN, AccountId(1), 100);

        assert_eq!(
            custodian.pull_in(TOKEN, AccountId(1), 10),
            Err(CustodyError::InsufficientAllowance)
        );
        assert_eq!(custodian.balance_of(TOKEN, AccountId(1)), 100);
        assert_eq!(custodian.held(TOKEN), 0);
    }

    #[test]
    fn test_pull_in_requires_funds() {
        let mut custodian = InMemoryCustodian::new();
        custodian.mint(TOKEN, AccountId(1), 5);
        custodian.approve(TOKEN, AccountId(1), 100);

        assert_eq!(
            custodian.pull_in(TOKEN, AccountId(1), 10),
            Err(CustodyError::InsufficientFunds)
        );
        assert_eq!(custodian.allowance(TOKEN, AccountId(1)), 100);
    }

    #[test]
    fn test_round_trip() {
        let mut custodian = InMemoryCustodian::new();
        custodian.mint(TOKEN, AccountId(1), 1_000_000);
        custodian.approve(TOKEN, AccountId(1), 1_000);

        custodian.pull_in(TOKEN, AccountId(1), 100).unwrap();
        custodian.push_out(TOKEN, AccountId(1), 50).unwrap();

        assert_eq!(custodian.balance_of(TOKEN, AccountId(1)), 1_000_000 - 100 + 50);
        assert_eq!(custodian.held(TOKEN), 50);
    }

    #[test]
    fn test_push_out_limited_by_holdings() {
        let mut custodian = InMemoryCustodian::new();
        custodian.mint(TOKEN, AccountId(2), 1);

        assert_eq!(
            custodian.push_out(TOKEN, AccountId(1), 1),
            Err(CustodyError::InsufficientFunds)
        );
    }

    #[test]
    fn test_frozen_token_rejected() {
        let mut custodian = InMemoryCustodian::new();
        custodian.mint(TOKEN, AccountId(1), 10);
        custodian.approve(TOKEN, AccountId(1), 10);
        custodian.freeze(TOKEN);

        assert!(matches!(
            custodian.pull_in(TOKEN, AccountId(1), 10),
            Err(CustodyError::Rejected(_))
        ));
    }

    #[test]
    fn test_unminted_token_unknown() {
        let mut custodian = InMemoryCustodian::new();
        let other = TokenRef([0x22; 20]);
        custodian.mint(TOKEN, AccountId(1), 10);
        custodian.approve(other, AccountId(1), 10);

        assert!(custodian.knows(TOKEN));
        assert!(!custodian.knows(other));
        assert!(matches!(
            custodian.pull_in(other, AccountId(1), 1),
            Err(CustodyError::UnknownToken(_))
        ));
        assert!(matches!(
            custodian.push_out(other, AccountId(1), 1),
            Err(CustodyError::UnknownToken(_))
        ));
    }
}
