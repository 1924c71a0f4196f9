//! Asset ledger collaborator
//!
//! The pool never holds balances itself: each asset lives on a ledger that
//! moves value between external accounts and the pool's custody. The pool
//! pulls with [`AssetLedger::transfer_into`] (may fail), undoes a pull with
//! [`AssetLedger::revert_transfer_into`], and pushes with
//! [`AssetLedger::transfer_out_of`] (cannot fail once the pool holds the funds).

use std::collections::BTreeMap;

use crate::AccountId;

/// Rejections a ledger may return for an inbound pull
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("insufficient allowance")]
    InsufficientAllowance,
}

/// Trait for pluggable asset ledgers
///
/// Implementers bind one asset to one pool's custody account.
pub trait AssetLedger {
    /// Report whether `transfer_into` would succeed, without moving anything
    ///
    /// Ledgers that cannot answer ahead of time keep the default and rely on
    /// [`AssetLedger::revert_transfer_into`] when a later pull fails.
    fn check_transfer_into(&self, from: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let _ = (from, amount);
        Ok(())
    }

    /// Move `amount` from `from` into the pool's custody
    ///
    /// Must either move the full amount or change nothing.
    fn transfer_into(&mut self, from: &AccountId, amount: u128) -> Result<(), LedgerError>;

    /// Undo a successful `transfer_into` of `amount` from `from`
    ///
    /// Must restore the ledger exactly as it was before the pull, allowance
    /// included. Only called immediately after that pull, with nothing in
    /// between.
    fn revert_transfer_into(&mut self, from: &AccountId, amount: u128);

    /// Move `amount` from the pool's custody to `to`
    fn transfer_out_of(&mut self, to: &AccountId, amount: u128);
}

/// In-memory fungible token with allowances granted to the pool
///
/// Mirrors a minimal mintable token: holders are credited with `mint`, grant
/// the pool a spending allowance with `approve`, and the pool's own holdings
/// are tracked as `custody`. An allowance of `u128::MAX` is never decremented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenLedger {
    symbol: String,
    balances: BTreeMap<AccountId, u128>,
    allowances: BTreeMap<AccountId, u128>,
    custody: u128,
}

impl TokenLedger {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Credit `amount` new tokens to `to`
    ///
    /// # Panics
    /// If the holder's balance would exceed `u128::MAX`.
    pub fn mint(&mut self, to: &AccountId, amount: u128) {
        self.credit(to, amount);
    }

    /// Set the allowance `owner` grants the pool
    pub fn approve(&mut self, owner: &AccountId, amount: u128) {
        self.allowances.insert(*owner, amount);
    }

    pub fn balance_of(&self, owner: &AccountId) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &AccountId) -> u128 {
        self.allowances.get(owner).copied().unwrap_or(0)
    }

    /// Balance held by the pool
    pub fn custody(&self) -> u128 {
        self.custody
    }

    fn credit(&mut self, to: &AccountId, amount: u128) {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = match balance.checked_add(amount) {
            Some(b) => b,
            None => panic!("{}: balance of {} overflows", self.symbol, to),
        };
    }

    fn debit_custody(&mut self, amount: u128) {
        // The pool only pushes what its reserves account for
        self.custody = match self.custody.checked_sub(amount) {
            Some(c) => c,
            None => panic!("{}: push of {} exceeds custody {}", self.symbol, amount, self.custody),
        };
    }

    /// Sum of all holder balances plus custody
    pub fn total_supply(&self) -> u128 {
        self.balances
            .values()
            .fold(self.custody, |acc, b| acc.saturating_add(*b))
    }
}

impl AssetLedger for TokenLedger {
    fn check_transfer_into(&self, from: &AccountId, amount: u128) -> Result<(), LedgerError> {
        // Allowance is checked before balance
        if self.allowance(from) < amount {
            return Err(LedgerError::InsufficientAllowance);
        }
        if self.balance_of(from) < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        Ok(())
    }

    fn transfer_into(&mut self, from: &AccountId, amount: u128) -> Result<(), LedgerError> {
        self.check_transfer_into(from, amount)?;
        let allowance = self.allowance(from);
        let balance = self.balance_of(from);

        if allowance != u128::MAX {
            self.allowances.insert(*from, allowance - amount);
        }
        self.balances.insert(*from, balance - amount);
        self.custody = match self.custody.checked_add(amount) {
            Some(c) => c,
            None => panic!("{}: custody overflows", self.symbol),
        };
        Ok(())
    }

    fn revert_transfer_into(&mut self, from: &AccountId, amount: u128) {
        self.debit_custody(amount);
        self.credit(from, amount);

        // An unlimited allowance was never decremented
        let allowance = self.allowance(from);
        if allowance != u128::MAX {
            self.allowances.insert(*from, allowance + amount);
        }
    }

    fn transfer_out_of(&mut self, to: &AccountId, amount: u128) {
        self.debit_custody(amount);
        self.credit(to, amount);
    }
}
