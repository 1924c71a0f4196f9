//! Two-asset constant product pool
//!
//! This crate implements the accounting and pricing engine of an x·y=k pool:
//! 1. Reserve bookkeeping for two fungible assets
//! 2. Liquidity share minting (geometric mean first, proportional after)
//! 3. Share burning against a proportional slice of the reserves
//! 4. Exact-input swaps with a 0.3% fee that accrues to share holders
//!
//! Every state-changing operation validates all inputs and computes the new
//! state into locals before touching anything. Asset movement goes through the
//! [`AssetLedger`] collaborator; a failed pull aborts the operation and any
//! pull that already happened is reverted before the error is returned.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod ledger;
pub mod shared;

pub use config::{AssetConfig, PoolConfig, PoolId};
pub use ledger::{AssetLedger, LedgerError, TokenLedger};
pub use pool_math::{SwapQuote, FEE_DENOMINATOR, FEE_NUMERATOR, U256};
pub use shared::{PoolRegistry, SharedPool};

use pool_math::MathError;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque account identifier (32 bytes, shown in base58)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

/// Which way a swap trades
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Pay asset A, receive asset B
    AToB,
    /// Pay asset B, receive asset A
    BToA,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// A required positive quantity was zero
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Non-initial deposit does not match the reserve ratio exactly
    #[error("deposit ratio does not match the reserve ratio")]
    RatioMismatch,

    /// Withdrawal of more shares than the caller holds
    #[error("insufficient liquidity shares")]
    InsufficientShares,

    /// Pricing against a zero reserve
    #[error("reserve is empty")]
    EmptyReserve,

    /// Propagated from the asset ledger
    #[error("insufficient token balance")]
    InsufficientBalance,

    /// Propagated from the asset ledger
    #[error("insufficient token allowance")]
    InsufficientAllowance,

    /// A reserve, share total or product exceeded its integer width
    #[error("arithmetic overflow")]
    Overflow,

    /// Swap output below the caller's minimum
    #[error("swap output {actual} is below the requested minimum {expected_min}")]
    SlippageExceeded { expected_min: u128, actual: u128 },

    /// A restored snapshot violates a ledger invariant
    #[error("corrupt pool state: {0}")]
    CorruptState(&'static str),

    /// A previous holder of the pool lock panicked
    #[error("pool lock poisoned")]
    LockPoisoned,

    #[error("unknown pool: {0}")]
    UnknownPool(String),

    #[error("pool already registered: {0}")]
    DuplicatePool(String),
}

pub type Result<T> = core::result::Result<T, PoolError>;

impl From<MathError> for PoolError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::EmptyReserve => PoolError::EmptyReserve,
            MathError::Overflow => PoolError::Overflow,
        }
    }
}

impl From<LedgerError> for PoolError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance => PoolError::InsufficientBalance,
            LedgerError::InsufficientAllowance => PoolError::InsufficientAllowance,
        }
    }
}

// ============================================================================
// Pure Pricing
// ============================================================================

/// Output of an exact-input swap against `(reserve_in, reserve_out)`
///
/// Pure: no pool state is read or written. `amount_in == 0` yields 0; the
/// zero-input rejection lives in the swap entry points.
pub fn get_amount_out(amount_in: u128, reserve_in: u128, reserve_out: u128) -> Result<u128> {
    Ok(pool_math::get_amount_out(amount_in, reserve_in, reserve_out)?)
}

// ============================================================================
// Persistent State
// ============================================================================

/// One holder's outstanding shares
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareBalance {
    pub account: AccountId,
    pub shares: u128,
}

/// The four ledger fields that must outlive any single process
///
/// Persisting this is the caller's concern; [`Pool::restore`] validates it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub total_shares: u128,
    pub share_balances: Vec<ShareBalance>,
}

// ============================================================================
// Pool
// ============================================================================

/// Reserve ledger, share ledger and pricing for one asset pair
///
/// Generic over the two asset ledgers, defaulting to the in-memory
/// [`TokenLedger`].
#[derive(Clone, Debug)]
pub struct Pool<A = TokenLedger, B = TokenLedger>
where
    A: AssetLedger,
    B: AssetLedger,
{
    config: PoolConfig,

    /// Holdings of asset A (smallest unit)
    reserve_a: u128,

    /// Holdings of asset B (smallest unit)
    reserve_b: u128,

    /// Sum of all outstanding shares
    total_shares: u128,

    /// Outstanding shares per holder; zero balances are pruned
    shares: BTreeMap<AccountId, u128>,

    ledger_a: A,
    ledger_b: B,
}

impl<A, B> Pool<A, B>
where
    A: AssetLedger,
    B: AssetLedger,
{
    /// Create an empty pool (zero reserves, zero shares)
    pub fn new(config: PoolConfig, ledger_a: A, ledger_b: B) -> Self {
        Self {
            config,
            reserve_a: 0,
            reserve_b: 0,
            total_shares: 0,
            shares: BTreeMap::new(),
            ledger_a,
            ledger_b,
        }
    }

    /// Rebuild a pool from a persisted snapshot
    ///
    /// Rejects snapshots with duplicate or zero holder entries, a share sum
    /// that differs from `total_shares`, or a partially-empty reserve state.
    pub fn restore(config: PoolConfig, state: PoolState, ledger_a: A, ledger_b: B) -> Result<Self> {
        let mut shares = BTreeMap::new();
        let mut sum: u128 = 0;
        for entry in state.share_balances {
            if entry.shares == 0 {
                return Err(PoolError::CorruptState("zero share balance entry"));
            }
            if shares.insert(entry.account, entry.shares).is_some() {
                return Err(PoolError::CorruptState("duplicate share holder"));
            }
            sum = sum.checked_add(entry.shares).ok_or(PoolError::Overflow)?;
        }
        if sum != state.total_shares {
            return Err(PoolError::CorruptState("share balances do not sum to total"));
        }

        let pool = Self {
            config,
            reserve_a: state.reserve_a,
            reserve_b: state.reserve_b,
            total_shares: state.total_shares,
            shares,
            ledger_a,
            ledger_b,
        };
        if !pool.check_invariants() {
            return Err(PoolError::CorruptState("reserves and shares are not jointly empty"));
        }

        debug!(
            "{}: restored reserves=({}, {}) total_shares={} holders={}",
            pool.config.id,
            pool.reserve_a,
            pool.reserve_b,
            pool.total_shares,
            pool.shares.len()
        );
        Ok(pool)
    }

    /// Capture the ledger fields for persistence
    pub fn snapshot(&self) -> PoolState {
        PoolState {
            reserve_a: self.reserve_a,
            reserve_b: self.reserve_b,
            total_shares: self.total_shares,
            share_balances: self
                .shares
                .iter()
                .map(|(account, shares)| ShareBalance {
                    account: *account,
                    shares: *shares,
                })
                .collect(),
        }
    }

    /// Check every ledger invariant
    ///
    /// - reserve_a == 0 ⇔ reserve_b == 0 ⇔ total_shares == 0
    /// - Σ(share balances) == total_shares, each balance in 1..=total_shares
    pub fn check_invariants(&self) -> bool {
        let a_empty = self.reserve_a == 0;
        let b_empty = self.reserve_b == 0;
        let s_empty = self.total_shares == 0;
        if a_empty != b_empty || b_empty != s_empty {
            return false;
        }

        let mut sum: u128 = 0;
        for shares in self.shares.values() {
            if *shares == 0 || *shares > self.total_shares {
                return false;
            }
            sum = match sum.checked_add(*shares) {
                Some(s) => s,
                None => return false,
            };
        }
        sum == self.total_shares
    }
}

// ============================================================================
// Queries
// ============================================================================

impl<A, B> Pool<A, B>
where
    A: AssetLedger,
    B: AssetLedger,
{
    pub fn id(&self) -> &PoolId {
        &self.config.id
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Current `(reserve_a, reserve_b)`
    pub fn get_reserves(&self) -> (u128, u128) {
        (self.reserve_a, self.reserve_b)
    }

    /// Spot price of A in B, floored; 0 while the pool is empty
    pub fn get_price(&self) -> u128 {
        pool_math::spot_price(self.reserve_a, self.reserve_b)
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    pub fn share_balance(&self, account: &AccountId) -> u128 {
        self.shares.get(account).copied().unwrap_or(0)
    }

    /// Iterate over holders with a non-zero balance
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, u128)> + '_ {
        self.shares.iter().map(|(account, shares)| (account, *shares))
    }

    /// Preview an exact-input swap against current reserves
    ///
    /// Same validation as the swap entry points; nothing is transferred.
    pub fn quote(&self, direction: SwapDirection, amount_in: u128) -> Result<SwapQuote> {
        if amount_in == 0 {
            return Err(PoolError::InvalidAmount);
        }
        let (reserve_in, reserve_out) = self.directed_reserves(direction);
        if reserve_in == 0 {
            return Err(PoolError::EmptyReserve);
        }
        Ok(pool_math::quote_exact_in(amount_in, reserve_in, reserve_out)?)
    }

    pub fn ledger_a(&self) -> &A {
        &self.ledger_a
    }

    pub fn ledger_b(&self) -> &B {
        &self.ledger_b
    }

    /// Mutable ledger access for funding and approvals outside pool operations
    pub fn ledger_a_mut(&mut self) -> &mut A {
        &mut self.ledger_a
    }

    /// Mutable ledger access for funding and approvals outside pool operations
    pub fn ledger_b_mut(&mut self) -> &mut B {
        &mut self.ledger_b
    }

    fn directed_reserves(&self, direction: SwapDirection) -> (u128, u128) {
        match direction {
            SwapDirection::AToB => (self.reserve_a, self.reserve_b),
            SwapDirection::BToA => (self.reserve_b, self.reserve_a),
        }
    }
}

// ============================================================================
// Liquidity Operations
// ============================================================================

impl<A, B> Pool<A, B>
where
    A: AssetLedger,
    B: AssetLedger,
{
    /// Deposit both assets and mint shares to `caller`
    ///
    /// The first deposit sets the reserves directly and mints
    /// floor(sqrt(a · b)) shares. Later deposits must match the reserve ratio
    /// exactly (a · rB == b · rA) and mint floor(total · a / rA) shares; a
    /// mismatch is rejected rather than truncated.
    ///
    /// # Returns
    /// * Shares minted to `caller`
    pub fn add_liquidity(&mut self, caller: &AccountId, amount_a: u128, amount_b: u128) -> Result<u128> {
        if amount_a == 0 || amount_b == 0 {
            return Err(PoolError::InvalidAmount);
        }

        // Step 1: Price the deposit
        let minted = if self.total_shares == 0 {
            pool_math::initial_shares(amount_a, amount_b)
        } else {
            if !pool_math::ratio_matches(amount_a, amount_b, self.reserve_a, self.reserve_b) {
                debug!(
                    "{}: ratio mismatch deposit=({}, {}) reserves=({}, {})",
                    self.config.id, amount_a, amount_b, self.reserve_a, self.reserve_b
                );
                return Err(PoolError::RatioMismatch);
            }
            pool_math::proportional_shares(self.total_shares, amount_a, self.reserve_a)?
        };

        // A deposit too small to mint a single share would be a pure donation
        if minted == 0 {
            return Err(PoolError::InvalidAmount);
        }

        // Step 2: Compute the new state into locals
        let new_reserve_a = self.reserve_a.checked_add(amount_a).ok_or(PoolError::Overflow)?;
        let new_reserve_b = self.reserve_b.checked_add(amount_b).ok_or(PoolError::Overflow)?;
        let new_total = self.total_shares.checked_add(minted).ok_or(PoolError::Overflow)?;
        let new_balance = self
            .share_balance(caller)
            .checked_add(minted)
            .ok_or(PoolError::Overflow)?;

        // Step 3: Pre-flight both pulls so a doomed deposit moves nothing
        self.ledger_a.check_transfer_into(caller, amount_a)?;
        self.ledger_b.check_transfer_into(caller, amount_b)?;

        // Step 4: Pull both assets, reverting A if B cannot be pulled
        self.ledger_a.transfer_into(caller, amount_a)?;
        if let Err(err) = self.ledger_b.transfer_into(caller, amount_b) {
            warn!(
                "{}: {} pull failed for {} ({:?}), reverting {} pull of {}",
                self.config.id,
                self.config.asset_b.symbol,
                caller,
                err,
                self.config.asset_a.symbol,
                self.config.asset_a.format_amount(amount_a)
            );
            self.ledger_a.revert_transfer_into(caller, amount_a);
            return Err(err.into());
        }

        // Step 5: Commit
        self.reserve_a = new_reserve_a;
        self.reserve_b = new_reserve_b;
        self.total_shares = new_total;
        self.shares.insert(*caller, new_balance);

        info!(
            "{}: {} added {} + {}, minted {} shares",
            self.config.id,
            caller,
            self.config.asset_a.format_amount(amount_a),
            self.config.asset_b.format_amount(amount_b),
            minted
        );
        Ok(minted)
    }

    /// Burn `share_amount` of the caller's shares for a proportional slice of
    /// both reserves
    ///
    /// out = floor(reserve · share_amount / total_shares) per asset, so the
    /// withdrawer absorbs rounding. Burning every outstanding share empties
    /// the pool exactly.
    ///
    /// # Returns
    /// * `(out_a, out_b)` paid to `caller`
    pub fn remove_liquidity(&mut self, caller: &AccountId, share_amount: u128) -> Result<(u128, u128)> {
        let balance = self.share_balance(caller);
        if share_amount == 0 || share_amount > balance {
            return Err(PoolError::InsufficientShares);
        }

        // Step 1: Compute redemption and new state
        let out_a = pool_math::redeem_amount(self.reserve_a, share_amount, self.total_shares)?;
        let out_b = pool_math::redeem_amount(self.reserve_b, share_amount, self.total_shares)?;

        // out <= reserve and share_amount <= balance <= total_shares
        let new_reserve_a = self.reserve_a - out_a;
        let new_reserve_b = self.reserve_b - out_b;
        let new_total = self.total_shares - share_amount;
        let new_balance = balance - share_amount;

        // Step 2: Push both assets
        self.ledger_a.transfer_out_of(caller, out_a);
        self.ledger_b.transfer_out_of(caller, out_b);

        // Step 3: Commit
        self.reserve_a = new_reserve_a;
        self.reserve_b = new_reserve_b;
        self.total_shares = new_total;
        if new_balance == 0 {
            self.shares.remove(caller);
        } else {
            self.shares.insert(*caller, new_balance);
        }

        info!(
            "{}: {} burned {} shares for {} + {}",
            self.config.id,
            caller,
            share_amount,
            self.config.asset_a.format_amount(out_a),
            self.config.asset_b.format_amount(out_b)
        );
        Ok((out_a, out_b))
    }
}

// ============================================================================
// Swaps
// ============================================================================

impl<A, B> Pool<A, B>
where
    A: AssetLedger,
    B: AssetLedger,
{
    /// Swap an exact amount of A for B
    pub fn swap_a_for_b(&mut self, caller: &AccountId, amount_in: u128) -> Result<u128> {
        self.swap_exact_in(caller, SwapDirection::AToB, amount_in, 0)
    }

    /// Swap an exact amount of B for A
    pub fn swap_b_for_a(&mut self, caller: &AccountId, amount_in: u128) -> Result<u128> {
        self.swap_exact_in(caller, SwapDirection::BToA, amount_in, 0)
    }

    /// Swap an exact input, failing if the output is below `min_amount_out`
    ///
    /// The whole input (fee included) stays in the pool; the output reserve
    /// drops by exactly the returned amount and never reaches zero.
    ///
    /// # Returns
    /// * Amount of the output asset paid to `caller`
    pub fn swap_exact_in(
        &mut self,
        caller: &AccountId,
        direction: SwapDirection,
        amount_in: u128,
        min_amount_out: u128,
    ) -> Result<u128> {
        // Step 1: Price against current reserves (validates input and reserves)
        let quote = self.quote(direction, amount_in)?;
        if quote.amount_out < min_amount_out {
            return Err(PoolError::SlippageExceeded {
                expected_min: min_amount_out,
                actual: quote.amount_out,
            });
        }
        debug!(
            "{}: {:?} in={} out={} reserves=({}, {})",
            self.config.id, direction, amount_in, quote.amount_out, self.reserve_a, self.reserve_b
        );

        // Step 2: Pull input, push output
        match direction {
            SwapDirection::AToB => {
                self.ledger_a.transfer_into(caller, amount_in)?;
                self.ledger_b.transfer_out_of(caller, quote.amount_out);
            }
            SwapDirection::BToA => {
                self.ledger_b.transfer_into(caller, amount_in)?;
                self.ledger_a.transfer_out_of(caller, quote.amount_out);
            }
        }

        // Step 3: Commit
        match direction {
            SwapDirection::AToB => {
                self.reserve_a = quote.new_reserve_in;
                self.reserve_b = quote.new_reserve_out;
            }
            SwapDirection::BToA => {
                self.reserve_b = quote.new_reserve_in;
                self.reserve_a = quote.new_reserve_out;
            }
        }

        let (sym_in, sym_out, fmt_in, fmt_out) = match direction {
            SwapDirection::AToB => (
                &self.config.asset_a.symbol,
                &self.config.asset_b.symbol,
                self.config.asset_a.format_amount(amount_in),
                self.config.asset_b.format_amount(quote.amount_out),
            ),
            SwapDirection::BToA => (
                &self.config.asset_b.symbol,
                &self.config.asset_a.symbol,
                self.config.asset_b.format_amount(amount_in),
                self.config.asset_a.format_amount(quote.amount_out),
            ),
        };
        info!(
            "{}: {} swapped {} {} for {} {}",
            self.config.id, caller, fmt_in, sym_in, fmt_out, sym_out
        );
        Ok(quote.amount_out)
    }
}
