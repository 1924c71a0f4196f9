//! Pool Math - Pure constant product formulas (x·y=k) for a two-asset pool
//!
//! This crate holds the integer-only arithmetic behind the `pairswap` pool:
//! the fee-adjusted swap output, first and subsequent share minting, and
//! proportional redemption. Everything here is total and side-effect free so
//! the same functions can be checked with Kani and reused by the engine.
//!
//! Products of two `u128` amounts are evaluated in [`U256`] so that
//! 18-decimal token amounts never overflow an intermediate.

#![no_std]
#![forbid(unsafe_code)]

pub mod math;
pub mod wide;

pub use math::{
    get_amount_out, initial_shares, invariant, mul_div_floor, proportional_shares,
    quote_exact_in, ratio_matches, redeem_amount, spot_price, SwapQuote,
};
pub use wide::U256;

/// Fee numerator: the share of the input that counts toward the invariant
/// (997 / 1000 = 0.3% fee)
pub const FEE_NUMERATOR: u128 = 997;

/// Fee denominator
pub const FEE_DENOMINATOR: u128 = 1000;

/// Error types for pool math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// A reserve used for pricing or proportional math is zero
    EmptyReserve,
    /// A result or intermediate exceeded its integer width
    Overflow,
}
