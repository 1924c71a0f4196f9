//! Constant product pool math (x·y=k)
//!
//! Every function divides last and floors, so rounding always favours the
//! reserve that remains in the pool.

use crate::{MathError, FEE_DENOMINATOR, FEE_NUMERATOR, U256};

/// Result of pricing a swap against a pair of reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    /// Amount of the output asset the caller receives
    pub amount_out: u128,

    /// Input-side reserve after the swap (full input, fee included)
    pub new_reserve_in: u128,

    /// Output-side reserve after the swap
    pub new_reserve_out: u128,
}

/// Output amount for an exact input, with the 0.3% fee taken on input
///
/// - Δin_net = Δin · 997
/// - Δout = Δin_net · y / (x · 1000 + Δin_net)
///
/// This keeps `x·y` constant when only the fee-reduced input is counted, so
/// once the full input lands in the pool the product strictly grows.
///
/// # Arguments
/// * `amount_in` - Input amount (0 is accepted and yields 0)
/// * `reserve_in` - Input-side reserve
/// * `reserve_out` - Output-side reserve
///
/// # Returns
/// * Output amount, always strictly below `reserve_out`
/// * `MathError::EmptyReserve` if either reserve is zero
/// * `MathError::Overflow` if `amount_in · 997 · reserve_out` exceeds 256 bits
pub fn get_amount_out(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<u128, MathError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(MathError::EmptyReserve);
    }

    let amount_in_after_fee = U256::widening_mul(amount_in, FEE_NUMERATOR);
    let numerator = amount_in_after_fee
        .checked_mul_u128(reserve_out)
        .ok_or(MathError::Overflow)?;
    let denominator = U256::widening_mul(reserve_in, FEE_DENOMINATOR)
        .checked_add(amount_in_after_fee)
        .ok_or(MathError::Overflow)?;

    // denominator > 0 because reserve_in > 0, and amount_out < reserve_out
    // fits u128, so neither step can fail once the products are formed
    numerator
        .checked_div(denominator)
        .and_then(|q| q.to_u128())
        .ok_or(MathError::Overflow)
}

/// Price an exact-input swap and compute the resulting reserves
pub fn quote_exact_in(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<SwapQuote, MathError> {
    let amount_out = get_amount_out(amount_in, reserve_in, reserve_out)?;
    let new_reserve_in = reserve_in
        .checked_add(amount_in)
        .ok_or(MathError::Overflow)?;

    Ok(SwapQuote {
        amount_out,
        new_reserve_in,
        new_reserve_out: reserve_out - amount_out,
    })
}

/// Shares minted by the first deposit: floor(sqrt(a · b))
///
/// Strictly positive whenever both amounts are positive.
pub fn initial_shares(amount_a: u128, amount_b: u128) -> u128 {
    U256::widening_mul(amount_a, amount_b).isqrt()
}

/// Whether a deposit matches the reserve ratio exactly: a · rB == b · rA
pub fn ratio_matches(amount_a: u128, amount_b: u128, reserve_a: u128, reserve_b: u128) -> bool {
    U256::widening_mul(amount_a, reserve_b) == U256::widening_mul(amount_b, reserve_a)
}

/// floor(a · b / denominator) with a 256-bit intermediate
///
/// # Returns
/// * `MathError::EmptyReserve` if `denominator` is zero
/// * `MathError::Overflow` if the quotient does not fit u128
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::EmptyReserve);
    }
    U256::widening_mul(a, b)
        .checked_div(U256::from_u128(denominator))
        .and_then(|q| q.to_u128())
        .ok_or(MathError::Overflow)
}

/// Shares minted by a ratio-exact deposit into a funded pool
///
/// floor(total_shares · amount_a / reserve_a). Flooring means the depositor,
/// not the existing holders, absorbs the rounding.
pub fn proportional_shares(
    total_shares: u128,
    amount_a: u128,
    reserve_a: u128,
) -> Result<u128, MathError> {
    mul_div_floor(total_shares, amount_a, reserve_a)
}

/// Amount of one reserve redeemed by burning `shares` out of `total_shares`
///
/// floor(reserve · shares / total_shares). With `shares == total_shares` the
/// full reserve is returned, leaving no dust.
pub fn redeem_amount(reserve: u128, shares: u128, total_shares: u128) -> Result<u128, MathError> {
    mul_div_floor(reserve, shares, total_shares)
}

/// Spot price of A in B: floor(reserve_b / reserve_a), 0 if A is empty
pub fn spot_price(reserve_a: u128, reserve_b: u128) -> u128 {
    if reserve_a == 0 {
        0
    } else {
        reserve_b / reserve_a
    }
}

/// The constant product k = x · y
pub fn invariant(reserve_a: u128, reserve_b: u128) -> U256 {
    U256::widening_mul(reserve_a, reserve_b)
}
