//! Kani proofs for the constant product formulas
//!
//! - **A1: Invariant Strictly Grows** - every non-zero swap raises x·y
//! - **A2: Reserve Never Drained** - output stays strictly below the reserve
//! - **A3: Fee Bound** - output never exceeds the fee-free output
//! - **A4: Deterministic** - same inputs always produce same outputs
//! - **A5: Exact Exit** - burning every share redeems the whole reserve
//! - **A6: First Mint Positive** - a positive first deposit mints shares
//!
//! Inputs are bounded to u64 so the 256-bit division loop stays tractable.

use pool_math::{
    get_amount_out, initial_shares, invariant, proportional_shares, quote_exact_in,
    ratio_matches, redeem_amount, U256,
};

fn any_positive_u64() -> u128 {
    let v: u64 = kani::any();
    kani::assume(v > 0);
    v as u128
}

/// A1: x·y strictly increases after any positive swap
#[kani::proof]
#[kani::unwind(258)]
fn a1_invariant_strictly_grows() {
    let reserve_in = any_positive_u64();
    let reserve_out = any_positive_u64();
    let amount_in = any_positive_u64();

    let k0 = invariant(reserve_in, reserve_out);
    if let Ok(q) = quote_exact_in(amount_in, reserve_in, reserve_out) {
        let k1 = invariant(q.new_reserve_in, q.new_reserve_out);
        assert!(k1 > k0, "A1: invariant must strictly grow");
    }
}

/// A2: a swap can never pay out the whole output reserve
#[kani::proof]
#[kani::unwind(258)]
fn a2_output_below_reserve() {
    let reserve_in = any_positive_u64();
    let reserve_out = any_positive_u64();
    let amount_in: u64 = kani::any();

    let out = get_amount_out(amount_in as u128, reserve_in, reserve_out);
    assert!(out.is_ok(), "A2: u64 inputs never overflow");
    if let Ok(out) = out {
        assert!(out < reserve_out, "A2: output must stay below reserve");
    }
}

/// A3: output <= amount_in · reserve_out / (reserve_in + amount_in)
#[kani::proof]
#[kani::unwind(258)]
fn a3_fee_never_favors_trader() {
    let reserve_in = any_positive_u64();
    let reserve_out = any_positive_u64();
    let amount_in = any_positive_u64();

    if let Ok(out) = get_amount_out(amount_in, reserve_in, reserve_out) {
        let lhs = U256::widening_mul(out, reserve_in + amount_in);
        let rhs = U256::widening_mul(amount_in, reserve_out);
        assert!(lhs <= rhs, "A3: fee-adjusted output exceeds fee-free output");
    }
}

/// A4: quoting twice gives the same answer
#[kani::proof]
#[kani::unwind(258)]
fn a4_deterministic() {
    let reserve_in = any_positive_u64();
    let reserve_out = any_positive_u64();
    let amount_in: u64 = kani::any();

    let r1 = quote_exact_in(amount_in as u128, reserve_in, reserve_out);
    let r2 = quote_exact_in(amount_in as u128, reserve_in, reserve_out);
    assert_eq!(r1, r2, "A4: quote must be deterministic");
}

/// A5: the last holder gets the exact reserve, a partial holder strictly less
#[kani::proof]
#[kani::unwind(258)]
fn a5_full_redeem_is_exact() {
    let reserve = any_positive_u64();
    let total = any_positive_u64();
    let shares: u64 = kani::any();
    kani::assume((shares as u128) < total);

    assert_eq!(redeem_amount(reserve, total, total), Ok(reserve), "A5: full exit must be exact");
    if let Ok(partial) = redeem_amount(reserve, shares as u128, total) {
        assert!(partial < reserve, "A5: partial exit must leave a remainder");
    }
}

/// A6: a first deposit of two positive amounts mints at least one share
#[kani::proof]
#[kani::unwind(130)]
fn a6_first_mint_positive() {
    let a = any_positive_u64();
    let b = any_positive_u64();

    let minted = initial_shares(a, b);
    assert!(minted > 0, "A6: first mint must be positive");
    assert!(minted <= a.max(b), "A6: geometric mean bounded by larger side");
}

/// A7: a ratio-exact deposit of m times the reserves mints m times the supply
#[kani::proof]
#[kani::unwind(258)]
fn a7_proportional_mint_scales() {
    let reserve_a: u32 = kani::any();
    let reserve_b: u32 = kani::any();
    let m: u8 = kani::any();
    kani::assume(reserve_a > 0 && reserve_b > 0 && m > 0);
    let (reserve_a, reserve_b, m) = (reserve_a as u128, reserve_b as u128, m as u128);

    assert!(ratio_matches(reserve_a * m, reserve_b * m, reserve_a, reserve_b));

    let total = initial_shares(reserve_a, reserve_b);
    assert_eq!(
        proportional_shares(total, reserve_a * m, reserve_a),
        Ok(total * m),
        "A7: proportional mint must scale exactly"
    );
}
