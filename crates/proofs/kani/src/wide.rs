//! Kani proofs for the 256-bit helper

use pool_math::U256;

/// Widening multiply agrees with native u128 multiply whenever the latter fits
#[kani::proof]
fn w1_widening_mul_matches_native() {
    let a: u64 = kani::any();
    let b: u64 = kani::any();
    let wide = U256::widening_mul(a as u128, b as u128);
    assert_eq!(wide.to_u128(), Some(a as u128 * b as u128));
}

/// Division agrees with native u128 division on the low half
#[kani::proof]
#[kani::unwind(258)]
fn w2_div_matches_native() {
    let n: u64 = kani::any();
    let d: u64 = kani::any();
    kani::assume(d > 0);
    let q = U256::from_u128(n as u128).checked_div(U256::from_u128(d as u128));
    assert_eq!(q, Some(U256::from_u128((n / d) as u128)));
}

/// isqrt returns the floor square root
#[kani::proof]
#[kani::unwind(130)]
fn w3_isqrt_is_floor() {
    let v: u64 = kani::any();
    let r = U256::from_u128(v as u128).isqrt();
    assert!(r * r <= v as u128);
    assert!((r + 1) * (r + 1) > v as u128);
}
