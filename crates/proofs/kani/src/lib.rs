//! Kani harnesses for the pool math
//!
//! Run with: cargo kani -p proofs-kani
//! Single harness: cargo kani -p proofs-kani --harness <name>

#![cfg(kani)]

mod amm;
mod wide;
