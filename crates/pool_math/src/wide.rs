//! Wide 256-bit unsigned integer for intermediate products
//!
//! Only the operations the pool formulas need are implemented: widening
//! multiplication of two `u128`, checked add / multiply, floor division and
//! integer square root. Results that must fit back into `u128` are narrowed
//! with [`U256::to_u128`].

/// Unsigned 256-bit integer stored as (hi, lo) halves.
///
/// Field order matters: the derived `Ord` compares `hi` first, which is the
/// numeric ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U256 {
    hi: u128,
    lo: u128,
}

impl U256 {
    pub const ZERO: Self = Self { hi: 0, lo: 0 };
    pub const MAX: Self = Self { hi: u128::MAX, lo: u128::MAX };

    pub const fn from_u128(v: u128) -> Self {
        Self { hi: 0, lo: v }
    }

    pub const fn from_parts(hi: u128, lo: u128) -> Self {
        Self { hi, lo }
    }

    pub const fn hi(&self) -> u128 {
        self.hi
    }

    pub const fn lo(&self) -> u128 {
        self.lo
    }

    pub const fn is_zero(&self) -> bool {
        self.hi == 0 && self.lo == 0
    }

    /// Narrow back to `u128`, `None` if the high half is set
    pub const fn to_u128(&self) -> Option<u128> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    pub const fn leading_zeros(&self) -> u32 {
        if self.hi == 0 {
            128 + self.lo.leading_zeros()
        } else {
            self.hi.leading_zeros()
        }
    }

    /// Multiply two u128 values, producing the full 256-bit product.
    pub const fn widening_mul(a: u128, b: u128) -> Self {
        // Schoolbook multiplication on 64-bit halves.
        let a_lo = a as u64 as u128;
        let a_hi = a >> 64;
        let b_lo = b as u64 as u128;
        let b_hi = b >> 64;

        let ll = a_lo * b_lo;
        let lh = a_lo * b_hi;
        let hl = a_hi * b_lo;
        let hh = a_hi * b_hi;

        // result = hh << 128 + (lh + hl) << 64 + ll
        let mid = lh.wrapping_add(hl);
        let mid_overflow = if mid < lh { 1u128 } else { 0u128 };

        let lo = ll.wrapping_add(mid << 64);
        let carry = if lo < ll { 1u128 } else { 0u128 };
        let hi = hh + (mid >> 64) + (mid_overflow << 64) + carry;

        Self { hi, lo }
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let (lo, carry) = self.lo.overflowing_add(rhs.lo);
        let hi = self.hi.checked_add(rhs.hi)?.checked_add(carry as u128)?;
        Some(Self { hi, lo })
    }

    /// Multiply by a u128, `None` if the product needs more than 256 bits
    pub fn checked_mul_u128(self, rhs: u128) -> Option<Self> {
        let lo_prod = Self::widening_mul(self.lo, rhs);
        let hi_prod = Self::widening_mul(self.hi, rhs);
        if hi_prod.hi != 0 {
            return None;
        }
        let hi = lo_prod.hi.checked_add(hi_prod.lo)?;
        Some(Self { hi, lo: lo_prod.lo })
    }

    /// Floor division, `None` on a zero divisor
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        if self < rhs {
            return Some(Self::ZERO);
        }
        if self.hi == 0 {
            // rhs <= self, so rhs fits in the low half as well
            return Some(Self::from_u128(self.lo / rhs.lo));
        }

        // Restoring binary long division from the dividend's top bit down.
        let bits = 256 - self.leading_zeros();
        let mut quotient = Self::ZERO;
        let mut remainder = Self::ZERO;
        for i in (0..bits).rev() {
            let carry = remainder.hi >> 127 == 1;
            remainder = remainder.shl1();
            if self.bit(i) {
                remainder.lo |= 1;
            }
            if carry || remainder >= rhs {
                remainder = remainder.wrapping_sub(rhs);
                quotient.set_bit(i);
            }
        }
        Some(quotient)
    }

    /// Floor of the square root. The root of a 256-bit value always fits u128.
    pub fn isqrt(self) -> u128 {
        let root_bits = (256 - self.leading_zeros() + 1) / 2;
        let mut root: u128 = 0;
        for bit in (0..root_bits).rev() {
            let candidate = root | (1u128 << bit);
            if Self::widening_mul(candidate, candidate) <= self {
                root = candidate;
            }
        }
        root
    }

    fn wrapping_sub(self, rhs: Self) -> Self {
        let (lo, borrow) = self.lo.overflowing_sub(rhs.lo);
        let hi = self.hi.wrapping_sub(rhs.hi).wrapping_sub(borrow as u128);
        Self { hi, lo }
    }

    fn shl1(self) -> Self {
        Self {
            hi: (self.hi << 1) | (self.lo >> 127),
            lo: self.lo << 1,
        }
    }

    fn bit(&self, i: u32) -> bool {
        if i >= 128 {
            (self.hi >> (i - 128)) & 1 == 1
        } else {
            (self.lo >> i) & 1 == 1
        }
    }

    fn set_bit(&mut self, i: u32) {
        if i >= 128 {
            self.hi |= 1u128 << (i - 128);
        } else {
            self.lo |= 1u128 << i;
        }
    }
}

impl From<u128> for U256 {
    fn from(v: u128) -> Self {
        Self::from_u128(v)
    }
}
