//! Fixed-point numbers of any register width up to 63 bits
//!
//! `Fixed<S, I, F>` has `I` integer bits and `F` fraction bits, signed when
//! `S` is true. Values are kept in an `i128` holding the scaled value
//! (`value * 2^F`), always wrapped into `I + F` bits the way two's-complement
//! hardware registers behave.

use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Rem, Shl, Shr, Sub};

/// A wrapping fixed-point value.
///
/// `I + F` must be between 1 and 63, checked at compile time. Every
/// intermediate result then fits the `i128` backing store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed<const S: bool, const I: u32, const F: u32> {
    raw: i128,
}

/// Unsigned 10.2, RDP screen coordinates.
pub type Coord = Fixed<false, 10, 2>;
/// Unsigned 0.16, texture scale factors.
pub type Scale = Fixed<false, 0, 16>;
/// Unsigned 1.11, LOADBLOCK texel line increment.
pub type Dxt = Fixed<false, 1, 11>;
/// Unsigned 0.8, LOD fractions.
pub type Frac8 = Fixed<false, 0, 8>;
/// Unsigned 4.8, chroma key widths.
pub type KeyWidth = Fixed<false, 4, 8>;

impl<const S: bool, const I: u32, const F: u32> Fixed<S, I, F> {
    pub const WIDTH: u32 = I + F;

    const VALID: () = assert!(I + F >= 1 && I + F <= 63, "fixed width must be 1..=63 bits");

    fn wrap(v: i128) -> i128 {
        let () = Self::VALID;
        let modulus = 1i128 << Self::WIDTH;
        let m = v & (modulus - 1);
        if S && m >= modulus >> 1 {
            m - modulus
        } else {
            m
        }
    }

    /// Build from an already-scaled value (`raw = value * 2^F`).
    pub fn from_raw(raw: i128) -> Self {
        Fixed {
            raw: Self::wrap(raw),
        }
    }

    /// Build from the unsigned bit pattern found in a register field.
    pub fn from_bits(bits: u64) -> Self {
        Self::from_raw(bits as i128)
    }

    /// Build from a whole number, shifting it into place.
    pub fn from_int(value: i128) -> Self {
        Self::from_raw(value << F)
    }

    /// The scaled value, sign included.
    pub fn raw(self) -> i128 {
        self.raw
    }

    /// The `I + F` bit two's-complement pattern.
    pub fn bits(self) -> u64 {
        (self.raw & ((1i128 << Self::WIDTH) - 1)) as u64
    }

    pub fn is_signed(self) -> bool {
        S
    }

    /// Integer part, rounded toward negative infinity.
    pub fn floor(self) -> i128 {
        self.raw >> F
    }

    pub fn to_f64(self) -> f64 {
        self.raw as f64 / (1u128 << F) as f64
    }

    pub fn max_value() -> Self {
        if S {
            Fixed {
                raw: (1i128 << (Self::WIDTH - 1)) - 1,
            }
        } else {
            Fixed {
                raw: (1i128 << Self::WIDTH) - 1,
            }
        }
    }

    pub fn min_value() -> Self {
        if S {
            Fixed {
                raw: -(1i128 << (Self::WIDTH - 1)),
            }
        } else {
            Fixed { raw: 0 }
        }
    }

    /// Convert to a differently parameterised fixed type.
    ///
    /// A negative signed value is first reinterpreted as its unsigned bit
    /// pattern when the target is unsigned, then the value is rescaled to the
    /// target's fraction width (truncating when bits are dropped) and masked
    /// into the target's width.
    pub fn convert<const S2: bool, const I2: u32, const F2: u32>(self) -> Fixed<S2, I2, F2> {
        let mut v = self.raw;
        if S && !S2 && v < 0 {
            v += 1i128 << Self::WIDTH;
        }
        let v = if F2 >= F { v << (F2 - F) } else { v >> (F - F2) };
        Fixed::<S2, I2, F2>::from_raw(v)
    }

    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.raw == 0 {
            None
        } else {
            Some(self / rhs)
        }
    }
}

impl<const S: bool, const I: u32, const F: u32> Add for Fixed<S, I, F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::from_raw(self.raw + rhs.raw)
    }
}

impl<const S: bool, const I: u32, const F: u32> Sub for Fixed<S, I, F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(self.raw - rhs.raw)
    }
}

impl<const S: bool, const I: u32, const F: u32> Mul for Fixed<S, I, F> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::from_raw((self.raw * rhs.raw) >> F)
    }
}

/// Truncates toward zero like integer division. Panics on a zero divisor.
impl<const S: bool, const I: u32, const F: u32> Div for Fixed<S, I, F> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::from_raw((self.raw << F) / rhs.raw)
    }
}

impl<const S: bool, const I: u32, const F: u32> Rem for Fixed<S, I, F> {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        Self::from_raw(self.raw % rhs.raw)
    }
}

impl<const S: bool, const I: u32, const F: u32> Neg for Fixed<S, I, F> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::from_raw(-self.raw)
    }
}

impl<const S: bool, const I: u32, const F: u32> BitAnd for Fixed<S, I, F> {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self::from_raw(self.raw & rhs.raw)
    }
}

impl<const S: bool, const I: u32, const F: u32> BitOr for Fixed<S, I, F> {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self::from_raw(self.raw | rhs.raw)
    }
}

impl<const S: bool, const I: u32, const F: u32> BitXor for Fixed<S, I, F> {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        Self::from_raw(self.raw ^ rhs.raw)
    }
}

impl<const S: bool, const I: u32, const F: u32> Shl<u32> for Fixed<S, I, F> {
    type Output = Self;
    fn shl(self, rhs: u32) -> Self {
        if rhs >= Self::WIDTH {
            return Self::from_raw(0);
        }
        Self::from_raw(self.raw << rhs)
    }
}

impl<const S: bool, const I: u32, const F: u32> Shr<u32> for Fixed<S, I, F> {
    type Output = Self;
    fn shr(self, rhs: u32) -> Self {
        Self::from_raw(self.raw >> rhs.min(127))
    }
}

impl<const S: bool, const I: u32, const F: u32> fmt::Display for Fixed<S, I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl<const S: bool, const I: u32, const F: u32> fmt::Debug for Fixed<S, I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Q{}.{}({})",
            if S { "s" } else { "u" },
            I,
            F,
            self.to_f64()
        )
    }
}
