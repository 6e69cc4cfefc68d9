//! Exact decimal arithmetic for money, share counts, prices and ratios.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Every quantity in a cap table. Round-trips through JSON as a plain number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub const ZERO: Decimal = Decimal(RustDecimal::ZERO);
    pub const ONE: Decimal = Decimal(RustDecimal::ONE);

    /// # Errors
    /// When `s` is not a decimal literal.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Trailing zeros stripped, never in exponent form.
    pub fn to_canonical_string(&self) -> String {
        self.0.normalize().to_string()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > RustDecimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < RustDecimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    pub fn floor(&self) -> Self {
        Decimal(self.0.floor())
    }

    /// `max(self, 0)`.
    pub fn max_zero(self) -> Self {
        self.max(Self::ZERO)
    }

    /// `self × numerator / denominator`, multiplying first while the product
    /// fits and scaling by the ratio otherwise. Zero when `denominator` is 0.
    pub fn mul_div(self, numerator: Decimal, denominator: Decimal) -> Decimal {
        if denominator.is_zero() {
            return Self::ZERO;
        }
        match self.0.checked_mul(numerator.0) {
            Some(product) => Decimal(product) / denominator,
            None => self * (numerator / denominator),
        }
    }

    /// Bound reached by an operation whose exact result is unrepresentable.
    fn saturated(lhs: Decimal, rhs: Decimal) -> Decimal {
        if lhs.is_zero() {
            return Self::ZERO;
        }
        let negative = lhs.is_negative() != rhs.is_negative() && !rhs.is_zero();
        if negative {
            Decimal(RustDecimal::MIN)
        } else {
            Decimal(RustDecimal::MAX)
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

macro_rules! from_integer {
    ($($int:ty),*) => {$(
        impl From<$int> for Decimal {
            fn from(value: $int) -> Self {
                Decimal(RustDecimal::from(value))
            }
        }
    )*};
}

from_integer!(u32, i64);

// Saturates at the representable bound instead of panicking; a zero
// divisor behaves like a float division (signed bound, or 0 for 0/0).
macro_rules! binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $checked:ident) => {
        impl $trait for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                match self.0.$checked(rhs.0) {
                    Some(value) => Decimal(value),
                    None => Decimal::saturated(self, rhs),
                }
            }
        }

        impl $assign_trait for Decimal {
            fn $assign_method(&mut self, rhs: Decimal) {
                *self = $trait::$method(*self, rhs);
            }
        }
    };
}

binary_op!(Add, add, AddAssign, add_assign, checked_add);
binary_op!(Sub, sub, SubAssign, sub_assign, checked_sub);
binary_op!(Mul, mul, MulAssign, mul_assign, checked_mul);
binary_op!(Div, div, DivAssign, div_assign, checked_div);

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
