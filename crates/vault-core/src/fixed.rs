//! Exact rational arithmetic for pricing.
//!
//! Every quantity that feeds a quote (ppm fractions, leverage, skew, oracle
//! price in subticks) is a `Ratio` over arbitrary-precision integers. Nodes
//! re-executing a block must agree bit for bit, so floating point is never
//! used and every conversion back to an integer names its `Rounding`.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;

use crate::error::{CoreError, Result};

/// Parts-per-million denominator.
pub const ONE_MILLION: u32 = 1_000_000;

/// Largest power-of-ten magnitude `Ratio::pow10` accepts.
pub const MAX_POW10_EXPONENT: u32 = 64;

/// Rounding mode for rational → integer conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate toward zero.
    TowardZero,
    /// Round toward negative infinity.
    Floor,
    /// Round toward positive infinity.
    Ceiling,
}

/// Signed rational number `num / den`.
///
/// Always normalised: `den > 0` and `gcd(num, den) == 1`, so structural
/// equality is numeric equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ratio {
    num: BigInt,
    den: BigInt,
}

impl Ratio {
    /// Create `num / den`.
    pub fn new(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Result<Self> {
        let den = den.into();
        if den.is_zero() {
            return Err(CoreError::ZeroDenominator);
        }
        Ok(Self::normalized(num.into(), den))
    }

    pub fn zero() -> Self {
        Self {
            num: BigInt::zero(),
            den: BigInt::one(),
        }
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            num: value.into(),
            den: BigInt::one(),
        }
    }

    /// Fraction from a parts-per-million value (1_000_000 = 1.0).
    pub fn from_ppm(ppm: u32) -> Self {
        Self::normalized(BigInt::from(ppm), BigInt::from(ONE_MILLION))
    }

    /// `10^exp`; negative exponents yield `1 / 10^|exp|`.
    ///
    /// Fails with `Overflow` when `|exp|` exceeds [`MAX_POW10_EXPONENT`].
    pub fn pow10(exp: i32) -> Result<Self> {
        if exp.unsigned_abs() > MAX_POW10_EXPONENT {
            return Err(CoreError::Overflow(format!("10^{exp}")));
        }
        let magnitude = BigInt::from(10u32).pow(exp.unsigned_abs());
        if exp >= 0 {
            Ok(Self::from_integer(magnitude))
        } else {
            Ok(Self {
                num: BigInt::one(),
                den: magnitude,
            })
        }
    }

    fn normalized(num: BigInt, den: BigInt) -> Self {
        let (num, den) = if den.is_negative() {
            (-num, -den)
        } else {
            (num, den)
        };
        let g = num.gcd(&den);
        if g.is_zero() || g.is_one() {
            return Self { num, den };
        }
        Self {
            num: num / &g,
            den: den / &g,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.num.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.num.is_negative()
    }

    /// Checked division; fails when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Ratio) -> Result<Self> {
        if rhs.is_zero() {
            return Err(CoreError::DivisionByZero);
        }
        Ok(Self::normalized(&self.num * &rhs.den, &self.den * &rhs.num))
    }

    /// Convert to an integer with the given rounding mode.
    pub fn to_integer(&self, rounding: Rounding) -> BigInt {
        match rounding {
            Rounding::TowardZero => &self.num / &self.den,
            Rounding::Floor => self.num.div_floor(&self.den),
            Rounding::Ceiling => -((-&self.num).div_floor(&self.den)),
        }
    }

    /// Round to an integer multiple of `step`.
    ///
    /// `self / step` is rounded with `rounding`, then multiplied back.
    pub fn round_to_multiple(&self, step: u64, rounding: Rounding) -> Result<BigInt> {
        if step == 0 {
            return Err(CoreError::InvalidStep);
        }
        let step = BigInt::from(step);
        let quotient = Self::normalized(self.num.clone(), &self.den * &step);
        Ok(quotient.to_integer(rounding) * step)
    }

    /// Lossy view for logs and metrics. Never feed the result back into pricing.
    pub fn to_decimal(&self) -> Option<Decimal> {
        for scale in [18u32, 12, 6, 0] {
            let scaled = (&self.num * BigInt::from(10u32).pow(scale)) / &self.den;
            if let Some(mantissa) = scaled.to_i128() {
                if let Ok(d) = Decimal::try_from_i128_with_scale(mantissa, scale) {
                    return Some(d.normalize());
                }
            }
        }
        None
    }
}

/// Narrow an integer to `u64`, failing on negative or oversized values.
pub fn to_u64(value: &BigInt, what: &str) -> Result<u64> {
    value
        .to_u64()
        .ok_or_else(|| CoreError::Overflow(format!("{what}={value}")))
}

impl Default for Ratio {
    fn default() -> Self {
        Self::zero()
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl<'a> Add<&'a Ratio> for &'a Ratio {
    type Output = Ratio;

    fn add(self, rhs: &'a Ratio) -> Ratio {
        Ratio::normalized(
            &self.num * &rhs.den + &rhs.num * &self.den,
            &self.den * &rhs.den,
        )
    }
}

impl<'a> Sub<&'a Ratio> for &'a Ratio {
    type Output = Ratio;

    fn sub(self, rhs: &'a Ratio) -> Ratio {
        Ratio::normalized(
            &self.num * &rhs.den - &rhs.num * &self.den,
            &self.den * &rhs.den,
        )
    }
}

impl<'a> Mul<&'a Ratio> for &'a Ratio {
    type Output = Ratio;

    fn mul(self, rhs: &'a Ratio) -> Ratio {
        Ratio::normalized(&self.num * &rhs.num, &self.den * &rhs.den)
    }
}

impl Add for Ratio {
    type Output = Ratio;

    fn add(self, rhs: Ratio) -> Ratio {
        &self + &rhs
    }
}

impl Sub for Ratio {
    type Output = Ratio;

    fn sub(self, rhs: Ratio) -> Ratio {
        &self - &rhs
    }
}

impl Mul for Ratio {
    type Output = Ratio;

    fn mul(self, rhs: Ratio) -> Ratio {
        &self * &rhs
    }
}

impl Neg for Ratio {
    type Output = Ratio;

    fn neg(self) -> Ratio {
        Ratio {
            num: -self.num,
            den: self.den,
        }
    }
}

impl Neg for &Ratio {
    type Output = Ratio;

    fn neg(self) -> Ratio {
        Ratio {
            num: -&self.num,
            den: self.den.clone(),
        }
    }
}
