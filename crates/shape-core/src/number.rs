//! # Exact Numeric Semantics
//!
//! JSON numbers arrive as `serde_json::Number`, which stores either an
//! integer (`i64`/`u64`) or an `f64`. Binary floats cannot represent most
//! decimal fractions, so a remainder test such as `0.07 % 0.01` in `f64`
//! misreports divisibility. This module re-reads every number as a
//! [`Decimal`] (an `i128` mantissa scaled by a power of ten) taken from its
//! shortest round-trip text, and does comparison and divisibility in that
//! exact representation.
//!
//! A number whose mantissa does not fit in `i128`, or an operation whose
//! scaling overflows, falls back to `f64` arithmetic. Such values are far
//! outside the range where decimal intent can be recovered anyway.

use std::cmp::Ordering;

use serde_json::Number;

/// Largest power-of-ten shift attempted before giving up on exact
/// divisibility. `f64` exponents span roughly 10^-324 to 10^308.
const MAX_SHIFT: i64 = 4096;

/// A finite decimal `mantissa * 10^exponent`, normalized so the mantissa
/// carries no trailing zeros (zero is stored as `0 * 10^0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    exponent: i32,
}

impl Decimal {
    /// Build a normalized decimal.
    pub fn new(mantissa: i128, exponent: i32) -> Self {
        if mantissa == 0 {
            return Self {
                mantissa: 0,
                exponent: 0,
            };
        }
        let mut mantissa = mantissa;
        let mut exponent = exponent;
        while mantissa % 10 == 0 {
            match exponent.checked_add(1) {
                Some(e) => {
                    mantissa /= 10;
                    exponent = e;
                }
                None => break,
            }
        }
        Self { mantissa, exponent }
    }

    /// Read a JSON number exactly.
    ///
    /// Integers convert directly; floats are parsed from their shortest
    /// round-trip representation. Returns `None` when the digits overflow
    /// the `i128` mantissa.
    pub fn from_number(n: &Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            return Some(Self::new(i128::from(i), 0));
        }
        if let Some(u) = n.as_u64() {
            return Some(Self::new(i128::from(u), 0));
        }
        Self::parse(&n.to_string())
    }

    /// Parse decimal text of the form `-?digits(.digits)?([eE][+-]?digits)?`.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (body, exponent) = match rest.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&rest[..i], rest[i + 1..].parse::<i32>().ok()?),
            None => (rest, 0),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            if !b.is_ascii_digit() {
                return None;
            }
            mantissa = mantissa
                .checked_mul(10)?
                .checked_add(i128::from(b - b'0'))?;
        }
        let frac_len = i32::try_from(frac_part.len()).ok()?;
        let exponent = exponent.checked_sub(frac_len)?;
        Some(Self::new(
            if negative { -mantissa } else { mantissa },
            exponent,
        ))
    }

    /// Returns true if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Returns true if the value is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.mantissa > 0
    }

    /// Returns true if the value has no fractional part.
    pub fn is_integral(&self) -> bool {
        self.exponent >= 0 || self.mantissa == 0
    }

    /// Exact comparison. `None` when aligning the exponents overflows.
    pub fn checked_cmp(&self, other: &Self) -> Option<Ordering> {
        let sign = self.mantissa.signum().cmp(&other.mantissa.signum());
        if sign != Ordering::Equal || self.mantissa == 0 {
            return Some(sign);
        }
        let common = self.exponent.min(other.exponent);
        let left = scale(self.mantissa, self.exponent, common)?;
        let right = scale(other.mantissa, other.exponent, common)?;
        Some(left.cmp(&right))
    }

    /// Exact test that `self` is an integer multiple of `divisor`.
    ///
    /// `None` when the divisor is zero or the arithmetic overflows.
    pub fn checked_is_multiple_of(&self, divisor: &Self) -> Option<bool> {
        let d = divisor.mantissa.unsigned_abs();
        if d == 0 {
            return None;
        }
        let v = self.mantissa.unsigned_abs();
        if v == 0 {
            return Some(true);
        }
        let shift = i64::from(self.exponent) - i64::from(divisor.exponent);
        if shift.abs() > MAX_SHIFT {
            return None;
        }
        if shift >= 0 {
            // v * 10^shift mod d, reduced step by step.
            let mut rem = v % d;
            for _ in 0..shift {
                rem = rem.checked_mul(10)? % d;
            }
            Some(rem == 0)
        } else {
            // Divisor carries the larger exponent: lift it to the value's scale.
            let factor = 10u128.checked_pow(u32::try_from(-shift).ok()?)?;
            let d = d.checked_mul(factor)?;
            Some(v % d == 0)
        }
    }
}

/// Rescale `mantissa * 10^from` to exponent `to` (`to <= from`).
fn scale(mantissa: i128, from: i32, to: i32) -> Option<i128> {
    let diff = u32::try_from(i64::from(from) - i64::from(to)).ok()?;
    mantissa.checked_mul(10i128.checked_pow(diff)?)
}

fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

/// Compare two JSON numbers by value.
///
/// Exact whenever both numbers fit the decimal representation; otherwise
/// falls back to `f64` ordering. Incomparable floats are treated as equal,
/// which cannot happen for values `serde_json` accepts (it rejects NaN).
pub fn compare(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (Decimal::from_number(a), Decimal::from_number(b)) {
        if let Some(ordering) = x.checked_cmp(&y) {
            return ordering;
        }
    }
    as_f64(a).partial_cmp(&as_f64(b)).unwrap_or(Ordering::Equal)
}

/// Returns true if `n` is strictly greater than zero.
pub fn is_positive(n: &Number) -> bool {
    match Decimal::from_number(n) {
        Some(d) => d.is_positive(),
        None => as_f64(n) > 0.0,
    }
}

/// Returns true if `n` has no fractional part.
pub fn is_integral(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    match Decimal::from_number(n) {
        Some(d) => d.is_integral(),
        None => {
            let f = as_f64(n);
            f.is_finite() && f.fract() == 0.0
        }
    }
}

/// Returns true if `value / divisor` is an integer.
///
/// The divisor is expected to be positive; a zero divisor never divides.
pub fn is_multiple_of(value: &Number, divisor: &Number) -> bool {
    if let (Some(v), Some(d)) = (Decimal::from_number(value), Decimal::from_number(divisor)) {
        if d.is_zero() {
            return false;
        }
        if let Some(result) = v.checked_is_multiple_of(&d) {
            return result;
        }
    }
    let quotient = as_f64(value) / as_f64(divisor);
    quotient.is_finite() && quotient.fract() == 0.0
}
