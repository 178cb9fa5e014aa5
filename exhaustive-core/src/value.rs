//! Constant value keys.
//!
//! Enum members are grouped by the exact constant they denote. Values are
//! kept as exact integers, reduced rationals or text, so two members compare
//! equal only when the type checker would consider them the same constant.
//! Floating-point literals are parsed from their decimal spelling and never
//! pass through `f64`.

use std::fmt;
use std::num::IntErrorKind;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest decimal exponent accepted once trailing zeros are folded in.
const MAX_DECIMAL_EXPONENT: i64 = 10_000;

/// Normalized, hashable constant value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "RawValue")]
pub enum ConstValue {
    /// Exact integer (also the normal form of integral rationals)
    Int(BigInt),
    /// Non-integral rational, reduced, with a positive denominator
    Rational { num: BigInt, den: BigInt },
    /// Exact text
    Text(String),
}

/// Errors raised while reading a constant from its textual spelling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid integer literal {0:?}")]
    Int(String),
    #[error("invalid float literal {0:?}")]
    Float(String),
    #[error("zero denominator in rational constant")]
    ZeroDenominator,
    #[error("constant out of range: {0:?}")]
    Overflow(String),
}

fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    let (mut a, mut b) = (a.abs(), b.abs());
    while !b.is_zero() {
        let t = &a % &b;
        a = b;
        b = t;
    }
    a
}

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

impl ConstValue {
    pub fn int(v: impl Into<BigInt>) -> Self {
        Self::Int(v.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Builds a reduced rational. Integral results collapse to [`ConstValue::Int`].
    pub fn rational(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Result<Self, ValueError> {
        let (mut num, mut den) = (num.into(), den.into());
        if den.is_zero() {
            return Err(ValueError::ZeroDenominator);
        }
        if den.is_negative() {
            num = -num;
            den = -den;
        }

        let g = gcd(&num, &den);
        if !g.is_one() {
            num /= &g;
            den /= &g;
        }
        if den.is_one() {
            Ok(Self::Int(num))
        } else {
            Ok(Self::Rational { num, den })
        }
    }

    /// Parses an integer literal: optional sign, `0x`/`0o`/`0b` prefixes and
    /// `_` separators are accepted.
    pub fn parse_int(s: &str) -> Result<Self, ValueError> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
        let (negative, body) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
        };

        let (radix, digits) = if let Some(d) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            (16, d)
        } else if let Some(d) = body.strip_prefix("0o").or_else(|| body.strip_prefix("0O")) {
            (8, d)
        } else if let Some(d) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
            (2, d)
        } else {
            (10, body)
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(ValueError::Int(s.to_string()));
        }

        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(|| ValueError::Int(s.to_string()))?;
        Ok(Self::Int(if negative { -magnitude } else { magnitude }))
    }

    /// Parses a float constant exactly.
    ///
    /// Accepts `num/den` as well as decimal spellings with an optional
    /// exponent (`2.5`, `-0.125`, `1e3`, `25E-1`). Zero is zero whatever its
    /// exponent; otherwise the exponent left after folding in trailing zeros
    /// must stay within [`MAX_DECIMAL_EXPONENT`].
    pub fn parse_float(s: &str) -> Result<Self, ValueError> {
        let trimmed = s.trim();
        if let Some((n, d)) = trimmed.split_once('/') {
            let num = match Self::parse_int(n)? {
                Self::Int(v) => v,
                _ => return Err(ValueError::Float(s.to_string())),
            };
            let den = match Self::parse_int(d)? {
                Self::Int(v) => v,
                _ => return Err(ValueError::Float(s.to_string())),
            };
            return Self::rational(num, den);
        }

        let invalid = || ValueError::Float(s.to_string());
        let overflow = || ValueError::Overflow(s.to_string());

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (mantissa, exp_text) = match body.find(['e', 'E']) {
            Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
            None => (body, None),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let exponent: i64 = match exp_text {
            Some(text) => {
                let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
                if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match text.parse() {
                    Ok(e) => e,
                    Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                        // the exponent of a zero mantissa is irrelevant
                        if int_part.chars().chain(frac_part.chars()).all(|c| c == '0') {
                            return Ok(Self::Int(BigInt::zero()));
                        }
                        return Err(overflow());
                    }
                    Err(_) => return Err(invalid()),
                }
            }
            None => 0,
        };

        let digits = format!("{}{}", int_part, frac_part);
        let significant = digits.trim_start_matches('0');
        let kept = significant.trim_end_matches('0');
        if kept.is_empty() {
            return Ok(Self::Int(BigInt::zero()));
        }

        let frac_len = i64::try_from(frac_part.len()).map_err(|_| overflow())?;
        let trailing = i64::try_from(significant.len() - kept.len()).map_err(|_| overflow())?;
        let scale = exponent
            .checked_sub(frac_len)
            .and_then(|v| v.checked_add(trailing))
            .ok_or_else(overflow)?;
        if scale.unsigned_abs() > MAX_DECIMAL_EXPONENT.unsigned_abs() {
            return Err(overflow());
        }

        let mut num = BigInt::parse_bytes(kept.as_bytes(), 10).ok_or_else(invalid)?;
        if negative {
            num = -num;
        }
        // |scale| is bounded above, so the cast is lossless
        let pow = pow10(scale.unsigned_abs() as u32);
        if scale >= 0 {
            Ok(Self::Int(num * pow))
        } else {
            Self::rational(num, pow)
        }
    }

    /// Returns true for text constants.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Rational { num, den } => write!(f, "{}/{}", num, den),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Wire form of a constant: `{"int": "3"}`, `{"float": "2.5"}`, `{"string": "n"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawValue {
    Int(IntLexeme),
    Float(String),
    String(String),
}

/// Integers may be written as JSON numbers when they fit in 64 bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum IntLexeme {
    Number(i64),
    Unsigned(u64),
    Text(String),
}

impl TryFrom<RawValue> for ConstValue {
    type Error = ValueError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        match raw {
            RawValue::Int(IntLexeme::Number(n)) => Ok(Self::Int(n.into())),
            RawValue::Int(IntLexeme::Unsigned(n)) => Ok(Self::Int(n.into())),
            RawValue::Int(IntLexeme::Text(s)) => Self::parse_int(&s),
            RawValue::Float(s) => Self::parse_float(&s),
            RawValue::String(s) => Ok(Self::Text(s)),
        }
    }
}

impl From<ConstValue> for RawValue {
    fn from(value: ConstValue) -> Self {
        match value {
            ConstValue::Int(v) => RawValue::Int(IntLexeme::Text(v.to_string())),
            ConstValue::Rational { num, den } => RawValue::Float(format!("{}/{}", num, den)),
            ConstValue::Text(s) => RawValue::String(s),
        }
    }
}
