//! [BSON Decimal128](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.rst) data type representation

use std::{convert::TryInto, fmt, str::FromStr};

use crate::error::{Decimal128ErrorKind, Error, Result};

/// Struct representing a BSON Decimal128 type.
///
/// This type supports conversion to and from human-readable decimal strings
/// via its [`FromStr`] and [`Display`](std::fmt::Display) implementations,
/// and stores the IEEE 754-2008 128-bit decimal floating point bytes in wire
/// order for round tripping.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    /// BSON bytes containing the decimal128. Stored for round tripping.
    pub(crate) bytes: [u8; 16],
}

impl Decimal128 {
    /// Constructs a new `Decimal128` from the provided raw byte
    /// representation.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Returns the raw byte representation of this `Decimal128`.
    pub fn bytes(&self) -> [u8; 16] {
        self.bytes
    }
}

impl fmt::Debug for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Decimal128(\"{}\")", ParsedDecimal128::new(self))
    }
}

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", ParsedDecimal128::new(self))
    }
}

impl FromStr for Decimal128 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(ParsedDecimal128::parse_str(s)?.pack())
    }
}

// Bit layout of the upper 64 bits, as specified by IEEE 754-2008 for the
// binary integer significand encoding:
//
//   s 11exxxxxxxxxxxxxx (0ccc...)   "large" combination, implicit `100`
//   s eexxxxxxxxxxxxxx (ccc...)     "small" combination
//
// with the all-ones prefixes reserved for infinities and NaNs.
const SIGN_BIT: u64 = 1 << 63;
const SPECIAL_BITS: u64 = 0b11110 << 58;
const NAN_BIT: u64 = 1 << 58;
const INFINITY_HIGH: u64 = 0b11110 << 58;
const NAN_HIGH: u64 = 0b11111 << 58;
const LARGE_FORM_BITS: u64 = 0b11 << 61;
const EXPONENT_FIELD_MASK: u64 = (1 << 14) - 1;
const SMALL_EXPONENT_SHIFT: u32 = 49;
const LARGE_EXPONENT_SHIFT: u32 = 47;
const SMALL_COEFFICIENT_HIGH_MASK: u64 = (1 << 49) - 1;

const EXPONENT_BIAS: i16 = 6176;
const EXPONENT_MAX: i16 = 6111;
const EXPONENT_MIN: i16 = -6176;
const MAX_SIGNIFICAND_DIGITS: usize = 34;
// 10^34 - 1, the largest canonical significand
const MAX_SIGNIFICAND: u128 = 9_999_999_999_999_999_999_999_999_999_999_999;

#[derive(Debug, Clone, PartialEq)]
struct ParsedDecimal128 {
    sign: bool,
    kind: Decimal128Kind,
}

#[derive(Debug, Clone, PartialEq)]
enum Decimal128Kind {
    NaN,
    Infinity,
    Finite { exponent: i16, significand: u128 },
}

impl ParsedDecimal128 {
    fn new(source: &Decimal128) -> Self {
        // the upper half is stored in the final eight wire bytes
        let low = u64::from_le_bytes(source.bytes[0..8].try_into().unwrap());
        let high = u64::from_le_bytes(source.bytes[8..16].try_into().unwrap());

        let sign = high & SIGN_BIT != 0;
        let kind = if high & SPECIAL_BITS == SPECIAL_BITS {
            if high & NAN_BIT != 0 {
                Decimal128Kind::NaN
            } else {
                Decimal128Kind::Infinity
            }
        } else if high & LARGE_FORM_BITS == LARGE_FORM_BITS {
            // The implicit `100` significand prefix of the large form always
            // produces a value past the canonical 34-digit range, which the
            // BSON specification maps to zero.
            Decimal128Kind::Finite {
                exponent: ((high >> LARGE_EXPONENT_SHIFT) & EXPONENT_FIELD_MASK) as i16
                    - EXPONENT_BIAS,
                significand: 0,
            }
        } else {
            let mut significand =
                (((high & SMALL_COEFFICIENT_HIGH_MASK) as u128) << 64) | low as u128;
            if significand > MAX_SIGNIFICAND {
                significand = 0;
            }
            Decimal128Kind::Finite {
                exponent: ((high >> SMALL_EXPONENT_SHIFT) & EXPONENT_FIELD_MASK) as i16
                    - EXPONENT_BIAS,
                significand,
            }
        };
        ParsedDecimal128 { sign, kind }
    }

    fn parse_str(s: &str) -> Result<Self> {
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        if rest.eq_ignore_ascii_case("nan") {
            // the sign of a NaN is not representable
            return Ok(ParsedDecimal128 {
                sign: false,
                kind: Decimal128Kind::NaN,
            });
        }
        if rest.eq_ignore_ascii_case("inf") || rest.eq_ignore_ascii_case("infinity") {
            return Ok(ParsedDecimal128 {
                sign,
                kind: Decimal128Kind::Infinity,
            });
        }

        let (int_digits, rest) = take_digits(rest);
        let (frac_digits, rest) = match rest.strip_prefix('.') {
            Some(r) => take_digits(r),
            None => ("", rest),
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(Error::decimal128(Decimal128ErrorKind::Unparseable));
        }

        let exp = match rest.strip_prefix(|c| c == 'e' || c == 'E') {
            Some(r) => {
                if r.is_empty() {
                    return Err(Error::decimal128(Decimal128ErrorKind::EmptyExponent));
                }
                parse_exponent(r)?
            }
            None if rest.is_empty() => 0,
            None => return Err(Error::decimal128(Decimal128ErrorKind::Unparseable)),
        };

        // fold the fraction into the exponent so the significand is integral
        let mut exponent = exp - frac_digits.len() as i64;

        let mut digits: Vec<u8> = int_digits
            .bytes()
            .chain(frac_digits.bytes())
            .map(|b| b - b'0')
            .collect();

        // drop leading zeros, keeping at least one digit
        match digits.iter().position(|&d| d != 0) {
            Some(idx) => {
                digits.drain(..idx);
            }
            None => digits.truncate(1),
        }

        if digits == [0] {
            // zeros clamp freely into the representable exponent range
            let exponent = exponent.clamp(EXPONENT_MIN as i64, EXPONENT_MAX as i64) as i16;
            return Ok(ParsedDecimal128 {
                sign,
                kind: Decimal128Kind::Finite {
                    exponent,
                    significand: 0,
                },
            });
        }

        // a too-small exponent can be raised by stripping trailing zeros
        while exponent < EXPONENT_MIN as i64 {
            if digits.len() > 1 && *digits.last().unwrap() == 0 {
                digits.pop();
                exponent += 1;
            } else {
                return Err(Error::decimal128(Decimal128ErrorKind::Underflow));
            }
        }

        if digits.len() > MAX_SIGNIFICAND_DIGITS || exponent > EXPONENT_MAX as i64 {
            return Err(Error::decimal128(Decimal128ErrorKind::Overflow));
        }

        let significand = digits.iter().fold(0u128, |acc, &d| acc * 10 + d as u128);

        Ok(ParsedDecimal128 {
            sign,
            kind: Decimal128Kind::Finite {
                exponent: exponent as i16,
                significand,
            },
        })
    }

    fn pack(&self) -> Decimal128 {
        let (mut high, low) = match &self.kind {
            Decimal128Kind::NaN => (NAN_HIGH, 0u64),
            Decimal128Kind::Infinity => (INFINITY_HIGH, 0),
            Decimal128Kind::Finite {
                exponent,
                significand,
            } => {
                let biased = (*exponent as i64 + EXPONENT_BIAS as i64) as u64;
                (
                    (biased << SMALL_EXPONENT_SHIFT) | (*significand >> 64) as u64,
                    *significand as u64,
                )
            }
        };

        if self.sign {
            high |= SIGN_BIT;
        }

        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&low.to_le_bytes());
        bytes[8..16].copy_from_slice(&high.to_le_bytes());
        Decimal128 { bytes }
    }
}

fn take_digits(s: &str) -> (&str, &str) {
    let idx = s
        .as_bytes()
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len());
    s.split_at(idx)
}

fn parse_exponent(s: &str) -> Result<i64> {
    match s.parse::<i64>() {
        Ok(exp) => Ok(exp),
        Err(_) => {
            let unsigned = s.trim_start_matches(|c| c == '+' || c == '-');
            if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
                // an exponent too large for an i64 is necessarily out of range
                Err(Error::decimal128(if s.starts_with('-') {
                    Decimal128ErrorKind::Underflow
                } else {
                    Decimal128ErrorKind::Overflow
                }))
            } else {
                Err(Error::decimal128(Decimal128ErrorKind::InvalidExponent {
                    message: format!("\"{}\" is not a decimal exponent", s),
                }))
            }
        }
    }
}

impl fmt::Display for ParsedDecimal128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            Decimal128Kind::NaN => f.write_str("NaN"),
            Decimal128Kind::Infinity => {
                if self.sign {
                    f.write_str("-")?;
                }
                f.write_str("Infinity")
            }
            Decimal128Kind::Finite {
                exponent,
                significand,
            } => {
                if self.sign {
                    f.write_str("-")?;
                }

                let coeff = significand.to_string();
                let exp = *exponent as i32;
                let adjusted = exp + coeff.len() as i32 - 1;

                if exp > 0 || adjusted < -6 {
                    // exponential notation
                    f.write_str(&coeff[..1])?;
                    if coeff.len() > 1 {
                        write!(f, ".{}", &coeff[1..])?;
                    }
                    write!(f, "E{:+}", adjusted)
                } else if exp == 0 {
                    f.write_str(&coeff)
                } else {
                    // plain notation with the point `exp` digits from the right
                    let point = coeff.len() as i32 + exp;
                    if point > 0 {
                        let (int_part, frac_part) = coeff.split_at(point as usize);
                        write!(f, "{}.{}", int_part, frac_part)
                    } else {
                        write!(f, "0.{}{}", "0".repeat(-point as usize), coeff)
                    }
                }
            }
        }
    }
}
