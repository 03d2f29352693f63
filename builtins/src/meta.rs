use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("value {0:?} is not a decimal or 0x-prefixed hexadecimal literal")]
    InvalidNumericLiteral(String),
    #[error("value {0:?} does not fit into 256 bits")]
    Overflow(String),
}

lazy_static! {
    static ref DECIMAL_LITERAL: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref HEX_LITERAL: Regex = Regex::new(r"^0[xX][0-9a-fA-F]+$").unwrap();
}

/// Checks a numeric literal and returns it in canonical form: decimal literals are kept as-is
/// (minus leading zeros), hexadecimal literals are lowercased.
pub fn normalized_literal(literal: &str) -> Result<String, Error> {
    let literal = literal.trim();
    if DECIMAL_LITERAL.is_match(literal) {
        let trimmed = literal.trim_start_matches('0');
        // 2^256 has 78 decimal digits; anything longer cannot fit
        if trimmed.len() > 78 {
            return Err(Error::Overflow(literal.to_string()));
        }
        Ok(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
    } else if HEX_LITERAL.is_match(literal) {
        let digits = literal[2..].trim_start_matches('0');
        if digits.len() > 64 {
            return Err(Error::Overflow(literal.to_string()));
        }
        let digits = if digits.is_empty() { "0" } else { digits };
        Ok(format!("0x{}", digits.to_ascii_lowercase()))
    } else {
        Err(Error::InvalidNumericLiteral(literal.to_string()))
    }
}

/// Splits a decimal literal into `(high, low)` 128-bit limbs, or `None` if it needs more than
/// 256 bits.
pub fn decimal_limbs(digits: &str) -> Option<(u128, u128)> {
    // little-endian 64-bit words
    let mut words = [0u64; 4];
    for digit in digits.chars() {
        let mut carry = u128::from(digit.to_digit(10)?);
        for word in words.iter_mut() {
            let product = u128::from(*word) * 10 + carry;
            *word = product as u64;
            carry = product >> 64;
        }
        if carry != 0 {
            return None;
        }
    }
    let low = u128::from(words[0]) | (u128::from(words[1]) << 64);
    let high = u128::from(words[2]) | (u128::from(words[3]) << 64);
    Some((high, low))
}
