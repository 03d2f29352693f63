//! Host-side representations of the primitive ABI types, plus the call submission seam shared by
//! dynamic and generated contract bindings.

pub mod meta;
pub mod provider;

use std::fmt;

use serde::de::{self, MapAccess, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

pub use provider::{
    decode, encode, BlockId, CallOptions, CallPayload, CallRequest, InvocationHandle,
    InvokeOptions, Provider, ProviderError,
};
pub use serde_json::Value;

/// A field element (`core::felt252`), kept as its canonical literal.
///
/// Deserializes from a non-negative JSON number or a decimal / hexadecimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Felt(String);

impl Felt {
    pub fn from_literal(literal: &str) -> Result<Self, meta::Error> {
        meta::normalized_literal(literal).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Felt> for String {
    fn from(felt: Felt) -> Self {
        felt.0
    }
}

macro_rules! felt_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Felt {
                fn from(value: $t) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

felt_from_unsigned!(u8, u16, u32, u64, u128, usize);

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct FeltVisitor;

impl<'de> Visitor<'de> for FeltVisitor {
    type Value = Felt;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal / 0x-prefixed literal")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Felt, E> {
        Ok(Felt::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Felt, E> {
        Ok(Felt::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Felt, E> {
        u64::try_from(v)
            .map(Felt::from)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Felt, E> {
        Felt::from_literal(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FeltVisitor)
    }
}

/// A 256-bit unsigned integer (`core::integer::u256`) split into two 128-bit limbs.
///
/// Deserializes from `{low, high}`, from a JSON number, or from a literal string; a literal
/// wider than 128 bits is split across both limbs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct U256 {
    pub low: Felt,
    pub high: Felt,
}

impl U256 {
    pub fn from_literal(literal: &str) -> Result<Self, meta::Error> {
        let normalized = meta::normalized_literal(literal)?;
        match normalized.strip_prefix("0x") {
            Some(digits) if digits.len() > 32 => {
                let (high, low) = digits.split_at(digits.len() - 32);
                Ok(Self {
                    low: Felt::from_literal(&format!("0x{low}"))?,
                    high: Felt::from_literal(&format!("0x{high}"))?,
                })
            }
            Some(_) => Ok(Self {
                low: Felt(normalized),
                high: Felt::from(0u8),
            }),
            None => match normalized.parse::<u128>() {
                Ok(value) => Ok(Self::from(value)),
                Err(_) => {
                    let (high, low) = meta::decimal_limbs(&normalized)
                        .ok_or_else(|| meta::Error::Overflow(literal.to_string()))?;
                    Ok(Self {
                        low: Felt::from(low),
                        high: Felt::from(high),
                    })
                }
            },
        }
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        Self {
            low: Felt::from(value),
            high: Felt::from(0u8),
        }
    }
}

struct U256Visitor;

impl<'de> Visitor<'de> for U256Visitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a {low, high} pair, a non-negative integer or a numeric literal")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(u128::from(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
        u128::try_from(v)
            .map(U256::from)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        U256::from_literal(v).map_err(E::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<U256, A::Error> {
        let mut low = None;
        let mut high = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "low" if low.is_none() => low = Some(map.next_value::<Felt>()?),
                "high" if high.is_none() => high = Some(map.next_value::<Felt>()?),
                "low" | "high" => return Err(de::Error::custom(format!("duplicate field `{key}`"))),
                other => return Err(de::Error::unknown_field(other, &["low", "high"])),
            }
        }
        Ok(U256 {
            low: low.ok_or_else(|| de::Error::missing_field("low"))?,
            high: high.ok_or_else(|| de::Error::missing_field("high"))?,
        })
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(U256Visitor)
    }
}

/// `core::starknet::contract_address::ContractAddress`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAddress(pub String);

impl ContractAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `core::starknet::class_hash::ClassHash`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassHash(pub String);

impl ClassHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }
}

/// Pre-encoded call arguments, one string per field element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Calldata(pub Vec<String>);

impl Calldata {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Calldata {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Calldata {
    fn from(items: [S; N]) -> Self {
        items.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn felt_accepts_numbers_and_literals() {
        let from_number: Felt = serde_json::from_value(json!(5)).unwrap();
        let from_hex: Felt = serde_json::from_value(json!("0x05")).unwrap();
        assert_eq!(from_number.as_str(), "5");
        assert_eq!(from_hex.as_str(), "0x5");
        assert!(serde_json::from_value::<Felt>(json!("five")).is_err());
    }

    #[test]
    fn felt_serializes_as_string() {
        assert_eq!(serde_json::to_value(Felt::from(7u8)).unwrap(), json!("7"));
    }

    #[test]
    fn u256_splits_wide_hex_literals() {
        let value = U256::from_literal(&format!("0x2{}", "0".repeat(31) + "1")).unwrap();
        assert_eq!(value.high.as_str(), "0x2");
        assert_eq!(value.low.as_str(), "0x1");
    }

    #[test]
    fn u256_deserializes_from_parts_or_number() {
        let parts: U256 = serde_json::from_value(json!({"low": 1, "high": "0x0"})).unwrap();
        assert_eq!(parts.low.as_str(), "1");
        let number: U256 = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(number, U256::from(42u128));
    }

    #[test]
    fn u256_splits_wide_decimal_literals() {
        let two_pow_128 = U256::from_literal("340282366920938463463374607431768211456").unwrap();
        assert_eq!(two_pow_128.low.as_str(), "0");
        assert_eq!(two_pow_128.high.as_str(), "1");

        let max = U256::from_literal(
            "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        )
        .unwrap();
        assert_eq!(max.low, Felt::from(u128::MAX));
        assert_eq!(max.high, Felt::from(u128::MAX));

        let two_pow_256 =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(matches!(
            U256::from_literal(two_pow_256),
            Err(meta::Error::Overflow(_))
        ));
    }

    #[test]
    fn numeric_fields_decode_from_json_numbers() {
        #[derive(Debug, Deserialize)]
        struct S {
            a: Felt,
            b: u8,
            c: U256,
        }

        let s: S = decode(json!({"a": 1, "b": 2, "c": 3})).unwrap();
        assert_eq!(s.a, Felt::from(1u8));
        assert_eq!(s.b, 2);
        assert_eq!(s.c, U256::from(3u128));
        assert!(decode::<S>(json!({"a": -1, "b": 2, "c": 3})).is_err());
        assert!(decode::<U256>(json!({"low": 1})).is_err());
    }

    #[test]
    fn calldata_from_array() {
        let calldata = Calldata::from(["0x1", "0x2"]);
        assert_eq!(calldata.len(), 2);
        assert_eq!(calldata.iter().collect::<Vec<_>>(), vec!["0x1", "0x2"]);
    }
}
