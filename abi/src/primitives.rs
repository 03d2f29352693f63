//! The closed set of primitive descriptors and their host representations.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use crate::ResolvedType;

pub const FELT: &str = "core::felt252";
pub const BOOL: &str = "core::bool";
pub const UNIT: &str = "()";
pub const FUNCTION: &str = "function";
pub const U8: &str = "core::integer::u8";
pub const U16: &str = "core::integer::u16";
pub const U32: &str = "core::integer::u32";
pub const U64: &str = "core::integer::u64";
pub const U128: &str = "core::integer::u128";
pub const U256: &str = "core::integer::u256";
pub const CONTRACT_ADDRESS: &str = "core::starknet::contract_address::ContractAddress";
pub const CLASS_HASH: &str = "core::starknet::class_hash::ClassHash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Felt,
    Bool,
    Unit,
    FunctionSelector,
    /// `u8`, `u16` and `u32`
    SmallInt { bits: u8 },
    /// `u64` and `u128`
    WideInt { bits: u8 },
    U256,
    ContractAddress,
    ClassHash,
}

/// How a value of a primitive type is represented on the host side of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostRepr {
    /// Number, big integer, or numeric string
    BigNumberish,
    Boolean,
    Void,
    Number,
    NumberOrBigInt,
    /// Number, big integer, or a `{low, high}` pair
    NumberBigIntOrU256,
    String,
}

lazy_static! {
    static ref PRIMITIVES: HashMap<&'static str, PrimitiveKind> = {
        HashMap::from([
            (FELT, PrimitiveKind::Felt),
            (BOOL, PrimitiveKind::Bool),
            (UNIT, PrimitiveKind::Unit),
            (FUNCTION, PrimitiveKind::FunctionSelector),
            (U8, PrimitiveKind::SmallInt { bits: 8 }),
            (U16, PrimitiveKind::SmallInt { bits: 16 }),
            (U32, PrimitiveKind::SmallInt { bits: 32 }),
            (U64, PrimitiveKind::WideInt { bits: 64 }),
            (U128, PrimitiveKind::WideInt { bits: 128 }),
            (U256, PrimitiveKind::U256),
            (CONTRACT_ADDRESS, PrimitiveKind::ContractAddress),
            (CLASS_HASH, PrimitiveKind::ClassHash),
        ])
    };
}

impl PrimitiveKind {
    /// Exact lookup; `core::integer::u64 ` or `felt252` are not primitives.
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        PRIMITIVES.get(descriptor).copied()
    }

    pub fn descriptor(self) -> &'static str {
        match self {
            Self::Felt => FELT,
            Self::Bool => BOOL,
            Self::Unit => UNIT,
            Self::FunctionSelector => FUNCTION,
            Self::SmallInt { bits: 8 } => U8,
            Self::SmallInt { bits: 16 } => U16,
            Self::SmallInt { .. } => U32,
            Self::WideInt { bits: 64 } => U64,
            Self::WideInt { .. } => U128,
            Self::U256 => U256,
            Self::ContractAddress => CONTRACT_ADDRESS,
            Self::ClassHash => CLASS_HASH,
        }
    }

    pub fn host_repr(self) -> HostRepr {
        match self {
            Self::Felt => HostRepr::BigNumberish,
            Self::Bool => HostRepr::Boolean,
            Self::Unit => HostRepr::Void,
            Self::FunctionSelector => HostRepr::Number,
            Self::SmallInt { .. } | Self::WideInt { .. } => HostRepr::NumberOrBigInt,
            Self::U256 => HostRepr::NumberBigIntOrU256,
            Self::ContractAddress | Self::ClassHash => HostRepr::String,
        }
    }

    /// The unit primitive resolves to the 0-arity tuple; all others resolve to themselves.
    pub fn resolved(self) -> ResolvedType {
        match self {
            Self::Unit => ResolvedType::unit(),
            kind => ResolvedType::Primitive(kind),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Felt => write!(f, "felt252"),
            Self::Bool => write!(f, "bool"),
            Self::Unit => write!(f, "()"),
            Self::FunctionSelector => write!(f, "function"),
            Self::SmallInt { bits } | Self::WideInt { bits } => write!(f, "u{bits}"),
            Self::U256 => write!(f, "u256"),
            Self::ContractAddress => write!(f, "ContractAddress"),
            Self::ClassHash => write!(f, "ClassHash"),
        }
    }
}
