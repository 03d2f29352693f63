use ca_builtins::ProviderError;
use thiserror::Error;

use crate::{signature::ArgumentConvention, tuple::MAX_TUPLE_ARITY};

/// Why a descriptor string could not be decomposed into a shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("empty type descriptor")]
    Empty,
    #[error("unbalanced brackets in type descriptor {0:?}")]
    Unbalanced(String),
    #[error("empty element in tuple descriptor {0:?}")]
    EmptyTupleElement(String),
    #[error(
        "tuple descriptor {descriptor:?} has {arity} elements, at most {max} are supported",
        max = MAX_TUPLE_ARITY
    )]
    TupleTooLong { descriptor: String, arity: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("struct {name:?} contains itself through member {member:?} without an enclosing Array or Option")]
    DirectSelfReference { name: String, member: String },
}

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("ABI document is not valid JSON")]
    Syntax(#[source] serde_json::Error),
    #[error("ABI document is not a JSON array of declarations")]
    NotAnArray(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("function {function:?} takes {expected}, got {found}")]
    ArgumentMismatch {
        function: String,
        expected: ArgumentConvention,
        found: String,
    },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
