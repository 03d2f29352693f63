use std::fmt;

use serde_json::Value;

use crate::primitives::PrimitiveKind;

/// The normalized shape of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive(PrimitiveKind),
    /// Never directly contains another `Option`; see [`ResolvedType::option`].
    Option(Box<ResolvedType>),
    Array(Box<ResolvedType>),
    /// Zero elements is the unit type.
    Tuple(Vec<ResolvedType>),
    Record(Vec<Field>),
    TaggedUnion(Vec<Variant>),
    /// Back-reference to a named declaration that is being materialized further up the same
    /// resolution, e.g. the `Node` in `struct Node { children: Array<Node> }`.
    Recursive(String),
    /// Placeholder for anything that could not be resolved.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: ResolvedType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub payload: ResolvedType,
}

impl ResolvedType {
    pub fn unit() -> Self {
        Self::Tuple(Vec::new())
    }

    /// Wraps `inner` as optional. Absence carries a single bit, so wrapping an optional type
    /// again yields it unchanged.
    pub fn option(inner: ResolvedType) -> Self {
        match inner {
            Self::Option(_) => inner,
            other => Self::Option(Box::new(other)),
        }
    }

    pub fn array(element: ResolvedType) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Tuple(elements) if elements.is_empty())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether a [`ResolvedType::Recursive`] back-reference appears anywhere inside.
    pub fn contains_recursive(&self) -> bool {
        match self {
            Self::Recursive(_) => true,
            Self::Option(inner) | Self::Array(inner) => inner.contains_recursive(),
            Self::Tuple(elements) => elements.iter().any(Self::contains_recursive),
            Self::Record(fields) => fields.iter().any(|f| f.ty.contains_recursive()),
            Self::TaggedUnion(variants) => variants.iter().any(|v| v.payload.contains_recursive()),
            Self::Primitive(_) | Self::Unknown => false,
        }
    }

    /// Whether a back-reference to `name` appears anywhere inside, i.e. the declaration this
    /// shape was materialized from reaches itself.
    pub fn refers_back_to(&self, name: &str) -> bool {
        match self {
            Self::Recursive(target) => target == name,
            Self::Option(inner) | Self::Array(inner) => inner.refers_back_to(name),
            Self::Tuple(elements) => elements.iter().any(|e| e.refers_back_to(name)),
            Self::Record(fields) => fields.iter().any(|f| f.ty.refers_back_to(name)),
            Self::TaggedUnion(variants) => variants.iter().any(|v| v.payload.refers_back_to(name)),
            Self::Primitive(_) | Self::Unknown => false,
        }
    }

    pub fn field(&self, name: &str) -> Option<&ResolvedType> {
        match self {
            Self::Record(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.ty),
            _ => None,
        }
    }

    pub fn variant(&self, name: &str) -> Option<&ResolvedType> {
        match self {
            Self::TaggedUnion(variants) => variants
                .iter()
                .find(|v| v.name == name)
                .map(|v| &v.payload),
            _ => None,
        }
    }

    /// Identifies which variant of a tagged union `value` carries. A variant value is a
    /// single-key object `{ "<variant name>": payload }`; objects with zero or several keys, or
    /// with an undeclared key, carry no variant.
    pub fn select_variant<'v>(&self, value: &'v Value) -> Option<(&Variant, &'v Value)> {
        let Self::TaggedUnion(variants) = self else {
            return None;
        };
        let object = value.as_object()?;
        if object.len() != 1 {
            return None;
        }
        let (key, payload) = object.iter().next()?;
        variants
            .iter()
            .find(|v| &v.name == key)
            .map(|v| (v, payload))
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::Option(inner) => write!(f, "Option<{inner}>"),
            Self::Array(element) => write!(f, "Array<{element}>"),
            Self::Tuple(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            Self::Record(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", field.name, field.ty)?;
                }
                write!(f, " }}")
            }
            Self::TaggedUnion(variants) => {
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}({})", variant.name, variant.payload)?;
                }
                Ok(())
            }
            Self::Recursive(name) => write!(f, "{name}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn felt() -> ResolvedType {
        ResolvedType::Primitive(PrimitiveKind::Felt)
    }

    #[test]
    fn option_collapses() {
        let once = ResolvedType::option(felt());
        let twice = ResolvedType::option(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn option_inside_array_is_kept() {
        let ty = ResolvedType::array(ResolvedType::option(felt()));
        assert_eq!(ty.to_string(), "Array<Option<felt252>>");
    }

    #[test]
    fn select_variant_requires_exactly_one_declared_key() {
        let union = ResolvedType::TaggedUnion(vec![
            Variant {
                name: "A".into(),
                payload: felt(),
            },
            Variant {
                name: "B".into(),
                payload: ResolvedType::unit(),
            },
        ]);
        let value = json!({"A": 1});
        let (variant, payload) = union.select_variant(&value).unwrap();
        assert_eq!(variant.name, "A");
        assert_eq!(payload, &json!(1));

        assert!(union.select_variant(&json!({"A": 1, "B": null})).is_none());
        assert!(union.select_variant(&json!({"C": 1})).is_none());
        assert!(union.select_variant(&json!({})).is_none());
        assert!(felt().select_variant(&json!({"A": 1})).is_none());
    }

    #[test]
    fn recursion_is_found_at_any_depth() {
        let nested = ResolvedType::Record(vec![Field {
            name: "children".into(),
            ty: ResolvedType::array(ResolvedType::Recursive("Node".into())),
        }]);
        assert!(nested.contains_recursive());
        assert!(!ResolvedType::array(felt()).contains_recursive());
        assert!(nested.refers_back_to("Node"));
        assert!(!nested.refers_back_to("Other"));
    }

    #[test]
    fn display_record() {
        let record = ResolvedType::Record(vec![
            Field {
                name: "x".into(),
                ty: felt(),
            },
            Field {
                name: "y".into(),
                ty: ResolvedType::Tuple(vec![felt(), ResolvedType::Unknown]),
            },
        ]);
        assert_eq!(record.to_string(), "{ x: felt252, y: (felt252, unknown) }");
    }
}
