use crate::{error::DescriptorError, ResolvedType};

pub const MAX_TUPLE_ARITY: usize = 20;

/// Checks that `(`/`)` and `<`/`>` pair up and nest properly.
pub(crate) fn check_balanced(descriptor: &str) -> Result<(), DescriptorError> {
    let mut open = Vec::new();
    for c in descriptor.chars() {
        let expected = match c {
            '(' | '<' => {
                open.push(c);
                continue;
            }
            ')' => '(',
            '>' => '<',
            _ => continue,
        };
        if open.pop() != Some(expected) {
            return Err(DescriptorError::Unbalanced(descriptor.to_string()));
        }
    }
    if open.is_empty() {
        Ok(())
    } else {
        Err(DescriptorError::Unbalanced(descriptor.to_string()))
    }
}

/// Splits the interior of a tuple descriptor at depth-0 commas.
///
/// An empty interior yields no elements. A single trailing comma is accepted, so `(T,)` is a
/// 1-tuple just like `(T)`.
pub(crate) fn split_elements<'a>(
    descriptor: &str,
    interior: &'a str,
) -> Result<Vec<&'a str>, DescriptorError> {
    if interior.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in interior.char_indices() {
        match c {
            '(' | '<' => depth += 1,
            ')' | '>' => {
                // "(a), (b)" is balanced as a whole, but its interior is not
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| DescriptorError::Unbalanced(descriptor.to_string()))?;
            }
            ',' if depth == 0 => {
                elements.push(interior[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(DescriptorError::Unbalanced(descriptor.to_string()));
    }
    elements.push(interior[start..].trim());

    if elements.len() > 1 && elements.last() == Some(&"") {
        elements.pop();
    }
    if elements.iter().any(|e| e.is_empty()) {
        return Err(DescriptorError::EmptyTupleElement(descriptor.to_string()));
    }
    if elements.len() > MAX_TUPLE_ARITY {
        return Err(DescriptorError::TupleTooLong {
            descriptor: descriptor.to_string(),
            arity: elements.len(),
        });
    }
    Ok(elements)
}

/// Assembles resolved elements into a fixed-length product, keeping source order.
pub fn assemble(elements: Vec<ResolvedType>) -> ResolvedType {
    ResolvedType::Tuple(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_only_at_top_level() {
        let interior = "core::felt252, (core::bool, core::integer::u8), core::array::Array::<(core::bool, core::bool)>";
        let elements = split_elements("(..)", interior).unwrap();
        assert_eq!(
            elements,
            vec![
                "core::felt252",
                "(core::bool, core::integer::u8)",
                "core::array::Array::<(core::bool, core::bool)>",
            ]
        );
    }

    #[test]
    fn empty_interior_is_unit() {
        assert!(split_elements("()", "").unwrap().is_empty());
        assert!(split_elements("( )", " ").unwrap().is_empty());
    }

    #[test]
    fn trailing_comma_single_element() {
        assert_eq!(split_elements("(a,)", "a,").unwrap(), vec!["a"]);
    }

    #[test]
    fn rejects_holes() {
        assert_eq!(
            split_elements("(a,,b)", "a,,b"),
            Err(DescriptorError::EmptyTupleElement("(a,,b)".into()))
        );
        assert!(split_elements("(,)", ",").is_err());
    }

    #[test]
    fn arity_cap() {
        let twenty = vec!["core::bool"; 20].join(", ");
        assert_eq!(split_elements("t", &twenty).unwrap().len(), 20);

        let twenty_one = vec!["core::bool"; 21].join(", ");
        assert!(matches!(
            split_elements("t", &twenty_one),
            Err(DescriptorError::TupleTooLong { arity: 21, .. })
        ));
    }

    #[test]
    fn balance() {
        assert!(check_balanced("core::array::Array::<(a, b)>").is_ok());
        assert!(check_balanced("(").is_err());
        assert!(check_balanced(")(").is_err());
        assert!(check_balanced("(a>").is_err());
        assert!(check_balanced("core::option::Option::<a").is_err());
    }

    #[test]
    fn interior_underflow() {
        assert!(matches!(
            split_elements("(a), (b)", "a), (b"),
            Err(DescriptorError::Unbalanced(_))
        ));
    }
}
