//! Classification of descriptor strings into structural shapes.

use crate::{
    error::DescriptorError,
    generic::Wrapper,
    primitives::PrimitiveKind,
    tuple::{check_balanced, split_elements},
};

/// A descriptor decomposed into its structure. Named references are kept as strings; they are
/// resolved against a declaration table later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape<'a> {
    Primitive(PrimitiveKind),
    Generic(Wrapper, Box<Shape<'a>>),
    Tuple(Vec<Shape<'a>>),
    Named(&'a str),
}

/// Parses a descriptor. Classification order: exact primitive, generic wrapper, tuple, named
/// reference.
pub fn parse_descriptor(descriptor: &str) -> Result<Shape<'_>, DescriptorError> {
    if descriptor.trim().is_empty() {
        return Err(DescriptorError::Empty);
    }

    if let Some(kind) = PrimitiveKind::from_descriptor(descriptor) {
        return Ok(Shape::Primitive(kind));
    }

    check_balanced(descriptor)?;

    if let Some((wrapper, inner)) = Wrapper::split(descriptor) {
        let inner = parse_descriptor(inner)?;
        return Ok(Shape::Generic(wrapper, Box::new(inner)));
    }

    if let Some(interior) = descriptor
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let elements = split_elements(descriptor, interior)?
            .into_iter()
            .map(parse_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Shape::Tuple(elements));
    }

    Ok(Shape::Named(descriptor))
}

impl Shape<'_> {
    /// Returns the shape with any chain of directly nested options reduced to one.
    pub fn collapse_options(&self) -> &Self {
        let mut shape = self;
        while let Shape::Generic(Wrapper::Option, inner) = shape {
            match inner.as_ref() {
                Shape::Generic(Wrapper::Option, _) => shape = inner.as_ref(),
                _ => break,
            }
        }
        shape
    }
}
