use crate::ResolvedType;

pub const OPTION_PREFIX: &str = "core::option::Option::<";
pub const ARRAY_PREFIX: &str = "core::array::Array::<";

/// The generic wrappers understood in descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wrapper {
    /// `core::option::Option::<T>`
    Option,
    /// `core::array::Array::<T>`
    Array,
}

impl Wrapper {
    const ALL: [Wrapper; 2] = [Wrapper::Option, Wrapper::Array];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Option => OPTION_PREFIX,
            Self::Array => ARRAY_PREFIX,
        }
    }

    /// Splits `Wrapper::<Inner>` into the wrapper and the (unparsed) inner descriptor.
    pub(crate) fn split(descriptor: &str) -> Option<(Wrapper, &str)> {
        Self::ALL.into_iter().find_map(|wrapper| {
            descriptor
                .strip_prefix(wrapper.prefix())
                .and_then(|rest| rest.strip_suffix('>'))
                .map(|inner| (wrapper, inner))
        })
    }

    pub fn apply(self, inner: ResolvedType) -> ResolvedType {
        match self {
            Self::Option => ResolvedType::option(inner),
            Self::Array => ResolvedType::array(inner),
        }
    }
}
