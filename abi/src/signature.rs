use std::fmt;

use crate::{
    declaration::{ConstructorDecl, FunctionDecl, Mutability, Parameter},
    resolved::ResolvedType,
    resolver::Resolver,
    table::DeclarationTable,
};

/// What a function hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnShape {
    Void,
    Value(ResolvedType),
}

/// How typed arguments are passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentConvention {
    /// No inputs: an empty call.
    Empty,
    /// Exactly one input, passed unwrapped.
    Bare,
    /// Any other number of inputs, passed as an ordered sequence.
    Positional(usize),
}

impl ArgumentConvention {
    pub fn for_arity(arity: usize) -> Self {
        match arity {
            0 => Self::Empty,
            1 => Self::Bare,
            n => Self::Positional(n),
        }
    }
}

impl fmt::Display for ArgumentConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no arguments"),
            Self::Bare => write!(f, "a single bare argument"),
            Self::Positional(n) => write!(f, "{n} positional arguments"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub inputs: Vec<ResolvedType>,
    pub output: ReturnShape,
    pub mutability: Mutability,
}

impl FunctionSignature {
    /// Only the first declared output is surfaced. A unit output is the same as none.
    pub fn build(table: &DeclarationTable, decl: &FunctionDecl) -> Self {
        let mut resolver = Resolver::new(table);
        let inputs = resolve_inputs(&mut resolver, &decl.name, &decl.inputs);
        let output = match decl.outputs.first() {
            Some(output) => {
                let ty = resolver.resolve_member(&decl.name, "output", &output.ty);
                if ty.is_unit() {
                    ReturnShape::Void
                } else {
                    ReturnShape::Value(ty)
                }
            }
            None => ReturnShape::Void,
        };
        Self {
            name: decl.name.clone(),
            inputs,
            output,
            mutability: decl.mutability,
        }
    }

    /// Constructors are state-changing and return nothing.
    pub fn build_constructor(table: &DeclarationTable, decl: &ConstructorDecl) -> Self {
        let mut resolver = Resolver::new(table);
        Self {
            name: decl.name.clone(),
            inputs: resolve_inputs(&mut resolver, &decl.name, &decl.inputs),
            output: ReturnShape::Void,
            mutability: Mutability::StateChanging,
        }
    }

    pub fn convention(&self) -> ArgumentConvention {
        ArgumentConvention::for_arity(self.inputs.len())
    }

    pub fn is_view(&self) -> bool {
        self.mutability == Mutability::ReadOnly
    }
}

fn resolve_inputs(
    resolver: &mut Resolver<'_>,
    function: &str,
    inputs: &[Parameter],
) -> Vec<ResolvedType> {
    inputs
        .iter()
        .map(|input| resolver.resolve_member(function, &input.name, &input.ty))
        .collect()
}
