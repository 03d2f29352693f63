use std::collections::HashSet;

use ca_abi::{
    declaration::{EnumDecl, EventDecl, FunctionDecl, StructDecl},
    descriptor::{parse_descriptor, Shape},
    generic::Wrapper,
    DeclarationTable, NamedDeclaration, PrimitiveKind, ResolveError,
};
use tracing::debug;

use crate::naming::TypeNamer;

pub(super) trait DeclarationVisitor: Sized {
    type StructValue;
    fn visit_struct(&mut self, ctx: &mut GeneratorContext, decl: &StructDecl)
        -> Self::StructValue;

    type EnumValue;
    fn visit_enum(&mut self, ctx: &mut GeneratorContext, decl: &EnumDecl) -> Self::EnumValue;

    type EventValue;
    fn visit_event(&mut self, ctx: &mut GeneratorContext, decl: &EventDecl) -> Self::EventValue;

    type FunctionValue;
    fn visit_function(
        &mut self,
        ctx: &mut GeneratorContext,
        decl: &FunctionDecl,
    ) -> Self::FunctionValue;
}

/// A descriptor as seen by the generators: like a resolved type, but named declarations stay
/// references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TypeRef {
    Primitive(PrimitiveKind),
    Option(Box<TypeRef>),
    Array(Box<TypeRef>),
    Tuple(Vec<TypeRef>),
    Named {
        /// Generated type name
        name: String,
        /// Whether the declaration can reach itself
        cyclic: bool,
    },
    Unknown,
}

pub(super) struct GeneratorContext<'a> {
    pub(super) table: &'a DeclarationTable,
    pub(super) names: TypeNamer,
    pub(super) contract_name: String,
    pub(super) visited: HashSet<String>,
    cyclic: HashSet<String>,
    self_referential: HashSet<String>,
}

impl<'a> GeneratorContext<'a> {
    pub(super) fn new(table: &'a DeclarationTable, contract_name: &str) -> Self {
        let declared = table
            .structs()
            .iter()
            .map(|decl| decl.name.as_str())
            .chain(table.enums().iter().map(|decl| decl.name.as_str()))
            .chain(table.events().iter().map(|decl| decl.name.as_str()));
        let names = TypeNamer::new(declared);

        let mut cyclic = HashSet::new();
        let mut self_referential = HashSet::new();
        for (name, shape) in table.named_shapes() {
            match shape {
                Ok(shape) if shape.refers_back_to(name) => {
                    cyclic.insert(name.to_string());
                }
                Ok(_) => {}
                Err(ResolveError::DirectSelfReference { .. }) => {
                    self_referential.insert(name.to_string());
                }
                Err(e) => debug!(name, error = %e, "unresolvable declaration"),
            }
        }

        Self {
            table,
            names,
            contract_name: contract_name.to_string(),
            visited: HashSet::new(),
            cyclic,
            self_referential,
        }
    }

    /// Declarations containing themselves with no indirection have no finite representation;
    /// they are emitted as untyped values.
    pub(super) fn is_self_referential(&self, name: &str) -> bool {
        self.self_referential.contains(name)
    }

    pub(super) fn type_ref(&self, descriptor: &str) -> TypeRef {
        match parse_descriptor(descriptor) {
            Ok(shape) => self.shape_ref(&shape),
            Err(e) => {
                debug!(descriptor, error = %e, "malformed descriptor");
                TypeRef::Unknown
            }
        }
    }

    fn shape_ref(&self, shape: &Shape<'_>) -> TypeRef {
        match shape.collapse_options() {
            Shape::Primitive(PrimitiveKind::Unit) => TypeRef::Tuple(Vec::new()),
            Shape::Primitive(kind) => TypeRef::Primitive(*kind),
            Shape::Generic(Wrapper::Option, inner) => TypeRef::Option(Box::new(self.shape_ref(inner))),
            Shape::Generic(Wrapper::Array, inner) => TypeRef::Array(Box::new(self.shape_ref(inner))),
            Shape::Tuple(elements) => {
                TypeRef::Tuple(elements.iter().map(|e| self.shape_ref(e)).collect())
            }
            Shape::Named(name) => match self.table.lookup(name) {
                Some(declaration) => self.named_ref(declaration),
                None => TypeRef::Unknown,
            },
        }
    }

    fn named_ref(&self, declaration: NamedDeclaration<'_>) -> TypeRef {
        let declared = declaration.name();
        match self.names.get(declared) {
            Some(name) => TypeRef::Named {
                name: name.to_string(),
                cyclic: self.cyclic.contains(declared),
            },
            None => TypeRef::Unknown,
        }
    }
}

/// Visits every struct, enum and event, then every function, in declaration order.
pub(super) fn walk<V: DeclarationVisitor>(
    visitor: &mut V,
    ctx: &mut GeneratorContext,
) -> Vec<V::FunctionValue> {
    let table = ctx.table;
    for decl in table.structs() {
        if ctx.visited.insert(decl.name.clone()) {
            visitor.visit_struct(ctx, decl);
        }
    }
    for decl in table.enums() {
        if ctx.visited.insert(decl.name.clone()) {
            visitor.visit_enum(ctx, decl);
        }
    }
    for decl in table.events() {
        if ctx.visited.insert(decl.name.clone()) {
            visitor.visit_event(ctx, decl);
        }
    }
    table
        .functions()
        .iter()
        .map(|decl| visitor.visit_function(ctx, decl))
        .collect()
}
