use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    descriptor::{parse_descriptor, Shape},
    error::ResolveError,
    resolved::ResolvedType,
    table::{DeclarationTable, NamedDeclaration},
    tuple,
};

/// One resolution pass over a table. Tracks the named declarations currently being
/// materialized so that a declaration reaching itself through a wrapper becomes a
/// [`ResolvedType::Recursive`] back-reference.
///
/// Shapes without back-references do not depend on what is in progress, so they are
/// materialized once per pass and reused.
pub(crate) struct Resolver<'t> {
    pub(crate) table: &'t DeclarationTable,
    in_progress: Vec<String>,
    materialized: HashMap<&'t str, ResolvedType>,
}

impl<'t> Resolver<'t> {
    pub(crate) fn new(table: &'t DeclarationTable) -> Self {
        Self {
            table,
            in_progress: Vec::new(),
            materialized: HashMap::new(),
        }
    }

    pub(crate) fn resolve(&mut self, descriptor: &str) -> ResolvedType {
        self.try_resolve(descriptor).unwrap_or_else(|e| {
            warn!(descriptor, error = %e, "descriptor resolves to unknown");
            ResolvedType::Unknown
        })
    }

    pub(crate) fn try_resolve(&mut self, descriptor: &str) -> Result<ResolvedType, ResolveError> {
        let shape = parse_descriptor(descriptor)?;
        self.resolve_shape(&shape)
    }

    fn resolve_shape(&mut self, shape: &Shape<'_>) -> Result<ResolvedType, ResolveError> {
        match shape {
            Shape::Primitive(kind) => Ok(kind.resolved()),
            Shape::Generic(wrapper, inner) => Ok(wrapper.apply(self.resolve_shape(inner)?)),
            Shape::Tuple(elements) => elements
                .iter()
                .map(|element| self.resolve_shape(element))
                .collect::<Result<Vec<_>, _>>()
                .map(tuple::assemble),
            Shape::Named(name) => self.resolve_named(name),
        }
    }

    fn resolve_named(&mut self, name: &str) -> Result<ResolvedType, ResolveError> {
        if self.in_progress.iter().any(|n| n == name) {
            return Ok(ResolvedType::Recursive(name.to_string()));
        }
        if let Some(shape) = self.materialized.get(name) {
            return Ok(shape.clone());
        }
        match self.table.lookup(name) {
            Some(declaration) => self.try_resolve_declaration(declaration),
            None => {
                debug!(name, "no struct, enum or event with this name");
                Ok(ResolvedType::Unknown)
            }
        }
    }

    pub(crate) fn try_resolve_declaration(
        &mut self,
        declaration: NamedDeclaration<'t>,
    ) -> Result<ResolvedType, ResolveError> {
        let name = declaration.name();
        if let Some(shape) = self.materialized.get(name) {
            return Ok(shape.clone());
        }
        self.in_progress.push(name.to_string());
        let materialized = self.materialize(declaration);
        self.in_progress.pop();
        if let Ok(shape) = &materialized {
            if !shape.contains_recursive() {
                self.materialized.insert(name, shape.clone());
            }
        }
        materialized
    }

    pub(crate) fn resolve_declaration(&mut self, declaration: NamedDeclaration<'t>) -> ResolvedType {
        self.try_resolve_declaration(declaration)
            .unwrap_or_else(|e| {
                warn!(name = declaration.name(), error = %e, "declaration resolves to unknown");
                ResolvedType::Unknown
            })
    }

    /// Resolves the descriptor of one member, variant or parameter. Failures stay local to it.
    pub(crate) fn resolve_member(
        &mut self,
        owner: &str,
        member: &str,
        descriptor: &str,
    ) -> ResolvedType {
        self.try_resolve(descriptor).unwrap_or_else(|e| {
            warn!(owner, member, descriptor, error = %e, "member resolves to unknown");
            ResolvedType::Unknown
        })
    }
}
