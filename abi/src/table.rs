use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::warn;

use crate::{
    declaration::{
        ConstructorDecl, Declaration, DeclarationKind, EnumDecl, EventDecl, FunctionDecl,
        InterfaceDecl, StructDecl,
    },
    error::ResolveError,
    resolved::ResolvedType,
    resolver::Resolver,
    signature::FunctionSignature,
};

/// A problem found while indexing declarations. None of these prevent the table from being
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableDiagnostic {
    #[error("duplicate {kind} {name:?}, keeping the first declaration")]
    DuplicateName { kind: DeclarationKind, name: String },
    #[error("impl {impl_name:?} refers to unknown interface {interface_name:?}")]
    MissingInterface {
        impl_name: String,
        interface_name: String,
    },
    #[error("duplicate function {name:?}, keeping the first declaration")]
    DuplicateFunction { name: String },
    #[error("duplicate constructor, keeping the first declaration")]
    DuplicateConstructor,
}

/// A declaration found by bare name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedDeclaration<'a> {
    Struct(&'a StructDecl),
    Enum(&'a EnumDecl),
    Event(&'a EventDecl),
}

impl<'a> NamedDeclaration<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Struct(decl) => &decl.name,
            Self::Enum(decl) => &decl.name,
            Self::Event(decl) => &decl.name,
        }
    }
}

#[derive(Debug, Clone)]
struct Indexed<T> {
    items: Box<[T]>,
    by_name: HashMap<String, usize>,
}

impl<T> Indexed<T> {
    fn get(&self, name: &str) -> Option<&T> {
        self.by_name.get(name).map(|&i| &self.items[i])
    }
}

struct IndexBuilder<T> {
    items: Vec<T>,
    by_name: HashMap<String, usize>,
}

impl<T> IndexBuilder<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Returns `false` if the name was already taken.
    fn insert(&mut self, name: &str, item: T) -> bool {
        if self.by_name.contains_key(name) {
            return false;
        }
        self.by_name.insert(name.to_string(), self.items.len());
        self.items.push(item);
        true
    }

    fn finish(self) -> Indexed<T> {
        Indexed {
            items: self.items.into_boxed_slice(),
            by_name: self.by_name,
        }
    }
}

/// Immutable, name-indexed view of a declaration list.
///
/// Functions are flattened: top-level functions and the items of every interface referenced by
/// an impl are addressable by bare name, in declaration order.
#[derive(Debug, Clone)]
pub struct DeclarationTable {
    structs: Indexed<StructDecl>,
    enums: Indexed<EnumDecl>,
    events: Indexed<EventDecl>,
    functions: Indexed<FunctionDecl>,
    constructor: Option<ConstructorDecl>,
    diagnostics: Box<[TableDiagnostic]>,
}

impl DeclarationTable {
    pub fn build(declarations: impl IntoIterator<Item = Declaration>) -> Self {
        let declarations: Vec<Declaration> = declarations.into_iter().collect();
        let mut diagnostics = Vec::new();

        let mut interfaces: HashMap<&str, &InterfaceDecl> = HashMap::new();
        for declaration in &declarations {
            if let Declaration::Interface(interface) = declaration {
                if interfaces.contains_key(interface.name.as_str()) {
                    diagnostics.push(TableDiagnostic::DuplicateName {
                        kind: DeclarationKind::Interface,
                        name: interface.name.clone(),
                    });
                } else {
                    interfaces.insert(&interface.name, interface);
                }
            }
        }

        let mut structs = IndexBuilder::new();
        let mut enums = IndexBuilder::new();
        let mut events = IndexBuilder::new();
        let mut functions = IndexBuilder::new();
        let mut constructor = None;
        let mut expanded = HashSet::new();

        let mut add_function = |function: &FunctionDecl, diagnostics: &mut Vec<TableDiagnostic>| {
            if !functions.insert(&function.name, function.clone()) {
                diagnostics.push(TableDiagnostic::DuplicateFunction {
                    name: function.name.clone(),
                });
            }
        };

        for declaration in &declarations {
            let inserted = match declaration {
                Declaration::Impl(impl_) => {
                    match interfaces.get(impl_.interface_name.as_str()) {
                        Some(interface) => {
                            if expanded.insert(interface.name.as_str()) {
                                for item in &interface.items {
                                    add_function(item, &mut diagnostics);
                                }
                            }
                        }
                        None => diagnostics.push(TableDiagnostic::MissingInterface {
                            impl_name: impl_.name.clone(),
                            interface_name: impl_.interface_name.clone(),
                        }),
                    }
                    true
                }
                Declaration::Interface(_) => true,
                Declaration::Function(function) => {
                    add_function(function, &mut diagnostics);
                    true
                }
                Declaration::Constructor(decl) => {
                    if constructor.is_none() {
                        constructor = Some(decl.clone());
                    } else {
                        diagnostics.push(TableDiagnostic::DuplicateConstructor);
                    }
                    true
                }
                Declaration::Struct(decl) => structs.insert(&decl.name, decl.clone()),
                Declaration::Enum(decl) => enums.insert(&decl.name, decl.clone()),
                Declaration::Event(decl) => events.insert(&decl.name, decl.clone()),
            };
            if !inserted {
                diagnostics.push(TableDiagnostic::DuplicateName {
                    kind: declaration.kind(),
                    name: declaration.name().to_string(),
                });
            }
        }

        for diagnostic in &diagnostics {
            warn!(%diagnostic, "declaration table");
        }

        Self {
            structs: structs.finish(),
            enums: enums.finish(),
            events: events.finish(),
            functions: functions.finish(),
            constructor,
            diagnostics: diagnostics.into_boxed_slice(),
        }
    }

    /// Looks a bare name up among structs, then enums, then events.
    pub fn lookup(&self, name: &str) -> Option<NamedDeclaration<'_>> {
        self.structs
            .get(name)
            .map(NamedDeclaration::Struct)
            .or_else(|| self.enums.get(name).map(NamedDeclaration::Enum))
            .or_else(|| self.events.get(name).map(NamedDeclaration::Event))
    }

    pub fn struct_decl(&self, name: &str) -> Option<&StructDecl> {
        self.structs.get(name)
    }

    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.get(name)
    }

    pub fn event_decl(&self, name: &str) -> Option<&EventDecl> {
        self.events.get(name)
    }

    pub fn structs(&self) -> &[StructDecl] {
        &self.structs.items
    }

    pub fn enums(&self) -> &[EnumDecl] {
        &self.enums.items
    }

    pub fn events(&self) -> &[EventDecl] {
        &self.events.items
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.get(name)
    }

    /// Flattened functions in declaration order.
    pub fn functions(&self) -> &[FunctionDecl] {
        &self.functions.items
    }

    pub fn constructor(&self) -> Option<&ConstructorDecl> {
        self.constructor.as_ref()
    }

    pub fn diagnostics(&self) -> &[TableDiagnostic] {
        &self.diagnostics
    }

    /// Resolves a descriptor. Anything that cannot be resolved becomes
    /// [`ResolvedType::Unknown`].
    pub fn resolve(&self, descriptor: &str) -> ResolvedType {
        Resolver::new(self).resolve(descriptor)
    }

    pub fn try_resolve(&self, descriptor: &str) -> Result<ResolvedType, ResolveError> {
        Resolver::new(self).try_resolve(descriptor)
    }

    /// The materialized record or tagged union for a struct, enum or event name.
    pub fn named_shape(&self, name: &str) -> Option<ResolvedType> {
        self.lookup(name)
            .map(|declaration| Resolver::new(self).resolve_declaration(declaration))
    }

    /// Every struct, enum and event with its materialized shape, structs first.
    pub fn named_shapes(&self) -> Vec<(&str, Result<ResolvedType, ResolveError>)> {
        let declarations = self
            .structs
            .items
            .iter()
            .map(NamedDeclaration::Struct)
            .chain(self.enums.items.iter().map(NamedDeclaration::Enum))
            .chain(self.events.items.iter().map(NamedDeclaration::Event));
        let mut resolver = Resolver::new(self);
        declarations
            .map(|declaration| {
                let shape = resolver.try_resolve_declaration(declaration);
                (declaration.name(), shape)
            })
            .collect()
    }

    pub fn signature(&self, function: &str) -> Option<FunctionSignature> {
        self.function(function)
            .map(|decl| FunctionSignature::build(self, decl))
    }

    pub fn signatures(&self) -> Vec<FunctionSignature> {
        self.functions()
            .iter()
            .map(|decl| FunctionSignature::build(self, decl))
            .collect()
    }

    pub fn constructor_signature(&self) -> Option<FunctionSignature> {
        self.constructor()
            .map(|decl| FunctionSignature::build_constructor(self, decl))
    }
}

impl FromIterator<Declaration> for DeclarationTable {
    fn from_iter<I: IntoIterator<Item = Declaration>>(iter: I) -> Self {
        Self::build(iter)
    }
}
