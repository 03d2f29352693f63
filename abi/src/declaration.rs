//! The declaration list as it appears in a JSON ABI document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{error::AbiError, table::DeclarationTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Declaration {
    Impl(ImplDecl),
    Interface(InterfaceDecl),
    Constructor(ConstructorDecl),
    Function(FunctionDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Event(EventDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Impl(decl) => &decl.name,
            Self::Interface(decl) => &decl.name,
            Self::Constructor(decl) => &decl.name,
            Self::Function(decl) => &decl.name,
            Self::Struct(decl) => &decl.name,
            Self::Enum(decl) => &decl.name,
            Self::Event(decl) => &decl.name,
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            Self::Impl(_) => DeclarationKind::Impl,
            Self::Interface(_) => DeclarationKind::Interface,
            Self::Constructor(_) => DeclarationKind::Constructor,
            Self::Function(_) => DeclarationKind::Function,
            Self::Struct(_) => DeclarationKind::Struct,
            Self::Enum(_) => DeclarationKind::Enum,
            Self::Event(_) => DeclarationKind::Event,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Impl,
    Interface,
    Constructor,
    Function,
    Struct,
    Enum,
    Event,
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Impl => "impl",
            Self::Interface => "interface",
            Self::Constructor => "constructor",
            Self::Function => "function",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Event => "event",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplDecl {
    pub name: String,
    pub interface_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub items: Vec<FunctionDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default = "default_constructor_name")]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Parameter>,
}

fn default_constructor_name() -> String {
    "constructor".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Parameter>,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(rename = "state_mutability")]
    pub mutability: Mutability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutability {
    #[serde(rename = "view")]
    ReadOnly,
    #[serde(rename = "external")]
    StateChanging,
}

/// A named, typed slot: function parameters, struct members and enum variants all share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

pub type Member = Parameter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDecl {
    pub name: String,
    #[serde(flatten)]
    pub body: EventBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventBody {
    Struct {
        #[serde(default)]
        members: Vec<EventMember>,
    },
    Enum {
        #[serde(default)]
        variants: Vec<EventMember>,
    },
}

impl EventDecl {
    /// Members of a struct event or variants of an enum event.
    pub fn entries(&self) -> &[EventMember] {
        match &self.body {
            EventBody::Struct { members } => members,
            EventBody::Enum { variants } => variants,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Carried along but never affects the materialized shape.
    pub kind: EventMemberKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMemberKind {
    Nested,
    Data,
    Key,
    Flat,
}

/// An entry of the document that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDiagnostic {
    pub index: usize,
    /// The entry's `"type"` tag, when it had one.
    pub tag: Option<String>,
    pub message: String,
}

/// A loaded declaration list, plus the entries that could not be understood.
#[derive(Debug, Clone, Default)]
pub struct Abi {
    declarations: Vec<Declaration>,
    diagnostics: Vec<LoadDiagnostic>,
}

impl Abi {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self {
            declarations,
            diagnostics: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let value: Value = serde_json::from_str(json).map_err(AbiError::Syntax)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, AbiError> {
        let entries: Vec<Value> = serde_json::from_value(value).map_err(AbiError::NotAnArray)?;
        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: Vec<Value>) -> Self {
        let mut abi = Self::default();
        for (index, entry) in entries.into_iter().enumerate() {
            let tag = entry
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string);
            match serde_json::from_value::<Declaration>(entry) {
                Ok(declaration) => abi.declarations.push(declaration),
                Err(e) => {
                    warn!(index, tag = tag.as_deref(), error = %e, "skipping ABI entry");
                    abi.diagnostics.push(LoadDiagnostic {
                        index,
                        tag,
                        message: e.to_string(),
                    });
                }
            }
        }
        abi
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    pub fn into_table(self) -> DeclarationTable {
        DeclarationTable::build(self.declarations)
    }
}

impl From<Abi> for DeclarationTable {
    fn from(abi: Abi) -> Self {
        abi.into_table()
    }
}
