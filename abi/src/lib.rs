pub mod contract;
pub mod declaration;
pub mod descriptor;
pub mod error;
pub mod generic;
mod materialize;
pub mod primitives;
pub mod resolved;
mod resolver;
pub mod signature;
pub mod table;
pub mod tuple;

pub use contract::{Args, Contract, ContractFunctions, ExternalFunction, FunctionBinding, ViewFunction};
pub use declaration::{Abi, Declaration, Mutability};
pub use error::{AbiError, CallError, DescriptorError, ResolveError};
pub use primitives::{HostRepr, PrimitiveKind};
pub use resolved::{Field, ResolvedType, Variant};
pub use signature::{ArgumentConvention, FunctionSignature, ReturnShape};
pub use table::{DeclarationTable, NamedDeclaration, TableDiagnostic};
