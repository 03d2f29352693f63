mod common;

#[cfg(feature = "generator-rust")]
mod rust;
#[cfg(feature = "generator-typescript")]
mod typescript;

#[cfg(not(any(feature = "generator-rust", feature = "generator-typescript")))]
compile_error!("At least one generator must be enabled");

use ca_abi::DeclarationTable;
use clap::ValueEnum;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    #[cfg(feature = "generator-rust")]
    Rust,
    #[cfg(feature = "generator-typescript")]
    Typescript,
}

impl Generator {
    pub fn generate(&self, table: &DeclarationTable, contract_name: &str) -> String {
        match *self {
            #[cfg(feature = "generator-rust")]
            Self::Rust => rust::generate(table, contract_name),
            #[cfg(feature = "generator-typescript")]
            Self::Typescript => typescript::generate(table, contract_name),
        }
    }
}
