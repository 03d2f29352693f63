use std::path::PathBuf;

use clap::Parser;

use crate::generators::Generator;

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(value_parser, help = "The ABI file or URL")]
    pub input: String,

    #[clap(long, short, value_enum, default_value = "rust")]
    pub generator: Generator,

    #[clap(long, short, help = "Write the binding here instead of to stdout")]
    pub output: Option<PathBuf>,

    #[clap(
        long,
        default_value = "Contract",
        help = "Name of the generated contract client"
    )]
    pub contract_name: String,
}

impl Cli {
    pub fn input_is_url(&self) -> bool {
        self.input.starts_with("http://") || self.input.starts_with("https://")
    }
}
