mod cli;
mod generators;
mod naming;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ca_abi::Abi;

fn read_input(cli: &cli::Cli) -> anyhow::Result<String> {
    if cli.input_is_url() {
        info!(url = %cli.input, "fetching ABI");
        let response = reqwest::blocking::get(&cli.input)
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("failed to fetch {}", cli.input))?;
        Ok(response.text()?)
    } else {
        std::fs::read_to_string(&cli.input).with_context(|| format!("failed to read {}", cli.input))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let json = read_input(&cli)?;
    let abi = Abi::from_json(&json).with_context(|| format!("failed to load {}", cli.input))?;
    if !abi.diagnostics().is_empty() {
        warn!(
            skipped = abi.diagnostics().len(),
            "some ABI entries were not understood"
        );
    }
    let table = abi.into_table();

    let output = cli.generator.generate(&table, &cli.contract_name);
    match &cli.output {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{output}"),
    }
    Ok(())
}
