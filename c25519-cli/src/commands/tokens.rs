//! Tokens command - show the harvested mapping in both encodings.

use anyhow::Result;
use c25519_build::{BuildConfig, BuildPipeline};
use std::path::Path;

/// Run the tokens command.
pub async fn run(root: &Path, config: Option<&Path>) -> Result<()> {
    let config = BuildConfig::load(root, config)?;
    let collector = BuildPipeline::from_config(config).harvest().await?;
    let mapping = collector.mapping();

    println!("Tokens ({}):", mapping.len());
    for (name, value) in mapping.iter() {
        match value.compiler_literal() {
            Some(literal) => println!("  {} = {}", name, literal),
            None => println!("  {} (resolved at build time)", name),
        }
    }

    println!();
    println!("Compiler defines:");
    for define in mapping.compiler_defines() {
        println!("  {}", define);
    }

    println!();
    println!("Compactor globals:");
    for (name, literal) in mapping.compactor_defines() {
        println!("  {}: {}", name, literal);
    }

    Ok(())
}
