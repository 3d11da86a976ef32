//! Build command - render every variant into the output directory.

use anyhow::{Result, bail};
use c25519_build::{BuildConfig, BuildPipeline};
use std::path::Path;

/// Run the build command.
pub async fn run(root: &Path, config: Option<&Path>, profiles: &[String]) -> Result<()> {
    let config = BuildConfig::load(root, config)?.select_profiles(profiles)?;
    tracing::info!(root = %root.display(), out_dir = %config.out_dir.display(), "Building");

    let report = BuildPipeline::from_config(config).run().await?;

    for path in report.artifacts() {
        println!("  {}", path.display());
    }

    let failures = report.failures();
    if !failures.is_empty() {
        println!();
        println!("Failed:");
        for (label, error) in &failures {
            println!("  {}: {}", label, error);
        }
        bail!("{} of the build outputs failed", failures.len());
    }

    println!();
    println!("Built {} artifacts", report.artifacts().len());
    Ok(())
}
