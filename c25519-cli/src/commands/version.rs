//! Version command - show version information.

use anyhow::Result;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("c25519 - X25519/Ed25519 bridge builder");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  c25519-core     Errors, build variants, token mapping");
    println!("  c25519-runtime  Linear-memory arena and primitive facade");
    println!("  c25519-build    Multi-variant build pipeline");
    println!("  c25519-cli      Command-line interface");

    Ok(())
}
