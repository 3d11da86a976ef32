//! Native compilation of the computation module.

use super::{ToolFuture, diagnostics_tail, spawn_error};
use crate::config::CompilerConfig;
use c25519_core::error::C25519Error;
use c25519_core::variant::Profile;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// One compiler invocation.
#[derive(Debug, Clone)]
pub struct CompileRequest<'a> {
    /// Profile being built.
    pub profile: &'a Profile,
    /// Native sources.
    pub sources: &'a [PathBuf],
    /// Preprocessor definitions, already formatted as `-DNAME=value`.
    pub defines: Vec<String>,
    /// Where the binary module must be written.
    pub output: &'a Path,
}

/// Builds one binary module per profile.
pub trait Compiler: Send + Sync {
    /// Short tool name for logs.
    fn name(&self) -> &str;

    /// Compile `request.sources` into `request.output`.
    ///
    /// Returns the tool's diagnostics on success.
    fn compile<'a>(&'a self, request: CompileRequest<'a>) -> ToolFuture<'a, String>;
}

/// The Emscripten compiler driver.
#[derive(Debug, Clone, Default)]
pub struct Emcc {
    config: CompilerConfig,
}

impl Emcc {
    /// Create a driver from configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Full argument list for a request.
    pub fn args(&self, request: &CompileRequest<'_>) -> Vec<String> {
        let mut args: Vec<String> = request
            .sources
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        args.push(request.profile.optimize.clone());
        args.extend(request.profile.extra_args.iter().cloned());
        args.extend(request.defines.iter().cloned());
        args.extend(self.config.args.iter().cloned());
        args.push("-o".to_string());
        args.push(request.output.display().to_string());
        args
    }
}

impl Compiler for Emcc {
    fn name(&self) -> &str {
        &self.config.program
    }

    fn compile<'a>(&'a self, request: CompileRequest<'a>) -> ToolFuture<'a, String> {
        Box::pin(async move {
            let profile = request.profile.name.clone();
            let args = self.args(&request);
            tracing::debug!(program = %self.config.program, ?args, "running compiler");

            let output = Command::new(&self.config.program)
                .args(&args)
                .output()
                .await
                .map_err(|e| {
                    spawn_error(&self.config.program, e, |cause| C25519Error::Compile {
                        profile: profile.clone(),
                        cause,
                    })
                })?;

            if !output.status.success() {
                return Err(C25519Error::Compile {
                    profile,
                    cause: format!("{}: {}", output.status, diagnostics_tail(&output.stderr)),
                });
            }

            // emcc reports on stderr even when it succeeds.
            Ok(String::from_utf8_lossy(&output.stderr).into_owned())
        })
    }
}
