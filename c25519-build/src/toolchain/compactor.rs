//! Script compaction into the readable and compacted renderings.

use super::{ToolFuture, diagnostics_tail, spawn_error};
use crate::config::CompactorConfig;
use c25519_core::error::C25519Error;
use c25519_core::variant::{Rendering, Variant};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One compactor invocation.
#[derive(Debug, Clone, Copy)]
pub struct CompactRequest<'a> {
    /// Variant being rendered.
    pub variant: &'a Variant,
    /// Which rendering to produce.
    pub rendering: Rendering,
    /// Wrapped template with every token already substituted.
    pub source: &'a str,
}

/// Produces the final script text of a rendering.
pub trait Compactor: Send + Sync {
    /// Short tool name for logs.
    fn name(&self) -> &str;

    /// Transform `request.source` and return the output text.
    fn compact<'a>(&'a self, request: CompactRequest<'a>) -> ToolFuture<'a, String>;
}

/// The terser command-line compactor, fed through stdin.
#[derive(Debug, Clone, Default)]
pub struct Terser {
    config: CompactorConfig,
}

impl Terser {
    /// Create a driver from configuration.
    pub fn new(config: CompactorConfig) -> Self {
        Self { config }
    }

    /// Arguments for a rendering.
    ///
    /// Readable: beautified, all comments kept, nothing compressed or
    /// renamed. Compacted: two compression passes with the unsafe
    /// transforms, property renaming except quoted accesses, no comments.
    pub fn args(&self, variant: &Variant, rendering: Rendering) -> Vec<String> {
        let mut args = vec!["--ecma".to_string(), self.config.ecma.to_string()];

        match rendering {
            Rendering::Readable => {
                args.extend(
                    ["--format", "beautify=true", "--comments", "all"].map(String::from),
                );
            }
            Rendering::Compacted => {
                if variant.format.is_module() {
                    args.push("--module".to_string());
                }
                args.extend(
                    [
                        "--compress",
                        "passes=2,unsafe_math=true,unsafe_methods=true,unsafe_proto=true,\
                         unsafe_regexp=true,unsafe_undefined=true",
                        "--mangle",
                        "--mangle-props",
                        "keep_quoted=strict",
                        "--comments",
                        "false",
                    ]
                    .map(String::from),
                );
            }
        }
        args
    }
}

impl Compactor for Terser {
    fn name(&self) -> &str {
        &self.config.program
    }

    fn compact<'a>(&'a self, request: CompactRequest<'a>) -> ToolFuture<'a, String> {
        Box::pin(async move {
            let variant = request.variant.to_string();
            let fail = |cause: String| C25519Error::Compact {
                variant: format!("{} ({})", variant, request.rendering),
                cause,
            };

            let mut child = Command::new(&self.config.program)
                .args(self.args(request.variant, request.rendering))
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| spawn_error(&self.config.program, e, fail))?;

            // Feed stdin while stdout drains so large scripts cannot deadlock.
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| fail("stdin not captured".to_string()))?;
            let input = request.source.as_bytes().to_vec();
            let writer = tokio::spawn(async move {
                let result = stdin.write_all(&input).await;
                drop(stdin);
                result
            });

            let output = child
                .wait_with_output()
                .await
                .map_err(|e| fail(e.to_string()))?;
            writer
                .await
                .map_err(|e| fail(e.to_string()))?
                .map_err(|e| fail(e.to_string()))?;

            if !output.status.success() {
                return Err(fail(format!(
                    "{}: {}",
                    output.status,
                    diagnostics_tail(&output.stderr)
                )));
            }

            String::from_utf8(output.stdout).map_err(|e| fail(e.to_string()))
        })
    }
}
