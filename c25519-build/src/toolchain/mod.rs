//! External tools driven by the build.
//!
//! Both tools sit behind a trait so a build can run against stand-ins; the
//! default implementations spawn `emcc` and `terser`.

mod compactor;
mod compiler;

pub use compactor::{CompactRequest, Compactor, Terser};
pub use compiler::{CompileRequest, Compiler, Emcc};

use c25519_core::error::{C25519Error, Result};
use std::future::Future;
use std::pin::Pin;

/// A boxed future for async tool invocations.
pub type ToolFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Map a spawn failure to [`C25519Error::MissingBinary`] when the program
/// does not exist, or to `other` otherwise.
pub(crate) fn spawn_error(
    program: &str,
    err: std::io::Error,
    other: impl FnOnce(String) -> C25519Error,
) -> C25519Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        C25519Error::MissingBinary {
            binary: program.to_string(),
            cause: err.to_string(),
        }
    } else {
        other(err.to_string())
    }
}

/// Last lines of a tool's diagnostics, enough to explain a failure.
pub(crate) fn diagnostics_tail(stderr: &[u8]) -> String {
    const LINES: usize = 20;
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(LINES)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_missing_binary() {
        let err = spawn_error(
            "emcc",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            |cause| C25519Error::Compile {
                profile: "speed".to_string(),
                cause,
            },
        );
        assert_eq!(err.code(), "E303");

        let err = spawn_error(
            "emcc",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            |cause| C25519Error::Compile {
                profile: "speed".to_string(),
                cause,
            },
        );
        assert_eq!(err.code(), "E301");
    }

    #[test]
    fn tail_keeps_last_lines() {
        let text: String = (0..50).map(|i| format!("line {}\n", i)).collect();
        let tail = diagnostics_tail(text.as_bytes());
        assert!(tail.starts_with("line 30"));
        assert!(tail.ends_with("line 49"));
    }
}
