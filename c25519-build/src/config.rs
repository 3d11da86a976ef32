//! Build configuration from YAML.
//!
//! Every field has a default matching the repository layout, so an absent
//! `c25519-build.yaml` is the same as an empty one.

use c25519_core::error::{C25519Error, Result};
use c25519_core::tokens::{DEFAULT_PATTERN, TokenCollector};
use c25519_core::variant::{ModuleFormat, Profile};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default configuration file name, looked up in the project root.
pub const CONFIG_FILE: &str = "c25519-build.yaml";

/// Settings for one build run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Script template rendered into every variant.
    pub template: PathBuf,

    /// Directory holding one `<format>.js` wrapper per loading convention.
    pub wrapper_dir: PathBuf,

    /// Loading conventions to render.
    pub formats: Vec<ModuleFormat>,

    /// Files scanned for placeholder tokens. Unreadable entries are skipped.
    pub token_sources: Vec<PathBuf>,

    /// Native sources passed to the compiler.
    pub sources: Vec<PathBuf>,

    /// Deliverables directory, recreated on every run.
    pub out_dir: PathBuf,

    /// Regular expression matching placeholder tokens.
    pub token_pattern: String,

    /// Token receiving the encoded binary module.
    pub payload_token: String,

    /// Optimization profiles, built concurrently.
    pub profiles: Vec<Profile>,

    /// Native compiler invocation.
    pub compiler: CompilerConfig,

    /// Compactor invocation.
    pub compactor: CompactorConfig,

    /// Type declaration file copied into the deliverables.
    pub declaration: Option<DeclarationCopy>,
}

/// Native compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Program to run.
    pub program: String,
    /// Arguments appended after sources, profile flags and defines.
    pub args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "emcc".to_string(),
            args: ["-v", "-flto", "-s", "SIDE_MODULE=2"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Compactor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactorConfig {
    /// Program to run.
    pub program: String,
    /// ECMAScript version of the output.
    pub ecma: u32,
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            program: "terser".to_string(),
            ecma: 2020,
        }
    }
}

/// A file copied verbatim into the deliverables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationCopy {
    /// Source file.
    pub from: PathBuf,
    /// Destination, relative paths resolved against the project root.
    pub to: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        let template = PathBuf::from("src/c25519-wasm-template.js");
        let native = |name: &str| PathBuf::from("src/wasm").join(name);

        Self {
            token_sources: vec![native("c25519.h"), native("edsign.h"), template.clone()],
            template,
            wrapper_dir: PathBuf::from("src/wrapper"),
            formats: ModuleFormat::ALL.to_vec(),
            sources: [
                "c25519.c",
                "ed25519.c",
                "edsign.c",
                "f25519.c",
                "fprime.c",
                "memcpy.c",
                "memset.c",
                "morph25519.c",
                "sha512.c",
            ]
            .into_iter()
            .map(native)
            .collect(),
            out_dir: PathBuf::from("dist"),
            token_pattern: DEFAULT_PATTERN.to_string(),
            payload_token: "__WASM_BASE64__".to_string(),
            profiles: vec![Profile::speed(), Profile::size()],
            compiler: CompilerConfig::default(),
            compactor: CompactorConfig::default(),
            declaration: Some(DeclarationCopy {
                from: PathBuf::from("src/c25519-wasm-template.d.ts"),
                to: PathBuf::from("dist/c25519-wasm.d.ts"),
            }),
        }
    }
}

impl BuildConfig {
    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| C25519Error::Config {
            cause: e.to_string(),
        })
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| C25519Error::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Load the configuration for a project rooted at `root`.
    ///
    /// Uses `explicit` if given, else `root/c25519-build.yaml` if it exists,
    /// else the defaults. Relative paths are resolved against `root`.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = root.join(CONFIG_FILE);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(config.with_root(root))
    }

    /// Resolve every relative path against `root`.
    pub fn with_root(mut self, root: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        };

        resolve(&mut self.template);
        resolve(&mut self.wrapper_dir);
        resolve(&mut self.out_dir);
        self.token_sources.iter_mut().for_each(resolve);
        self.sources.iter_mut().for_each(resolve);
        if let Some(declaration) = self.declaration.as_mut() {
            resolve(&mut declaration.from);
            resolve(&mut declaration.to);
        }
        self
    }

    /// Keep only the named profiles, in configuration order.
    ///
    /// An empty selection keeps every profile.
    pub fn select_profiles(mut self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }

        if let Some(unknown) = names
            .iter()
            .find(|n| !self.profiles.iter().any(|p| &p.name == *n))
        {
            return Err(C25519Error::Config {
                cause: format!("unknown profile '{}'", unknown),
            });
        }

        self.profiles.retain(|p| names.contains(&p.name));
        Ok(self)
    }

    /// Check the configuration for mistakes that would only surface midway
    /// through a build.
    pub fn validate(&self) -> Result<()> {
        let fail = |cause: String| Err(C25519Error::Config { cause });

        if self.profiles.is_empty() {
            return fail("no profiles configured".to_string());
        }
        for (i, profile) in self.profiles.iter().enumerate() {
            if profile.name.is_empty() {
                return fail(format!("profile #{} has no name", i));
            }
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                return fail(format!("duplicate profile '{}'", profile.name));
            }
        }
        if self.formats.is_empty() {
            return fail("no module formats configured".to_string());
        }
        if self.sources.is_empty() {
            return fail("no native sources configured".to_string());
        }

        let collector = TokenCollector::new(&self.token_pattern)?;
        if !collector.pattern().is_match(&self.payload_token) {
            return fail(format!(
                "payload token '{}' does not match the token pattern",
                self.payload_token
            ));
        }

        self.validate_out_dir()
    }

    /// The output directory is deleted on every run, so it must not hold
    /// any input.
    fn validate_out_dir(&self) -> Result<()> {
        let out_dir = lexical(&self.out_dir);
        if out_dir.as_os_str().is_empty() || out_dir.parent().is_none() {
            return Err(C25519Error::Config {
                cause: format!(
                    "output directory '{}' is a root directory",
                    self.out_dir.display()
                ),
            });
        }

        let inputs = [&self.template, &self.wrapper_dir]
            .into_iter()
            .chain(&self.token_sources)
            .chain(&self.sources)
            .chain(self.declaration.as_ref().map(|d| &d.from));
        for input in inputs {
            if lexical(input).starts_with(&out_dir) {
                return Err(C25519Error::Config {
                    cause: format!(
                        "output directory '{}' contains input '{}'",
                        self.out_dir.display(),
                        input.display()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Wrapper file for a loading convention.
    pub fn wrapper_path(&self, format: ModuleFormat) -> PathBuf {
        self.wrapper_dir.join(format!("{}.js", format))
    }

    /// Binary module path for a profile.
    pub fn module_path(&self, profile: &Profile) -> PathBuf {
        self.out_dir.join(profile.module_file_name())
    }

    /// Token manifest path for a profile.
    pub fn manifest_path(&self, profile: &Profile) -> PathBuf {
        self.out_dir.join(profile.manifest_file_name())
    }
}

/// Fold `.` and `..` components without touching the filesystem.
fn lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
