//! Build variants: optimization profile crossed with module-loading
//! convention.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An optimization profile for the native build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile name, used in artifact file names (e.g. "speed").
    pub name: String,
    /// Optimization flag passed to the native compiler (e.g. "-O3").
    pub optimize: String,
    /// Additional compiler arguments for this profile only.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Profile {
    /// Create a profile without extra arguments.
    pub fn new(name: impl Into<String>, optimize: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optimize: optimize.into(),
            extra_args: Vec::new(),
        }
    }

    /// The speed-optimized profile.
    pub fn speed() -> Self {
        Self::new("speed", "-O3")
    }

    /// The size-optimized profile.
    pub fn size() -> Self {
        Self::new("size", "-Oz")
    }

    /// Add extra compiler arguments.
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// File name of the binary module produced for this profile.
    pub fn module_file_name(&self) -> String {
        format!("c25519.{}.wasm", self.name)
    }

    /// File name of the token manifest produced for this profile.
    pub fn manifest_file_name(&self) -> String {
        format!("c25519.{}.tokens.json", self.name)
    }
}

/// Module-loading convention of a rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    /// Classic script / CommonJS loading.
    Cjs,
    /// ECMAScript module loading.
    Esm,
}

impl ModuleFormat {
    /// Both conventions, in build order.
    pub const ALL: [ModuleFormat; 2] = [ModuleFormat::Cjs, ModuleFormat::Esm];

    /// Short name used in file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cjs => "cjs",
            Self::Esm => "esm",
        }
    }

    /// Whether the compactor must treat the input as an ECMAScript module.
    pub fn is_module(self) -> bool {
        matches!(self, Self::Esm)
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cjs" | "classic" | "commonjs" => Ok(Self::Cjs),
            "esm" | "module" => Ok(Self::Esm),
            other => Err(format!("unknown module format '{}'", other)),
        }
    }
}

/// Which of the two renderings of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rendering {
    /// Defines inlined, comments kept, nothing renamed.
    Readable,
    /// Properties renamed, unsafe optimizations, comments stripped.
    Compacted,
}

impl Rendering {
    /// Both renderings, in build order.
    pub const ALL: [Rendering; 2] = [Rendering::Readable, Rendering::Compacted];
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Readable => f.write_str("readable"),
            Self::Compacted => f.write_str("compacted"),
        }
    }
}

/// One (profile, loading convention) combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Optimization profile.
    pub profile: Profile,
    /// Loading convention.
    pub format: ModuleFormat,
}

impl Variant {
    /// Create a new variant.
    pub fn new(profile: Profile, format: ModuleFormat) -> Self {
        Self { profile, format }
    }

    /// All variants for the given profiles.
    pub fn matrix(profiles: &[Profile], formats: &[ModuleFormat]) -> Vec<Variant> {
        profiles
            .iter()
            .flat_map(|p| formats.iter().map(move |f| Variant::new(p.clone(), *f)))
            .collect()
    }

    /// File name of one rendering of this variant.
    pub fn file_name(&self, rendering: Rendering) -> String {
        match rendering {
            Rendering::Readable => {
                format!("c25519-wasm.{}.{}.js", self.profile.name, self.format)
            }
            Rendering::Compacted => {
                format!("c25519-wasm.{}.{}.min.js", self.profile.name, self.format)
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.profile.name, self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profiles() {
        assert_eq!(Profile::speed().optimize, "-O3");
        assert_eq!(Profile::size().optimize, "-Oz");
        assert_eq!(Profile::size().module_file_name(), "c25519.size.wasm");
    }

    #[test]
    fn variant_file_names() {
        let variant = Variant::new(Profile::speed(), ModuleFormat::Esm);
        assert_eq!(
            variant.file_name(Rendering::Readable),
            "c25519-wasm.speed.esm.js"
        );
        assert_eq!(
            variant.file_name(Rendering::Compacted),
            "c25519-wasm.speed.esm.min.js"
        );
        assert_eq!(variant.to_string(), "speed/esm");
    }

    #[test]
    fn matrix_covers_every_combination() {
        let variants = Variant::matrix(&[Profile::speed(), Profile::size()], &ModuleFormat::ALL);
        assert_eq!(variants.len(), 4);
        assert_eq!(variants[0].to_string(), "speed/cjs");
        assert_eq!(variants[3].to_string(), "size/esm");
    }

    #[test]
    fn module_format_parsing() {
        assert_eq!("CJS".parse::<ModuleFormat>(), Ok(ModuleFormat::Cjs));
        assert_eq!("module".parse::<ModuleFormat>(), Ok(ModuleFormat::Esm));
        assert!("amd".parse::<ModuleFormat>().is_err());
        assert!(ModuleFormat::Esm.is_module());
        assert!(!ModuleFormat::Cjs.is_module());
    }

    #[test]
    fn profile_yaml_defaults_extra_args() {
        let profile: Profile = serde_json::from_str(r#"{"name":"simd","optimize":"-O3"}"#)
            .expect("profile should parse");
        assert!(profile.extra_args.is_empty());
        let profile = profile.with_extra_args(["-msimd128"]);
        assert_eq!(profile.extra_args, vec!["-msimd128".to_string()]);
    }
}
