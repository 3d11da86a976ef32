//! Outcome of a build run.

use c25519_core::error::C25519Error;
use c25519_core::variant::{Rendering, Variant};
use std::path::{Path, PathBuf};

/// Result of one [`crate::BuildPipeline::run`].
#[derive(Debug)]
pub struct BuildReport {
    /// One entry per profile, in configuration order.
    pub profiles: Vec<ProfileReport>,
    /// Copied type declaration, if one was configured and found.
    pub declaration: Option<PathBuf>,
}

/// Outcome of one profile.
#[derive(Debug)]
pub struct ProfileReport {
    /// Profile name.
    pub profile: String,
    /// Artifacts, or the error that aborted the whole profile.
    pub outcome: Result<ProfileArtifacts, C25519Error>,
}

/// Files produced for one profile.
#[derive(Debug)]
pub struct ProfileArtifacts {
    /// Binary module.
    pub module: PathBuf,
    /// Token manifest written next to the module.
    pub manifest: PathBuf,
    /// One entry per loading convention.
    pub variants: Vec<VariantReport>,
}

/// Outcome of one variant.
#[derive(Debug)]
pub struct VariantReport {
    /// The variant.
    pub variant: Variant,
    /// Per-rendering outcomes, or the error that stopped the variant before
    /// any rendering was attempted.
    pub outcome: Result<Vec<RenderingReport>, C25519Error>,
}

/// Outcome of one rendering.
#[derive(Debug)]
pub struct RenderingReport {
    /// Which rendering.
    pub rendering: Rendering,
    /// Written file.
    pub outcome: Result<PathBuf, C25519Error>,
}

impl BuildReport {
    /// Whether every profile, variant and rendering succeeded.
    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }

    /// Every failure with a label naming where it happened.
    pub fn failures(&self) -> Vec<(String, &C25519Error)> {
        let mut failures = Vec::new();
        for profile in &self.profiles {
            let artifacts = match &profile.outcome {
                Ok(artifacts) => artifacts,
                Err(e) => {
                    failures.push((profile.profile.clone(), e));
                    continue;
                }
            };
            for variant in &artifacts.variants {
                match &variant.outcome {
                    Err(e) => failures.push((variant.variant.to_string(), e)),
                    Ok(renderings) => {
                        for r in renderings {
                            if let Err(e) = &r.outcome {
                                failures.push((format!("{} ({})", variant.variant, r.rendering), e));
                            }
                        }
                    }
                }
            }
        }
        failures
    }

    /// Every file written by the run.
    pub fn artifacts(&self) -> Vec<&Path> {
        let mut paths = Vec::new();
        for profile in &self.profiles {
            let Ok(artifacts) = &profile.outcome else {
                continue;
            };
            paths.push(artifacts.module.as_path());
            paths.push(artifacts.manifest.as_path());
            for variant in &artifacts.variants {
                if let Ok(renderings) = &variant.outcome {
                    paths.extend(
                        renderings
                            .iter()
                            .filter_map(|r| r.outcome.as_ref().ok())
                            .map(PathBuf::as_path),
                    );
                }
            }
        }
        paths.extend(self.declaration.as_deref());
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c25519_core::variant::{ModuleFormat, Profile};

    fn rendering(rendering: Rendering, ok: bool) -> RenderingReport {
        RenderingReport {
            rendering,
            outcome: if ok {
                Ok(PathBuf::from(format!("dist/{}.js", rendering)))
            } else {
                Err(C25519Error::Compact {
                    variant: "speed/esm".to_string(),
                    cause: "exit status 1".to_string(),
                })
            },
        }
    }

    fn report(compacted_ok: bool) -> BuildReport {
        BuildReport {
            profiles: vec![
                ProfileReport {
                    profile: "speed".to_string(),
                    outcome: Ok(ProfileArtifacts {
                        module: PathBuf::from("dist/c25519.speed.wasm"),
                        manifest: PathBuf::from("dist/c25519.speed.tokens.json"),
                        variants: vec![VariantReport {
                            variant: Variant::new(Profile::speed(), ModuleFormat::Esm),
                            outcome: Ok(vec![
                                rendering(Rendering::Readable, true),
                                rendering(Rendering::Compacted, compacted_ok),
                            ]),
                        }],
                    }),
                },
                ProfileReport {
                    profile: "size".to_string(),
                    outcome: Err(C25519Error::Compile {
                        profile: "size".to_string(),
                        cause: "exit status 1".to_string(),
                    }),
                },
            ],
            declaration: None,
        }
    }

    #[test]
    fn failures_are_labelled() {
        let failed = report(false);
        let labels: Vec<String> = failed.failures().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["speed/esm (compacted)", "size"]);
        assert!(!failed.is_success());
    }

    #[test]
    fn artifacts_skip_failures() {
        let failed = report(false);
        assert_eq!(failed.artifacts().len(), 3);
        assert_eq!(report(true).artifacts().len(), 4);
    }
}
