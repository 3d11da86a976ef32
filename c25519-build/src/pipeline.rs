//! The multi-variant build.
//!
//! For each profile, concurrently:
//!
//! 1. harvest tokens from the token sources and the template, with the
//!    payload token seeded as unresolved;
//! 2. compile the native sources with the compiler view of the mapping;
//! 3. resolve the payload token to the module bytes, base-64 without padding,
//!    and write the token manifest;
//! 4. for each loading convention, wrap and substitute the template, then
//!    write the readable and compacted renderings.
//!
//! A failure in steps 1 to 3 aborts that profile. A failure in step 4 is
//! logged and recorded but leaves sibling variants alone.

use crate::config::BuildConfig;
use crate::instrument_profile;
use crate::instrument_variant;
use crate::render;
use crate::report::{
    BuildReport, ProfileArtifacts, ProfileReport, RenderingReport, VariantReport,
};
use crate::toolchain::{CompactRequest, Compactor, CompileRequest, Compiler, Emcc, Terser};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use c25519_core::error::{C25519Error, Result};
use c25519_core::tokens::{TokenCollector, TokenManifest, TokenValue, ensure_resolved, substitute};
use c25519_core::variant::{Profile, Rendering, Variant};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Drives one build run.
///
/// Cheap to clone; clones share configuration and tools.
#[derive(Clone)]
pub struct BuildPipeline {
    config: Arc<BuildConfig>,
    compiler: Arc<dyn Compiler>,
    compactor: Arc<dyn Compactor>,
}

impl BuildPipeline {
    /// Create a pipeline with explicit tools.
    pub fn new(
        config: BuildConfig,
        compiler: Arc<dyn Compiler>,
        compactor: Arc<dyn Compactor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            compiler,
            compactor,
        }
    }

    /// Create a pipeline that runs the configured `emcc` and `terser`.
    pub fn from_config(config: BuildConfig) -> Self {
        let compiler = Arc::new(Emcc::new(config.compiler.clone()));
        let compactor = Arc::new(Terser::new(config.compactor.clone()));
        Self::new(config, compiler, compactor)
    }

    /// The configuration in use.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Harvest tokens the way a profile build does, without compiling.
    pub async fn harvest(&self) -> Result<TokenCollector> {
        let template = read_text(&self.config.template).await?;
        self.harvest_with(&template).await
    }

    async fn harvest_with(&self, template: &str) -> Result<TokenCollector> {
        let mut collector = TokenCollector::new(&self.config.token_pattern)?
            .seed(&self.config.payload_token, TokenValue::Unresolved);

        for path in &self.config.token_sources {
            match tokio::fs::read_to_string(path).await {
                Ok(text) => {
                    let added = collector.collect(&text);
                    tracing::debug!(path = %path.display(), added, "scanned token source");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable token source");
                }
            }
        }
        collector.collect(template);

        Ok(collector)
    }

    /// Run the build.
    ///
    /// Every profile runs to completion. Returns the first profile-level
    /// error if any profile aborted; otherwise the report, which may still
    /// contain variant failures.
    pub async fn run(&self) -> Result<BuildReport> {
        self.config.validate()?;
        recreate_dir(&self.config.out_dir).await?;
        let template: Arc<str> = read_text(&self.config.template).await?.into();

        tracing::info!(
            profiles = self.config.profiles.len(),
            formats = self.config.formats.len(),
            out_dir = %self.config.out_dir.display(),
            "build started"
        );

        let mut tasks: JoinSet<ProfileReport> = JoinSet::new();
        for profile in self.config.profiles.iter().cloned() {
            let pipeline = self.clone();
            let template = Arc::clone(&template);
            let span = instrument_profile!(profile.name);
            tasks.spawn(async move { pipeline.build_profile(profile, template).await }.instrument(span));
        }

        let mut reports = Vec::with_capacity(self.config.profiles.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!(error = %e, "profile task did not complete"),
            }
        }

        // Keep configuration order; a profile whose task died gets a failure entry.
        let mut profiles = Vec::with_capacity(reports.len());
        for profile in &self.config.profiles {
            match reports.iter().position(|r| r.profile == profile.name) {
                Some(i) => profiles.push(reports.swap_remove(i)),
                None => profiles.push(ProfileReport {
                    profile: profile.name.clone(),
                    outcome: Err(C25519Error::Compile {
                        profile: profile.name.clone(),
                        cause: "build task aborted".to_string(),
                    }),
                }),
            }
        }

        let declaration = self.copy_declaration().await?;
        let mut report = BuildReport {
            profiles,
            declaration,
        };

        tracing::info!(
            artifacts = report.artifacts().len(),
            failures = report.failures().len(),
            "build finished"
        );

        if let Some(i) = report.profiles.iter().position(|p| p.outcome.is_err()) {
            if let Err(e) = report.profiles.swap_remove(i).outcome {
                return Err(e);
            }
        }
        Ok(report)
    }

    async fn build_profile(self, profile: Profile, template: Arc<str>) -> ProfileReport {
        let outcome = self.profile_artifacts(&profile, template).await;
        if let Err(e) = &outcome {
            tracing::error!(code = e.code(), error = %e, "profile aborted");
        }
        ProfileReport {
            profile: profile.name,
            outcome,
        }
    }

    async fn profile_artifacts(
        &self,
        profile: &Profile,
        template: Arc<str>,
    ) -> Result<ProfileArtifacts> {
        let mut collector = self.harvest_with(&template).await?;
        tracing::info!(tokens = collector.mapping().len(), "tokens harvested");

        let module = self.config.module_path(profile);
        let request = CompileRequest {
            profile,
            sources: &self.config.sources,
            defines: collector.mapping().compiler_defines(),
            output: &module,
        };
        let diagnostics = self.compiler.compile(request).await?;
        tracing::debug!(compiler = self.compiler.name(), %diagnostics, "compiler output");

        let bytes = tokio::fs::read(&module)
            .await
            .map_err(|e| C25519Error::io(&module, e))?;
        tracing::info!(module = %module.display(), bytes = bytes.len(), "module compiled");
        collector.mapping_mut().set(
            self.config.payload_token.clone(),
            TokenValue::Text(STANDARD_NO_PAD.encode(&bytes)),
        );

        let manifest = self.config.manifest_path(profile);
        TokenManifest::from_mapping(
            profile.name.clone(),
            collector.mapping(),
            &[self.config.payload_token.as_str()],
        )
        .write(&manifest)?;

        let collector = Arc::new(collector);
        let variants = Variant::matrix(std::slice::from_ref(profile), &self.config.formats);

        let mut tasks: JoinSet<(usize, VariantReport)> = JoinSet::new();
        for (i, variant) in variants.iter().cloned().enumerate() {
            let pipeline = self.clone();
            let collector = Arc::clone(&collector);
            let template = Arc::clone(&template);
            tasks.spawn(
                async move { (i, pipeline.render_variant(variant, &collector, &template).await) }
                    .in_current_span(),
            );
        }

        let mut done: Vec<Option<VariantReport>> = variants.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((i, report)) => done[i] = Some(report),
                Err(e) => tracing::error!(error = %e, "variant task did not complete"),
            }
        }

        let variants = variants
            .into_iter()
            .zip(done)
            .map(|(variant, report)| {
                report.unwrap_or_else(|| VariantReport {
                    outcome: Err(C25519Error::Render {
                        variant: variant.to_string(),
                        cause: "render task aborted".to_string(),
                    }),
                    variant,
                })
            })
            .collect();

        Ok(ProfileArtifacts {
            module,
            manifest,
            variants,
        })
    }

    async fn render_variant(
        &self,
        variant: Variant,
        collector: &TokenCollector,
        template: &str,
    ) -> VariantReport {
        let source = match self.prepare_source(&variant, collector, template).await {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(%variant, code = e.code(), error = %e, "variant failed");
                return VariantReport {
                    variant,
                    outcome: Err(e),
                };
            }
        };

        let mut renderings = Vec::with_capacity(Rendering::ALL.len());
        for rendering in Rendering::ALL {
            let outcome = self
                .write_rendering(&variant, rendering, &source, collector)
                .instrument(instrument_variant!(variant, rendering))
                .await;
            if let Err(e) = &outcome {
                tracing::error!(%variant, %rendering, code = e.code(), error = %e, "rendering failed");
            }
            renderings.push(RenderingReport { rendering, outcome });
        }

        VariantReport {
            variant,
            outcome: Ok(renderings),
        }
    }

    async fn prepare_source(
        &self,
        variant: &Variant,
        collector: &TokenCollector,
        template: &str,
    ) -> Result<String> {
        let wrapper = read_text(&self.config.wrapper_path(variant.format)).await?;
        let wrapped = render::wrap(&wrapper, template, variant)?;
        substitute(
            collector.pattern(),
            &wrapped,
            collector.mapping(),
            &variant.to_string(),
        )
    }

    async fn write_rendering(
        &self,
        variant: &Variant,
        rendering: Rendering,
        source: &str,
        collector: &TokenCollector,
    ) -> Result<PathBuf> {
        let output = self
            .compactor
            .compact(CompactRequest {
                variant,
                rendering,
                source,
            })
            .await?;
        ensure_resolved(
            collector.mapping(),
            &output,
            &format!("{} ({})", variant, rendering),
        )?;

        let path = self.config.out_dir.join(variant.file_name(rendering));
        tokio::fs::write(&path, &output)
            .await
            .map_err(|e| C25519Error::io(&path, e))?;
        tracing::info!(path = %path.display(), bytes = output.len(), "rendering written");
        Ok(path)
    }

    async fn copy_declaration(&self) -> Result<Option<PathBuf>> {
        let Some(declaration) = &self.config.declaration else {
            return Ok(None);
        };

        if !tokio::fs::try_exists(&declaration.from).await.unwrap_or(false) {
            tracing::warn!(path = %declaration.from.display(), "type declaration not found, skipping");
            return Ok(None);
        }

        if let Some(parent) = declaration.to.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| C25519Error::io(parent, e))?;
        }
        tokio::fs::copy(&declaration.from, &declaration.to)
            .await
            .map_err(|e| C25519Error::io(&declaration.to, e))?;
        tracing::debug!(path = %declaration.to.display(), "type declaration copied");
        Ok(Some(declaration.to.clone()))
    }
}

impl std::fmt::Debug for BuildPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildPipeline")
            .field("config", &self.config)
            .field("compiler", &self.compiler.name())
            .field("compactor", &self.compactor.name())
            .finish()
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| C25519Error::io(path, e))
}

async fn recreate_dir(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(C25519Error::io(dir, e)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| C25519Error::io(dir, e))
}
