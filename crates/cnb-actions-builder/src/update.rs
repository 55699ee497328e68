//! Stamping the latest image and buildpack versions into builder documents

use crate::error::{BuilderError, Result};
use crate::model::{BuilderFile, ImageConfig, Lifecycle, Order, OrderFile, Stack};
use cnb_actions_image::{ImageReference, TagLister, VersionResolver};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Inputs of `builder generate`
#[derive(Debug, Clone)]
pub struct GenerateInputs {
    /// Stack ID written to `[stack].id`
    pub stack: String,
    /// Build image without a tag
    pub build_image: String,
    /// Run image without a tag
    pub run_image: String,
    /// Run image mirrors without tags
    pub run_image_mirrors: Vec<String>,
    /// Stack tag; build images are tagged `<semver>-<stack tag>`
    pub stack_image_tag: String,
    pub order: OrderFile,
}

/// Resolves versions for builder documents.
///
/// Buildpacks are looked up as `<registry_server>/<buildpack id>`. All
/// lookups run one after another; output order comes from explicit sorting.
pub struct BuilderUpdater<'a, L> {
    resolver: &'a VersionResolver<L>,
    registry_server: String,
    lifecycle_image: ImageReference,
}

impl<'a, L: TagLister> BuilderUpdater<'a, L> {
    pub fn new(
        resolver: &'a VersionResolver<L>,
        registry_server: impl Into<String>,
        lifecycle_image: ImageReference,
    ) -> Self {
        Self {
            resolver,
            registry_server: registry_server.into(),
            lifecycle_image,
        }
    }

    /// Render a complete builder document from stack inputs and an order file
    pub async fn generate(&self, inputs: GenerateInputs) -> Result<BuilderFile> {
        info!("Generating builder.toml for stack {}", inputs.stack);

        let stack = self.stack_from_inputs(&inputs).await?;
        let (order, buildpacks) = self.update_buildpacks_and_order(inputs.order.order).await?;
        let lifecycle = self.latest_lifecycle().await?;

        Ok(BuilderFile {
            description: inputs.order.description.unwrap_or_default(),
            buildpacks,
            lifecycle,
            order,
            stack,
        })
    }

    /// Refresh build image, lifecycle and buildpack versions of an existing document
    pub async fn update(&self, mut builder: BuilderFile) -> Result<BuilderFile> {
        info!("Updating builder.toml for stack {}", builder.stack.id);

        builder.stack.build_image =
            latest_build_image(self.resolver, &builder.stack.build_image, &builder.stack.run_image)
                .await?;

        validate_run_image_mirrors(&builder.stack.run_image_mirrors)?;

        builder.lifecycle = self.latest_lifecycle().await?;

        let (order, buildpacks) = self
            .update_buildpacks_and_order(std::mem::take(&mut builder.order))
            .await?;
        builder.order = order;
        builder.buildpacks = buildpacks;

        Ok(builder)
    }

    /// Build the `[stack]` table for `generate`
    pub async fn stack_from_inputs(&self, inputs: &GenerateInputs) -> Result<Stack> {
        let build_image = ImageReference::parse_untagged(&inputs.build_image)
            .map_err(|e| BuilderError::invalid_image("build image", &inputs.build_image, e))?;

        let build_image = self
            .resolver
            .latest_tagged(&build_image, &format!("-{}", inputs.stack_image_tag))
            .await?;

        let run_image = ImageReference::parse_untagged(&inputs.run_image)
            .map_err(|e| BuilderError::invalid_image("run image", &inputs.run_image, e))?;

        let run_image_mirrors = inputs
            .run_image_mirrors
            .iter()
            .map(|mirror| {
                ImageReference::parse_untagged(mirror)
                    .map(|m| m.with_tag(&inputs.stack_image_tag).name())
                    .map_err(|e| BuilderError::invalid_image("run-image mirror", mirror, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Stack {
            id: inputs.stack.clone(),
            build_image: build_image.name(),
            run_image: run_image.with_tag(&inputs.stack_image_tag).name(),
            run_image_mirrors,
        })
    }

    /// Resolve `[lifecycle]` from the lifecycle image's plain semver tags
    pub async fn latest_lifecycle(&self) -> Result<Lifecycle> {
        let version = self.resolver.latest_version(&self.lifecycle_image, "").await?;
        debug!("Latest lifecycle: {}", version);
        Ok(Lifecycle { version })
    }

    /// Stamp each order group entry with its latest version and derive `[[buildpacks]]`.
    ///
    /// Buildpacks appearing in several groups are listed once; the list is
    /// sorted by image for deterministic output.
    pub async fn update_buildpacks_and_order(
        &self,
        mut orders: Vec<Order>,
    ) -> Result<(Vec<Order>, Vec<ImageConfig>)> {
        let mut resolved: BTreeMap<String, String> = BTreeMap::new();

        for order in &mut orders {
            for buildpack in &mut order.group {
                let reference = ImageReference::new(&self.registry_server, &buildpack.id);
                let version = self.resolver.latest_version(&reference, "").await?;

                debug!("Buildpack {} -> {}", buildpack.id, version);
                buildpack.version = version.clone();
                resolved.insert(buildpack.id.clone(), version);
            }
        }

        let mut buildpacks: Vec<ImageConfig> = resolved
            .into_iter()
            .map(|(id, version)| ImageConfig {
                image: format!("{}/{}:{}", self.registry_server, id, version),
                version,
            })
            .collect();

        buildpacks.sort_by(|a, b| a.image.cmp(&b.image));

        Ok((orders, buildpacks))
    }
}

/// Resolve the newest build image matching the run image's stack tag.
///
/// Build images are tagged `<semver>-<stack tag>` (e.g. `0.0.94-full-cnb`)
/// where the stack tag is the run image's tag. Existing documents may use
/// Docker Hub short names, so both references are parsed normalized.
pub async fn latest_build_image<L: TagLister>(
    resolver: &VersionResolver<L>,
    build_image: &str,
    run_image: &str,
) -> Result<String> {
    let run_image = ImageReference::parse_normalized(run_image)
        .map_err(|e| BuilderError::invalid_image("run image reference", run_image, e))?;

    let build_image = ImageReference::parse_normalized(build_image)
        .map_err(|e| BuilderError::invalid_image("build image reference", build_image, e))?;

    let tagged = resolver
        .latest_tagged(&build_image, &format!("-{}", run_image.tag))
        .await?;

    Ok(tagged.name())
}

/// Check that every mirror is a well-formed reference
pub fn validate_run_image_mirrors(mirrors: &[String]) -> Result<()> {
    for mirror in mirrors {
        ImageReference::parse_normalized(mirror)
            .map_err(|e| BuilderError::invalid_image("run-image mirror", mirror, e))?;
    }
    Ok(())
}
