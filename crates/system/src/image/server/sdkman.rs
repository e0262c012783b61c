use std::path::PathBuf;

use reqwest::Url;
use serde::Deserialize;

use super::{curl_into, remove_dir, with_init_script};
use crate::image::{Image, ImageContext, ImageOps, ServerImageId};
use crate::os::Os;
use crate::package::{Package, Software};
use crate::plan::pipeline::{CommandSpec, Pipeline};
use crate::plan::{Plan, Step};
use crate::version::SemVer;

const SDKMAN_URL: &str = "https://get.sdkman.io";

fn sdkman_init(ctx: &ImageContext) -> PathBuf {
    ctx.home_path(".sdkman/bin/sdkman-init.sh")
}

/// `sdk install` asks whether to make the candidate default, answer yes
fn sdk_install(ctx: &ImageContext, candidate: &str, version: &str) -> Pipeline {
    let script = format!(
        "source {} && sdk install {candidate} {version}",
        sdkman_init(ctx).display()
    );
    Pipeline::new(CommandSpec::new("yes")).pipe(CommandSpec::new("bash").arg("-c").arg(script))
}

fn sdk_uninstall(ctx: &ImageContext, candidate: &str, version: &str) -> Pipeline {
    with_init_script(
        &sdkman_init(ctx),
        &format!("sdk uninstall {candidate} {version} --force"),
    )
}

pub struct SdkmanImage(Image);

impl SdkmanImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(os: Os) -> anyhow::Result<Self> {
        let id = ServerImageId::Sdkman;

        Ok(SdkmanImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("SDKMAN!", "SDKMAN!", "latest"),
                Url::parse("https://sdkman.io/install")?,
                None,
            ),
        )))
    }
}

impl ImageOps for SdkmanImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, _ctx: &ImageContext) -> anyhow::Result<Plan> {
        Ok(Plan::new().step(curl_into(SDKMAN_URL, &["-s"], CommandSpec::new("bash"))))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let mut plan = Plan::new().step(remove_dir(&ctx.home_path(".sdkman")));
        for rc in [".bashrc", ".zshrc"] {
            for marker in ["SDKMAN", ".sdkman"] {
                plan = plan.step(Step::RemoveLines {
                    file: ctx.home_path(rc),
                    marker: marker.to_string(),
                });
            }
        }
        Ok(plan)
    }
}

/// Java distributions are selected by sdkman identifier, `21.0.4-tem`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct JavaInfo {
    pub version: String,
}

pub struct JavaImage(Image);

impl JavaImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(os: Os, JavaInfo { version }: JavaInfo) -> anyhow::Result<Self> {
        let id = ServerImageId::Java;

        Ok(JavaImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("Oracle Corporation", "Java", &version),
                Url::parse("https://sdkman.io/jdks")?,
                None,
            ),
        )))
    }
}

impl ImageOps for JavaImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let version = &self.0.package.software.version;
        Ok(Plan::new().step(sdk_install(ctx, "java", version)))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let version = &self.0.package.software.version;
        Ok(Plan::new().step(sdk_uninstall(ctx, "java", version)))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GradleInfo {
    pub version: SemVer,
}

pub struct GradleImage(Image);

impl GradleImage {
    /// # Errors
    /// Fails only on malformed URLs
    pub fn new(os: Os, GradleInfo { version }: GradleInfo) -> anyhow::Result<Self> {
        let id = ServerImageId::Gradle;

        Ok(GradleImage(Image::new(
            id,
            Package::new(
                &id.to_string(),
                os,
                Software::new("Gradle Inc.", "Gradle", &version.to_string()),
                Url::parse("https://gradle.org/install")?,
                None,
            ),
        )))
    }
}

impl ImageOps for GradleImage {
    fn image(&self) -> &Image {
        &self.0
    }

    fn install(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let version = &self.0.package.software.version;
        Ok(Plan::new().step(sdk_install(ctx, "gradle", version)))
    }

    fn uninstall(&self, ctx: &ImageContext) -> anyhow::Result<Plan> {
        let version = &self.0.package.software.version;
        Ok(Plan::new().step(sdk_uninstall(ctx, "gradle", version)))
    }
}
