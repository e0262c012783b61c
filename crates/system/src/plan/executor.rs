use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use super::pipeline::Pipeline;
use super::{Plan, Step};
use crate::download::Downloader;
use crate::profile;

#[async_trait]
pub trait Executor: Send + Sync {
    async fn run_step(&self, step: &Step) -> Result<()>;

    async fn run_plan(&self, plan: &Plan) -> Result<()> {
        for step in &plan.steps {
            self.run_step(step).await?;
        }
        Ok(())
    }
}

pub struct DryRunExecutor;

#[async_trait]
impl Executor for DryRunExecutor {
    async fn run_step(&self, step: &Step) -> Result<()> {
        println!("DRY-RUN: {}", step.format());
        Ok(())
    }
}

pub struct ShellExecutor {
    pub shell: String,
    downloader: Downloader,
}

impl ShellExecutor {
    /// # Errors
    /// Fails if the HTTP client can't be built
    pub fn new() -> Result<Self> {
        Ok(Self {
            shell: "/bin/sh".into(),
            downloader: Downloader::new()?,
        })
    }

    async fn run_pipeline(&self, pipeline: &Pipeline) -> Result<()> {
        let cmdline = pipeline.format_shell();
        debug!("Running {cmdline}");

        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(&cmdline)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("Fail to start {}", self.shell))?;

        if !status.success() {
            anyhow::bail!(
                "pipeline failed (exit={}): {}",
                status.code().unwrap_or(-1),
                cmdline
            );
        }

        Ok(())
    }
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn run_step(&self, step: &Step) -> Result<()> {
        match step {
            Step::Run(pipeline) => self.run_pipeline(pipeline).await,
            Step::Fetch { request, path } => {
                info!("Downloading {}...", request.url());
                self.downloader.fetch(request, path).await?;
                Ok(())
            }
            Step::AppendLine { file, line } => profile::append_line(file, line).await,
            Step::RemoveLines { file, marker } => profile::remove_lines(file, marker).await,
            Step::WriteFile { path, contents } => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                tokio::fs::write(path, contents)
                    .await
                    .with_context(|| format!("writing {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::pipeline::CommandSpec;

    #[tokio::test]
    async fn runs_file_steps() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = dir.path().join("Code/User/settings.json");
        let profile = dir.path().join(".profile");
        let plan = Plan::new()
            .step(Step::WriteFile {
                path: settings.clone(),
                contents: "{}\n".into(),
            })
            .step(Step::AppendLine {
                file: profile.clone(),
                line: "export A=1".into(),
            });

        ShellExecutor::new()?.run_plan(&plan).await?;

        assert_eq!(tokio::fs::read_to_string(&settings).await?, "{}\n");
        assert_eq!(tokio::fs::read_to_string(&profile).await?, "export A=1\n");
        Ok(())
    }

    #[tokio::test]
    async fn reports_failed_pipeline() -> Result<()> {
        let plan = Plan::new()
            .step(CommandSpec::new("true"))
            .step(CommandSpec::new("false"));

        let err = ShellExecutor::new()?.run_plan(&plan).await.unwrap_err();
        assert_eq!(err.to_string(), "pipeline failed (exit=1): false");
        Ok(())
    }

    #[tokio::test]
    async fn dry_run_has_no_effect() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("never");
        let plan = Plan::new().step(Step::WriteFile {
            path: path.clone(),
            contents: "x".into(),
        });

        DryRunExecutor.run_plan(&plan).await?;

        assert!(!path.exists());
        Ok(())
    }
}
