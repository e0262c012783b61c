// SPDX-FileCopyrightText: 2024-2026 MathSwe Ops contributors
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use fs2::FileExt;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::batch::{BatchReport, Operation};
use crate::catalog::{image_catalog, render_text};
use crate::download::Downloader;
use crate::image::info::ImageInfoLoader;
use crate::image::repository::{Repository, RepositoryError};
use crate::image::{ImageContext, ImageId};
use crate::os::{Os, detect_os};
use crate::plan::Plan;
use crate::plan::executor::{DryRunExecutor, Executor, ShellExecutor};
use crate::site::system_page;

#[derive(Debug, Parser)]
#[command(
    name = "system",
    about = "Install, uninstall and configure development software images",
    version
)]
pub struct Cli {
    /// Directory with `<id>.json` info files and `config/<id>.json` configs
    #[arg(long, env = "SYSTEM_IMAGE_DIR", default_value = "image", global = true)]
    pub image_dir: PathBuf,

    /// Do not execute commands, only print what would be done
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install images
    Install(InstallArgs),

    /// Uninstall images
    Uninstall(ImageArgs),

    /// Uninstall then install images
    Reinstall(InstallArgs),

    /// Apply the configuration of installed images
    Config(ImageArgs),

    /// List available images
    Catalog {
        /// Print the documentation page instead of plain text
        #[arg(long)]
        html: bool,
    },
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Image ids, e.g. `rust go jetbrains-toolbox`
    #[arg(required = true)]
    pub images: Vec<String>,
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub images: ImageArgs,

    /// Configure images that have a configuration once installed
    #[arg(long)]
    pub config: bool,
}

impl Cli {
    /// # Errors
    /// Fails if the environment can't be set up or any image failed
    pub async fn handle(self) -> Result<()> {
        let Cli {
            image_dir,
            dry_run,
            command,
        } = self;

        let (operation, args, config) = match command {
            Command::Catalog { html } => {
                if html {
                    println!("{}", system_page());
                } else {
                    print!("{}", render_text(&image_catalog()));
                }
                return Ok(());
            }
            Command::Install(InstallArgs { images, config }) => {
                (Operation::Install, images, config)
            }
            Command::Uninstall(images) => (Operation::Uninstall, images, false),
            Command::Reinstall(InstallArgs { images, config }) => {
                (Operation::Reinstall, images, config)
            }
            Command::Config(images) => (Operation::Config, images, false),
        };

        let _lock = OperationLock::acquire(lock_path())?;
        let session = Session::new(image_dir, dry_run).await?;
        let report = session.run_batch(operation, &args.images, config).await;

        let summary = report.summary();
        if report.is_success() {
            println!("{}", style(summary).green());
        } else {
            println!("{}", style(summary).red());
        }
        Ok(report.into_result()?)
    }
}

/// Everything an image operation needs, built once per invocation
struct Session {
    repo: Repository,
    os: Os,
    home: PathBuf,
    // Parent of the per-image download directories
    work_root: PathBuf,
    downloader: Downloader,
    executor: Box<dyn Executor>,
}

impl Session {
    async fn new(image_dir: PathBuf, dry_run: bool) -> Result<Self> {
        let os = detect_os().await?;
        let home = dirs::home_dir().context("Unable to find the home directory")?;

        let executor: Box<dyn Executor> = if dry_run {
            Box::new(DryRunExecutor)
        } else {
            Box::new(ShellExecutor::new()?)
        };

        Ok(Self {
            repo: Repository::new(ImageInfoLoader::new(image_dir), os),
            os,
            home,
            work_root: env::temp_dir(),
            downloader: Downloader::new()?,
            executor,
        })
    }

    async fn run_batch(&self, operation: Operation, images: &[String], config: bool) -> BatchReport {
        let mut report = BatchReport::new(operation);

        for raw in images {
            let result = self.run_image(operation, raw, config).await;
            report.record(raw, &result);
        }
        report
    }

    /// Per-image messages are printed here, the error only feeds the report
    async fn run_image(&self, operation: Operation, raw: &str, config: bool) -> Result<()> {
        let id = match self.repo.parse_id(raw) {
            Ok(id) => id,
            Err(err) => {
                let err: anyhow::Error = err.into();
                eprintln!("{}", style(Operation::load_failed_msg(raw, &err)).red());
                return Err(err);
            }
        };

        match self.process_image(operation, &id, config).await {
            Ok(()) => {
                println!("{}", style(operation.succeeded_msg(&id)).green());
                Ok(())
            }
            Err(err) => {
                eprintln!("{}", style(operation.failed_msg(&id, &err)).red());
                Err(err)
            }
        }
    }

    async fn process_image(&self, operation: Operation, id: &ImageId, config: bool) -> Result<()> {
        // Downloads of this image go away with the directory
        let (ctx, _work_dir) = self.image_context()?;
        let plan = self.plan_image(operation, id, config, &ctx).await?;
        self.executor.run_plan(&plan).await
    }

    /// Context with a fresh download directory, removed when the `TempDir` drops
    fn image_context(&self) -> Result<(ImageContext, TempDir)> {
        let work_dir = tempfile::Builder::new()
            .prefix("system-")
            .tempdir_in(&self.work_root)
            .context("creating working directory")?;
        debug!("Working directory {}", work_dir.path().display());

        let ctx = ImageContext {
            os: self.os,
            home: self.home.clone(),
            work_dir: work_dir.path().to_path_buf(),
        };
        Ok((ctx, work_dir))
    }

    async fn plan_image(
        &self,
        operation: Operation,
        id: &ImageId,
        config: bool,
        ctx: &ImageContext,
    ) -> Result<Plan> {
        if operation == Operation::Config {
            println!("{}", Operation::started_config_msg(id));
            return self.repo.load_config(id).await?.config(ctx);
        }

        let mut ops = self.repo.load(id).await?;
        println!("{}", operation.started_msg(ops.image()));

        let plan = match operation {
            Operation::Uninstall => ops.uninstall(ctx)?,
            Operation::Install | Operation::Reinstall => {
                ops.resolve(&self.downloader).await?;
                if operation == Operation::Install {
                    ops.install(ctx)?
                } else {
                    ops.reinstall(ctx)?
                }
            }
            Operation::Config => Plan::new(),
        };

        if config {
            return Ok(plan.then(self.config_plan(id, ctx).await?));
        }
        Ok(plan)
    }

    async fn config_plan(&self, id: &ImageId, ctx: &ImageContext) -> Result<Plan> {
        match self.repo.load_config(id).await {
            Ok(config) => config.config(ctx),
            Err(err) => match err.downcast_ref::<RepositoryError>() {
                Some(RepositoryError::NoConfig(_)) => {
                    info!("Image {id} has no configuration, skipping --config");
                    Ok(Plan::new())
                }
                _ => Err(err),
            },
        }
    }
}

/// `$XDG_RUNTIME_DIR/system.lock`, or the temp dir when it's unset
fn lock_path() -> PathBuf {
    env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
        .join("system.lock")
}

/// Exclusive lock held while images are processed, one `system` at a time
struct OperationLock {
    _file: File,
    path: PathBuf,
}

impl OperationLock {
    fn acquire<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("opening lock file {}", path.display()))?;

        file.try_lock_exclusive()
            .context("another system instance is already running")?;

        Ok(Self { _file: file, path })
    }
}

impl Drop for OperationLock {
    fn drop(&mut self) {
        // Lock is released with the file
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::image::test::test_repository;
    use crate::os::UBUNTU_X64;
    use crate::plan::Step;

    /// Records every step; fetches create their target file the way a real
    /// download does, refusing to overwrite
    #[derive(Clone, Default)]
    struct RecordingExecutor {
        steps: Arc<Mutex<Vec<Step>>>,
    }

    impl RecordingExecutor {
        fn script(&self) -> Vec<String> {
            self.steps.lock().unwrap().iter().map(Step::format).collect()
        }

        fn fetched_paths(&self) -> Vec<PathBuf> {
            self.steps
                .lock()
                .unwrap()
                .iter()
                .filter_map(|step| match step {
                    Step::Fetch { path, .. } => Some(path.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl Executor for RecordingExecutor {
        async fn run_step(&self, step: &Step) -> Result<()> {
            if let Step::Fetch { path, .. } = step {
                let mut file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(path)
                    .with_context(|| format!("creating {}", path.display()))?;
                file.write_all(b"artifact")?;
            }
            self.steps.lock().unwrap().push(step.clone());
            Ok(())
        }
    }

    fn session(executor: &RecordingExecutor, work_root: &Path) -> Result<Session> {
        Ok(Session {
            repo: test_repository(),
            os: UBUNTU_X64,
            home: PathBuf::from("/home/user"),
            work_root: work_root.to_path_buf(),
            downloader: Downloader::new()?,
            executor: Box::new(executor.clone()),
        })
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn repeated_image_downloads_into_fresh_dirs() -> Result<()> {
        let work_root = tempfile::tempdir()?;
        let executor = RecordingExecutor::default();
        let session = session(&executor, work_root.path())?;

        let report = session
            .run_batch(Operation::Install, &ids(&["go", "go"]), false)
            .await;

        assert_eq!(report.ok, 2);
        let fetched = executor.fetched_paths();
        assert_eq!(fetched.len(), 2);
        assert_ne!(fetched[0].parent(), fetched[1].parent());
        assert!(fetched.iter().all(|path| path.starts_with(work_root.path())));
        // Work dirs are gone once their image is done
        assert_eq!(std::fs::read_dir(work_root.path())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_fails_without_stopping_batch() -> Result<()> {
        let work_root = tempfile::tempdir()?;
        let executor = RecordingExecutor::default();
        let session = session(&executor, work_root.path())?;

        let report = session
            .run_batch(Operation::Uninstall, &ids(&["go", "vs-code", "nvm"]), false)
            .await;

        assert_eq!(report.ok, 2);
        assert_eq!(report.failed, &["vs-code"]);
        assert_eq!(
            executor.script(),
            &[
                "sudo rm -rf /usr/local/go",
                "remove lines containing '/usr/local/go/bin' from /home/user/.profile",
                "rm -rf /home/user/.nvm",
                "remove lines containing 'NVM_DIR' from /home/user/.bashrc",
            ]
        );
        assert_eq!(
            report.into_result().unwrap_err().to_string(),
            "2 images successfully uninstalled; 1 images failed to uninstall."
        );
        Ok(())
    }

    #[tokio::test]
    async fn install_with_config_skips_images_without_config() -> Result<()> {
        let work_root = tempfile::tempdir()?;
        let executor = RecordingExecutor::default();
        let session = session(&executor, work_root.path())?;

        let report = session
            .run_batch(Operation::Install, &ids(&["nvm", "rust"]), true)
            .await;

        assert!(report.is_success());
        assert_eq!(
            executor.script(),
            &[
                "curl -o- https://raw.githubusercontent.com/nvm-sh/nvm/v0.39.7/install.sh | bash",
                "curl --proto =https --tlsv1.2 -sSf https://sh.rustup.rs/ | sh -s -- -y",
                "/home/user/.cargo/bin/rustup default stable",
                "/home/user/.cargo/bin/rustup component add clippy rustfmt rust-src",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn config_of_image_without_config_fails() -> Result<()> {
        let work_root = tempfile::tempdir()?;
        let executor = RecordingExecutor::default();
        let session = session(&executor, work_root.path())?;

        let report = session
            .run_batch(Operation::Config, &ids(&["go", "miniconda"]), false)
            .await;

        assert_eq!(report.ok, 1);
        assert_eq!(report.failed, &["go"]);
        assert_eq!(
            executor.script(),
            &["/home/user/miniconda3/bin/conda config --set auto_activate_base false"]
        );
        assert!(report.into_result().is_err());
        Ok(())
    }

    #[test]
    fn parses_install_with_config() {
        let cli = Cli::try_parse_from(["system", "--dry-run", "install", "--config", "rust", "vscode"])
            .unwrap();

        assert!(cli.dry_run);
        assert_eq!(cli.image_dir, PathBuf::from("image"));
        match cli.command {
            Command::Install(InstallArgs { images, config }) => {
                assert!(config);
                assert_eq!(images.images, &["rust", "vscode"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn requires_at_least_one_image() {
        assert!(Cli::try_parse_from(["system", "uninstall"]).is_err());
        assert!(Cli::try_parse_from(["system", "config"]).is_err());
    }

    #[test]
    fn config_flag_only_on_install() {
        assert!(Cli::try_parse_from(["system", "uninstall", "--config", "go"]).is_err());
        assert!(Cli::try_parse_from(["system", "reinstall", "--config", "go"]).is_ok());
    }

    #[test]
    fn parses_catalog() {
        let cli = Cli::try_parse_from(["system", "catalog", "--html"]).unwrap();

        assert!(matches!(cli.command, Command::Catalog { html: true }));
    }

    #[test]
    fn second_lock_fails() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("system.lock");
        let _first = OperationLock::acquire(&path)?;
        let second = OperationLock::acquire(&path);

        assert_eq!(
            second.err().map(|e| e.to_string()),
            Some("another system instance is already running".to_string())
        );
        Ok(())
    }

    #[test]
    fn lock_file_removed_on_drop() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("system.lock");
        drop(OperationLock::acquire(&path)?);

        assert!(!path.exists());
        Ok(())
    }
}
