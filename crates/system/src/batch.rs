use strum::{Display, EnumString};
use thiserror::Error;

use crate::image::{Image, ImageId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Install,
    Uninstall,
    Reinstall,
    Config,
}

impl Operation {
    fn capitalized(self) -> &'static str {
        match self {
            Operation::Install => "Install",
            Operation::Uninstall => "Uninstall",
            Operation::Reinstall => "Reinstall",
            Operation::Config => "Config",
        }
    }

    fn progressive(self) -> &'static str {
        match self {
            Operation::Install => "Installing",
            Operation::Uninstall => "Uninstalling",
            Operation::Reinstall => "Reinstalling",
            Operation::Config => "Configuring",
        }
    }

    fn past(self) -> &'static str {
        match self {
            Operation::Install => "installed",
            Operation::Uninstall => "uninstalled",
            Operation::Reinstall => "reinstalled",
            Operation::Config => "configured",
        }
    }

    /// `Installing Image: go, Package: go 1.22.5...`
    #[must_use]
    pub fn started_msg(self, image: &Image) -> String {
        format!("{} {image}...", self.progressive())
    }

    /// Config runs without loading the image itself
    #[must_use]
    pub fn started_config_msg(id: &ImageId) -> String {
        format!("{} {id}...", Operation::Config.progressive())
    }

    #[must_use]
    pub fn succeeded_msg(self, id: &ImageId) -> String {
        format!("✅ {} image {id}.", self.capitalized())
    }

    #[must_use]
    pub fn failed_msg(self, id: &ImageId, cause: &anyhow::Error) -> String {
        format!("❌ Fail to {self} {id}.\n Cause: {cause:#}")
    }

    #[must_use]
    pub fn load_failed_msg(raw_id: &str, cause: &anyhow::Error) -> String {
        format!("❌ Fail to load image {raw_id}.\n Cause: {cause:#}")
    }
}

/// Returned when at least one image of a batch failed
#[derive(Error, Debug, PartialEq)]
#[error("{ok} images successfully {past}; {failed} images failed to {operation}.")]
pub struct BatchError {
    pub operation: Operation,
    pub past: &'static str,
    pub ok: usize,
    pub failed: usize,
}

/// Outcome of running one operation over several images, in input order
#[derive(Clone, Debug, PartialEq)]
pub struct BatchReport {
    pub operation: Operation,
    pub ok: usize,
    pub failed: Vec<String>,
}

impl BatchReport {
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            ok: 0,
            failed: Vec::new(),
        }
    }

    pub fn record<T, E>(&mut self, raw_id: &str, result: &Result<T, E>) {
        match result {
            Ok(_) => self.ok += 1,
            Err(_) => self.failed.push(raw_id.to_string()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// `✅ Install 2 images.` or `❌ Fail to install 1 image: ["go"]`
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!(
                "✅ {} {} image{}.",
                self.operation.capitalized(),
                self.ok,
                plural(self.ok)
            )
        } else {
            format!(
                "❌ Fail to {} {} image{}: {:?}",
                self.operation,
                self.failed.len(),
                plural(self.failed.len()),
                self.failed
            )
        }
    }

    /// # Errors
    /// Fails when any image failed
    pub fn into_result(self) -> Result<(), BatchError> {
        if self.is_success() {
            return Ok(());
        }
        Err(BatchError {
            operation: self.operation,
            past: self.operation.past(),
            ok: self.ok,
            failed: self.failed.len(),
        })
    }
}

fn plural(n: usize) -> &'static str {
    if n > 1 { "s" } else { "" }
}
