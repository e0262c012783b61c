pub mod executor;
pub mod pipeline;

use std::path::PathBuf;

use crate::download::DownloadRequest;
use pipeline::{CommandSpec, Pipeline};

/// Single side effect of an image operation
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Run(Pipeline),
    Fetch {
        request: DownloadRequest,
        path: PathBuf,
    },
    AppendLine {
        file: PathBuf,
        line: String,
    },
    RemoveLines {
        file: PathBuf,
        marker: String,
    },
    WriteFile {
        path: PathBuf,
        contents: String,
    },
}

impl Step {
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            Step::Run(pipeline) => pipeline.format_shell(),
            Step::Fetch { request, path } => format!(
                "fetch {url} -> {path} ({integrity})",
                url = request.url(),
                path = path.display(),
                integrity = request.integrity(),
            ),
            Step::AppendLine { file, line } => {
                format!("append '{line}' to {}", file.display())
            }
            Step::RemoveLines { file, marker } => {
                format!("remove lines containing '{marker}' from {}", file.display())
            }
            Step::WriteFile { path, contents } => {
                format!("write {} bytes to {}", contents.len(), path.display())
            }
        }
    }
}

impl From<Pipeline> for Step {
    fn from(pipeline: Pipeline) -> Self {
        Step::Run(pipeline)
    }
}

impl From<CommandSpec> for Step {
    fn from(cmd: CommandSpec) -> Self {
        Step::Run(cmd.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step<S: Into<Step>>(mut self, step: S) -> Self {
        self.steps.push(step.into());
        self
    }

    #[must_use]
    pub fn steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Step>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    /// Concatenate, `self` runs first
    #[must_use]
    pub fn then(mut self, other: Plan) -> Self {
        self.steps.extend(other.steps);
        self
    }
}

#[cfg(test)]
impl Plan {
    pub fn into_script(self) -> Vec<String> {
        self.steps.iter().map(Step::format).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::Integrity;

    #[test]
    fn formats_steps() -> anyhow::Result<()> {
        let plan = Plan::new()
            .step(Step::Fetch {
                request: DownloadRequest::new("https://example.com/a.deb", Integrity::None)?,
                path: "/tmp/work/a.deb".into(),
            })
            .step(CommandSpec::sudo("dpkg").arg("--install").arg("/tmp/work/a.deb"))
            .step(Step::AppendLine {
                file: "/home/user/.profile".into(),
                line: "export A=1".into(),
            })
            .step(Step::RemoveLines {
                file: "/home/user/.bashrc".into(),
                marker: "A=".into(),
            })
            .step(Step::WriteFile {
                path: "/home/user/a.json".into(),
                contents: "{}".into(),
            });

        assert_eq!(
            plan.into_script(),
            &[
                "fetch https://example.com/a.deb -> /tmp/work/a.deb (none)",
                "sudo dpkg --install /tmp/work/a.deb",
                "append 'export A=1' to /home/user/.profile",
                "remove lines containing 'A=' from /home/user/.bashrc",
                "write 2 bytes to /home/user/a.json",
            ]
        );
        Ok(())
    }

    #[test]
    fn concatenates_in_order() {
        let first = Plan::new().step(CommandSpec::new("a"));
        let second = Plan::new().step(CommandSpec::new("b"));

        assert_eq!(first.then(second).into_script(), &["a", "b"]);
        assert_eq!(Plan::new().then(Plan::new()), Plan::new());
    }
}
