use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<CommandSpec>,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// `sudo <program>`
    pub fn sudo<S: Into<String>>(program: S) -> Self {
        Self::new("sudo").arg(program)
    }

    pub fn arg_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.args.push(path.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl Pipeline {
    pub fn new(first: CommandSpec) -> Self {
        Self {
            stages: vec![first],
        }
    }

    /// Run `script` with `bash -c`, for steps that need shell state such as
    /// sourcing `sdkman-init.sh` or `nvm.sh` first
    pub fn bash<S: Into<String>>(script: S) -> Self {
        Self::new(CommandSpec::new("bash").arg("-c").arg(script))
    }

    pub fn pipe(mut self, next: CommandSpec) -> Self {
        self.stages.push(next);
        self
    }

    pub fn format_shell(&self) -> String {
        self.stages
            .iter()
            .map(|cmd| {
                let mut s = cmd.program.clone();
                for arg in &cmd.args {
                    s.push(' ');
                    s.push_str(&shell_escape(arg));
                }
                s
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl From<CommandSpec> for Pipeline {
    fn from(cmd: CommandSpec) -> Self {
        Pipeline::new(cmd)
    }
}

// Arguments come from image definitions and info files, never from the command line
fn shell_escape(s: &str) -> String {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+@,".contains(c))
    {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_shell_format() {
        let p = Pipeline::new(
            CommandSpec::new("curl")
                .args(["--proto", "=https", "-sSf"])
                .arg("https://sh.rustup.rs"),
        )
        .pipe(CommandSpec::new("sh").args(["-s", "--", "-y"]));

        assert_eq!(
            p.format_shell(),
            "curl --proto =https -sSf https://sh.rustup.rs | sh -s -- -y"
        );
    }

    #[test]
    fn quotes_unsafe_args() {
        let p = Pipeline::bash("source \"$HOME/.sdkman/bin/sdkman-init.sh\" && sdk version");
        assert_eq!(
            p.format_shell(),
            "bash -c 'source \"$HOME/.sdkman/bin/sdkman-init.sh\" && sdk version'"
        );

        let p: Pipeline = CommandSpec::new("echo").arg("it's").arg("").into();
        assert_eq!(p.format_shell(), "echo 'it'\"'\"'s' ''");
    }
}
