use anyhow::Context;
use reqwest::Url;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq)]
pub struct GpgKey {
    url: Url,
    fingerprint: String,
}

impl GpgKey {
    #[must_use]
    pub fn new(url: Url, fingerprint: String) -> Self {
        Self { url, fingerprint }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Import the public key into the user keyring and confirm it carries the
    /// expected fingerprint
    /// # Errors
    /// Fails if curl/gpg fail or the fingerprint is not present afterwards
    pub async fn install(&self) -> anyhow::Result<()> {
        let import = format!(
            "curl --proto '=https' --tlsv1.2 -sSf '{}' | gpg --import -",
            self.url
        );
        let status = Command::new("bash")
            .arg("-c")
            .arg(&import)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .status()
            .await
            .context("Fail to execute gpg --import")?;
        if !status.success() {
            anyhow::bail!("importing GPG key from {} failed", self.url);
        }
        debug!("Imported GPG key from {}", self.url);

        let output = Command::new("gpg")
            .arg("--fingerprint")
            .output()
            .await
            .context("Fail to execute gpg --fingerprint")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("gpg --fingerprint failed: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !contains_fingerprint(&stdout, &self.fingerprint) {
            anyhow::bail!(
                "Key fingerprint {} does not exist in GPG",
                self.fingerprint
            );
        }

        info!("GPG key {} installed", self.fingerprint);
        Ok(())
    }
}

/// Fingerprints are printed in groups of four (`59C8 6188 ...`), compare them
/// ignoring every whitespace
pub fn contains_fingerprint(gpg_output: &str, fingerprint: &str) -> bool {
    let strip = |s: &str| -> String { s.chars().filter(|c| !c.is_whitespace()).collect() };
    let fingerprint = strip(fingerprint);

    !fingerprint.is_empty() && strip(gpg_output).contains(&fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GPG_OUTPUT: &str = r"/home/user/.gnupg/pubring.kbx
----------------------------
pub   rsa4096 2019-08-13 [SC]
      59C8 6188 E22A BB19 BD55  4047 7B04 A1B8 DD79 B481
uid           [ unknown] Zoom Video Communications, Inc. Linux Package Signing Key <linux-package-signing-key@zoom.us>
sub   rsa4096 2019-08-13 [E]
";

    #[test]
    fn finds_fingerprint_ignoring_spaces() {
        assert!(contains_fingerprint(
            GPG_OUTPUT,
            "59C8 6188 E22A BB19 BD55 4047 7B04 A1B8 DD79 B481"
        ));
        assert!(contains_fingerprint(
            GPG_OUTPUT,
            "59C86188E22ABB19BD5540477B04A1B8DD79B481"
        ));
    }

    #[test]
    fn rejects_wrong_fingerprint() {
        // First character is 0 where the real key has 5
        assert!(!contains_fingerprint(
            GPG_OUTPUT,
            "09C8 6188 E22A BB19 BD55 4047 7B04 A1B8 DD79 B481"
        ));
        assert!(!contains_fingerprint(GPG_OUTPUT, "   "));
    }
}
