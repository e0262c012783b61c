//! Edits of shell startup files (`~/.profile`, `~/.bashrc`) made by images
//! that export environment variables.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use tokio::fs;

/// Append `line` to `file` unless an identical line is already present.
/// The file is created if missing.
/// # Errors
/// Fails on I/O errors
pub async fn append_line(file: &Path, line: &str) -> anyhow::Result<()> {
    let content = read_or_empty(file).await?;
    if content.lines().any(|existing| existing == line) {
        return Ok(());
    }

    let mut content = content;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(line);
    content.push('\n');

    fs::write(file, content)
        .await
        .with_context(|| format!("writing {}", file.display()))
}

/// Drop every line of `file` containing `marker`. A missing file is left alone.
/// # Errors
/// Fails on I/O errors
pub async fn remove_lines(file: &Path, marker: &str) -> anyhow::Result<()> {
    if !fs::try_exists(file).await? {
        return Ok(());
    }
    let content = read_or_empty(file).await?;
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !line.contains(marker))
        .collect();

    let mut updated = kept.join("\n");
    if !updated.is_empty() {
        updated.push('\n');
    }
    if updated == content {
        return Ok(());
    }

    fs::write(file, updated)
        .await
        .with_context(|| format!("writing {}", file.display()))
}

async fn read_or_empty(file: &Path) -> anyhow::Result<String> {
    match fs::read_to_string(file).await {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("reading {}", file.display())),
    }
}
