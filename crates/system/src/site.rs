//! Static HTML fragments of the `system` documentation page: command and
//! endpoint snippets plus the image grid. Rendering only formats strings.

use std::fmt::Write;

use crate::catalog::{CatalogGroup, image_catalog};

#[derive(Clone, Debug, PartialEq)]
pub enum Snippet {
    /// Shell command with a caption, `system install { image_1, ... }`
    Command { command: String, caption: String },
    InlineCode(String),
    /// HTTP endpoint, `GET badge/project/:project`
    Cloud {
        method: String,
        endpoint: String,
        caption: String,
    },
}

impl Snippet {
    pub fn command<S: Into<String>, C: Into<String>>(command: S, caption: C) -> Self {
        Snippet::Command {
            command: command.into(),
            caption: caption.into(),
        }
    }

    pub fn inline_code<S: Into<String>>(code: S) -> Self {
        Snippet::InlineCode(code.into())
    }

    pub fn cloud<M, E, C>(method: M, endpoint: E, caption: C) -> Self
    where
        M: Into<String>,
        E: Into<String>,
        C: Into<String>,
    {
        Snippet::Cloud {
            method: method.into(),
            endpoint: endpoint.into(),
            caption: caption.into(),
        }
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Snippet::Command { command, caption } => format!(
                r#"<figure class="snippet command"><span class="icon icon-terminal" aria-hidden="true"></span><code>{}</code><figcaption>{}</figcaption></figure>"#,
                escape_html(command),
                escape_html(caption),
            ),
            Snippet::InlineCode(code) => {
                format!(r#"<code class="inline-code">{}</code>"#, escape_html(code))
            }
            Snippet::Cloud {
                method,
                endpoint,
                caption,
            } => format!(
                r#"<figure class="snippet cloud"><span class="icon icon-cloud" aria-hidden="true"></span><code><span class="method">{}</span> {}</code><figcaption>{}</figcaption></figure>"#,
                escape_html(method),
                escape_html(endpoint),
                escape_html(caption),
            ),
        }
    }
}

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// One section per group, one box per item, in the given order
#[must_use]
pub fn catalog_grid(groups: &[CatalogGroup]) -> String {
    let mut html = String::from(r#"<div class="image-grid">"#);
    for group in groups {
        // Writing to a String can't fail
        let _ = write!(
            html,
            r#"<section class="image-group"><h3>{}</h3><ul>"#,
            escape_html(&group.title)
        );
        for item in &group.items {
            let _ = write!(html, r#"<li class="image-box">{}</li>"#, escape_html(item));
        }
        html.push_str("</ul></section>");
    }
    html.push_str("</div>");
    html
}

/// Usage snippets shown on the page, in order
#[must_use]
pub fn usage_snippets() -> Vec<Snippet> {
    vec![
        Snippet::command(
            "system install { image_1, image_2, ..., image_n}",
            "Install images",
        ),
        Snippet::command(
            "system uninstall { image_1, image_2, ..., image_n}",
            "Uninstall images",
        ),
        Snippet::command(
            "system reinstall { image_1, image_2, ..., image_n}",
            "Reinstall images",
        ),
        Snippet::command(
            "system config { image_1, image_2, ..., image_n}",
            "Apply image configurations",
        ),
        Snippet::command(
            "system install --config { image_1, image_2, ..., image_n}",
            "Install and configure images",
        ),
    ]
}

/// Badge endpoints of the hosted API, each answering with an SVG image
#[must_use]
pub fn badge_snippets() -> Vec<Snippet> {
    vec![
        Snippet::cloud(
            "GET",
            "badge/version/:gitPlatform/:user/:repo[?path]",
            "Version badge of a repository",
        ),
        Snippet::cloud("GET", "badge/project/:project[?mvp]", "Project badge"),
    ]
}

#[must_use]
pub fn system_page() -> String {
    let mut html = String::from(r#"<article class="system">"#);
    html.push_str("<h1>System</h1>");
    html.push_str(
        "<h2>Automated, integrity-checked installation of development software</h2>",
    );
    let _ = write!(
        html,
        "<p>Images are identified by hyphenated lowercase ids such as {} and read their version from {} files.</p>",
        Snippet::inline_code("jetbrains-toolbox").to_html(),
        Snippet::inline_code("image/<id>.json").to_html(),
    );
    for snippet in usage_snippets() {
        html.push_str(&snippet.to_html());
    }
    html.push_str("<h2>Images</h2>");
    html.push_str(&catalog_grid(&image_catalog()));
    html.push_str("<h2>Badges</h2>");
    for snippet in badge_snippets() {
        html.push_str(&snippet.to_html());
    }
    html.push_str("</article>");
    html
}
