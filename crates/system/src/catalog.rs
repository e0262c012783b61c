use std::fmt;

use crate::image::{Category, ImageId};

/// One titled list of the catalog, items are shown as given
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogGroup {
    pub title: String,
    pub items: Vec<String>,
}

impl CatalogGroup {
    pub fn new<T, I, S>(title: T, items: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CatalogGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}:", self.title)?;
        for item in &self.items {
            writeln!(f, "  - {item}")?;
        }
        Ok(())
    }
}

/// Every image of the repository by category: server, desktop, JetBrains IDEs
#[must_use]
pub fn image_catalog() -> Vec<CatalogGroup> {
    [Category::Server, Category::Desktop, Category::JetBrains]
        .into_iter()
        .map(|category| {
            CatalogGroup::new(
                category.title(),
                ImageId::all()
                    .filter(|id| id.category() == category)
                    .map(|id| id.title()),
            )
        })
        .collect()
}

#[must_use]
pub fn render_text(groups: &[CatalogGroup]) -> String {
    groups
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
