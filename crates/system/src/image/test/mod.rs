mod helpers;

pub use data::{GO_SHA256, MINICONDA_SHA256, TOOLBOX_SHA256, VSCODE_SHA256, ZOOM_FINGERPRINT};
pub use helpers::{test_context, test_loader, test_repository};
