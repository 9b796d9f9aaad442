//! Output text rendering
//!
//! Computed `output_text` attributes are rendered from a fixed set of
//! templates embedded in the binary. Rendering is a convenience: callers
//! leave the attribute unset when it fails.

use serde::Serialize;
use std::sync::OnceLock;
use tera::{Context, Tera};

/// Embedded templates, keyed by the name handlers render them under
const TEMPLATE_FILES: &[(&str, &str)] = &[
    (
        "networkProtectionDS",
        include_str!("templates/network_protection.tera"),
    ),
    (
        "apiRequestConstraintsDS",
        include_str!("templates/api_request_constraints.tera"),
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template not registered: {0}")]
    UnknownTemplate(String),

    #[error("rendering template: {0}")]
    Template(#[from] tera::Error),
}

/// A pre-registered template set
pub struct OutputTemplates {
    tera: Tera,
}

impl OutputTemplates {
    pub fn from_sources(sources: &[(&str, &str)]) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(sources.iter().copied())?;
        Ok(Self { tera })
    }

    /// Shared instance built from the embedded templates
    pub fn builtin() -> &'static OutputTemplates {
        static TEMPLATES: OnceLock<OutputTemplates> = OnceLock::new();
        TEMPLATES.get_or_init(|| {
            Self::from_sources(TEMPLATE_FILES)
                .unwrap_or_else(|e| panic!("Failed to parse embedded output templates: {}", e))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

/// Render template `name` against `data`
pub fn render<T: Serialize>(
    templates: &OutputTemplates,
    name: &str,
    data: &T,
) -> Result<String, RenderError> {
    if !templates.tera.get_template_names().any(|n| n == name) {
        return Err(RenderError::UnknownTemplate(name.to_string()));
    }
    let context = Context::from_serialize(data)?;
    Ok(templates.tera.render(name, &context)?)
}
