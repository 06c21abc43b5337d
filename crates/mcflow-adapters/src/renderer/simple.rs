//! Simple variable substitution renderer.

use std::sync::LazyLock;

use mcflow_core::{
    application::ports::TemplateRenderer, domain::RenderContext, error::McflowResult,
};
use regex::Regex;
use tracing::{instrument, warn};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z0-9_]+)\}\}").expect("Invalid placeholder regex"));

/// Simple renderer using basic `{{KEY}}` substitution.
///
/// Unknown placeholders are left in place and logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    /// Create a new simple renderer.
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all)]
    fn render(&self, template: &str, context: &RenderContext) -> McflowResult<String> {
        let rendered = context.render(template);

        let leftover: Vec<&str> = PLACEHOLDER
            .captures_iter(&rendered)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if !leftover.is_empty() {
            warn!(placeholders = ?leftover, "Template left unresolved placeholders");
        }

        Ok(rendered)
    }
}
