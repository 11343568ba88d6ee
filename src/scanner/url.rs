//! View URL resolution for markers

/// Default template: `{location}/{path}#L{line}`
pub const DEFAULT_VIEW_URL_TEMPLATE: &str = "{location}/{path}#L{line}";

/// Builds a browsable URL for a marker
pub trait ViewUrlResolver: Send + Sync {
    fn resolve(&self, location: &str, file_path: &str, line: usize) -> String;
}

/// Placeholder-substitution resolver
///
/// Supported placeholders: `{location}` (without trailing `/`), `{path}` and
/// `{line}`.
#[derive(Debug, Clone)]
pub struct TemplateUrlResolver {
    template: String,
}

impl TemplateUrlResolver {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for TemplateUrlResolver {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_URL_TEMPLATE)
    }
}

impl ViewUrlResolver for TemplateUrlResolver {
    fn resolve(&self, location: &str, file_path: &str, line: usize) -> String {
        self.template
            .replace("{location}", location.trim_end_matches('/'))
            .replace("{path}", file_path.trim_start_matches('/'))
            .replace("{line}", &line.to_string())
    }
}
