use std::collections::BTreeMap;

/// Variables for `{{PLACEHOLDER}}` substitution in upstream templates.
///
/// ## Built-in Variables
///
/// | Variable | Example |
/// |----------|---------|
/// | `PROJECT_NAME` | "my-mod" |
/// | `PROJECT_PATH` | "D:/work/my-mod" |
/// | `CURRENT_DATE` | "2025-11-20" |
/// | `VERSION` | "16.1.0" |
/// | `PROJECT_STATUS` | "生产就绪 (Production Ready)" |
///
/// Unknown placeholders are left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    variables: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new(
        project_name: impl Into<String>,
        project_path: impl Into<String>,
        current_date: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let mut variables = BTreeMap::new();
        variables.insert("PROJECT_NAME".to_string(), project_name.into());
        // Backslashes break Markdown links.
        variables.insert(
            "PROJECT_PATH".to_string(),
            project_path.into().replace('\\', "/"),
        );
        variables.insert("CURRENT_DATE".to_string(), current_date.into());
        variables.insert("VERSION".to_string(), version.into());
        variables.insert(
            "PROJECT_STATUS".to_string(),
            "生产就绪 (Production Ready)".to_string(),
        );
        Self { variables }
    }

    /// Add or override a variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `{{KEY}}` with its value.
    pub fn render(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.variables {
            let placeholder = format!("{{{{{key}}}}}");
            result = result.replace(&placeholder, value);
        }
        result
    }
}
