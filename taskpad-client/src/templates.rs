//! View templates
//!
//! A [`TemplateRegistry`] maps template ids to markup. The three built-in
//! views ship with the crate; [`TemplateRegistry::load_dir`] reads overrides
//! from a directory where each `<id>.html` file defines template `<id>`.

use crate::error::{ClientError, ClientResult};
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

/// Id of the login view
pub const LOGIN_TEMPLATE: &str = "login-template";

/// Id of the registration view
pub const REGISTER_TEMPLATE: &str = "register-template";

/// Id of the task list view
pub const TASKS_TEMPLATE: &str = "tasks-template";

/// Template id → markup
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, String>,
}

impl TemplateRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in login, register and tasks views
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.insert(LOGIN_TEMPLATE, include_str!("../templates/login-template.html"));
        registry.insert(REGISTER_TEMPLATE, include_str!("../templates/register-template.html"));
        registry.insert(TASKS_TEMPLATE, include_str!("../templates/tasks-template.html"));
        registry
    }

    /// Adds every `*.html` file in `dir`, keyed by file stem
    ///
    /// Existing ids are overwritten. Other files and subdirectories are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Template` if the directory or a template file
    /// cannot be read
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> ClientResult<usize> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| ClientError::Template {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry
                .map_err(|source| ClientError::Template {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let markup = fs::read_to_string(&path).map_err(|source| ClientError::Template {
                path: path.clone(),
                source,
            })?;
            debug!(template = id, "Loaded template");
            self.templates.insert(id.to_string(), markup);
            loaded += 1;
        }

        Ok(loaded)
    }

    pub fn insert(&mut self, id: impl Into<String>, markup: impl Into<String>) {
        self.templates.insert(id.into(), markup.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.templates.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.templates.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_standard_templates() {
        let registry = TemplateRegistry::standard();
        assert_eq!(registry.len(), 3);
        assert!(registry.get(LOGIN_TEMPLATE).unwrap().contains("login-form"));
        assert!(registry.get(TASKS_TEMPLATE).unwrap().contains("task-list"));
    }

    #[test]
    fn test_load_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.html"), "<h1>About</h1>").unwrap();
        fs::write(dir.path().join(format!("{}.html", LOGIN_TEMPLATE)), "<form>custom</form>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.html")).unwrap();

        let mut registry = TemplateRegistry::standard();
        let loaded = registry.load_dir(dir.path()).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(registry.get("about"), Some("<h1>About</h1>"));
        assert_eq!(registry.get(LOGIN_TEMPLATE), Some("<form>custom</form>"));
        assert!(registry.get("notes").is_none());
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = TempDir::new().unwrap();
        let result = TemplateRegistry::new().load_dir(dir.path().join("missing"));
        assert!(matches!(result, Err(ClientError::Template { .. })));
    }
}
