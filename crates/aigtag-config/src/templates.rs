//! Prompt template table.
//!
//! The table is fixed at startup and exposes read accessors only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::ConfigError;

/// File name of the system prompt used by the image analysis endpoint.
pub const VISION_TEMPLATE_FILE: &str = "vl.prompt";

/// Built-in templates: (id, file name, label). Order is the listing order.
const BUILTIN_TEMPLATES: &[(&str, &str, &str)] = &[
    ("zhouyi", "zhouyi.prompt", "周易解读"),
    ("taluo", "taluo.prompt", "塔罗解读"),
    ("ouzhou", "ouzhou.prompt", "北欧女巫"),
];

/// A named system prompt stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptTemplate {
    /// Unique key used by clients (`prompt_id`).
    pub id: String,
    /// Path of the template file.
    pub file_path: PathBuf,
    /// Human-readable label shown in option lists.
    pub label: String,
}

/// Immutable, ordered table of prompt templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: Vec<PromptTemplate>,
    index: HashMap<String, usize>,
}

impl TemplateStore {
    /// Builds the built-in table, resolving file names against `prompt_dir`.
    pub fn builtin(prompt_dir: impl AsRef<Path>) -> Self {
        let dir = prompt_dir.as_ref();
        let entries = BUILTIN_TEMPLATES.iter().map(|(id, file, label)| PromptTemplate {
            id: (*id).to_string(),
            file_path: dir.join(file),
            label: (*label).to_string(),
        });
        Self::from_entries(entries).expect("built-in template ids are unique")
    }

    /// Builds a table from explicit entries, keeping their order.
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = PromptTemplate>,
    {
        let mut store = Self::default();
        for template in entries {
            if store.index.contains_key(&template.id) {
                return Err(ConfigError::DuplicateTemplate(template.id));
            }
            store.index.insert(template.id.clone(), store.templates.len());
            store.templates.push(template);
        }
        Ok(store)
    }

    /// Gets a template by id.
    pub fn lookup(&self, id: &str) -> Option<&PromptTemplate> {
        self.index.get(id).map(|&i| &self.templates[i])
    }

    /// Returns all templates in definition order.
    pub fn list_all(&self) -> impl Iterator<Item = &PromptTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns templates whose file is not present on disk.
    pub fn missing_files(&self) -> Vec<&PromptTemplate> {
        self.templates
            .iter()
            .filter(|t| !t.file_path.is_file())
            .collect()
    }
}
