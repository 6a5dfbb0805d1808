//! Document collaborator owning the attribute store.

use std::collections::HashMap;

/// Attribute store contract the preprocessing pass writes into.
///
/// The pass is the sole writer for the duration of [`process`] and applies
/// writes strictly in line order, so later lines observe attributes defined
/// by earlier ones.
///
/// [`process`]: crate::Preprocessor::process
pub trait Document {
    /// Look up an attribute value.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Set an attribute value.
    fn set_attribute(&mut self, name: &str, value: String);

    /// Remove an attribute.
    fn delete_attribute(&mut self, name: &str);

    /// Check whether an attribute is defined.
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Hook fired immediately after any write or delete of the `backend`
    /// attribute, so backend-derived attributes can be recomputed.
    fn backend_updated(&mut self) {}
}

/// In-memory [`Document`] over a plain attribute map.
///
/// Its [`backend_updated`](Document::backend_updated) hook maintains a
/// derived `backend-<value>` flag attribute, which conditional directives
/// use to test the active backend.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InMemoryDocument {
    attributes: HashMap<String, String>,
}

impl InMemoryDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with initial attributes.
    #[must_use]
    pub fn with_attributes(attributes: HashMap<String, String>) -> Self {
        Self { attributes }
    }

    /// The full attribute map.
    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

impl Document for InMemoryDocument {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        self.attributes.insert(name.to_owned(), value);
    }

    fn delete_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    fn backend_updated(&mut self) {
        self.attributes.retain(|name, _| !name.starts_with("backend-"));
        if let Some(backend) = self.attributes.get("backend") {
            let flag = format!("backend-{backend}");
            self.attributes.insert(flag, String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_delete() {
        let mut doc = InMemoryDocument::new();
        assert!(!doc.has_attribute("author"));
        doc.set_attribute("author", "J. Smith".to_owned());
        assert_eq!(doc.attribute("author"), Some("J. Smith"));
        assert!(doc.has_attribute("author"));
        doc.delete_attribute("author");
        assert!(!doc.has_attribute("author"));
    }

    #[test]
    fn test_backend_flag_maintained() {
        let mut doc = InMemoryDocument::new();
        doc.set_attribute("backend", "html".to_owned());
        doc.backend_updated();
        assert!(doc.has_attribute("backend-html"));

        doc.set_attribute("backend", "docbook".to_owned());
        doc.backend_updated();
        assert!(doc.has_attribute("backend-docbook"));
        assert!(!doc.has_attribute("backend-html"));
    }

    #[test]
    fn test_backend_flag_removed_on_delete() {
        let mut doc = InMemoryDocument::new();
        doc.set_attribute("backend", "html".to_owned());
        doc.backend_updated();
        doc.delete_attribute("backend");
        doc.backend_updated();
        assert!(!doc.has_attribute("backend-html"));
    }
}
