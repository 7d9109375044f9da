//! The generated artifact store.

use ai_builder_model::FileTree;

/// Holds the most recently generated project and which file is selected
/// for viewing.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct ArtifactStore {
    tree: FileTree,
    selected: Option<String>,
}

impl ArtifactStore {
    /// Returns the current file tree.
    #[inline]
    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    /// Returns the listed file paths in display order.
    #[inline]
    pub fn paths(&self) -> &[String] {
        self.tree.paths()
    }

    /// Returns the path of the selected file.
    #[inline]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Returns the content of `path`.
    ///
    /// Viewing is a plain lookup: a path without content yields an empty
    /// string, never an error.
    #[inline]
    pub fn view(&self, path: &str) -> &str {
        self.tree.content(path).unwrap_or_default()
    }

    /// Returns the content of the selected file, or an empty string if no
    /// file is selected.
    #[inline]
    pub fn selected_content(&self) -> &str {
        self.selected.as_deref().map_or("", |path| self.view(path))
    }

    /// Swaps in a new tree and selects its first file.
    pub(crate) fn replace(&mut self, tree: FileTree) {
        self.selected = tree.paths().first().cloned();
        self.tree = tree;
    }

    /// Selects `path` for viewing. Does nothing if `path` is not listed.
    pub(crate) fn select(&mut self, path: &str) -> bool {
        if !self.tree.contains(path) {
            return false;
        }
        self.selected = Some(path.to_owned());
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn tree(paths: &[&str]) -> FileTree {
        FileTree::new(
            paths.iter().map(|p| p.to_string()),
            paths
                .iter()
                .map(|p| (p.to_string(), format!("// {p}")))
                .collect(),
        )
    }

    #[test]
    fn test_replace_selects_first_file() {
        let mut store = ArtifactStore::default();
        assert_eq!(store.selected(), None);
        assert_eq!(store.selected_content(), "");

        store.replace(tree(&["index.html", "app.js"]));
        assert_eq!(store.selected(), Some("index.html"));
        assert_eq!(store.selected_content(), "// index.html");

        store.replace(tree(&[]));
        assert_eq!(store.selected(), None);
        assert!(store.paths().is_empty());
    }

    #[test]
    fn test_select() {
        let mut store = ArtifactStore::default();
        store.replace(tree(&["index.html", "app.js"]));

        assert!(store.select("app.js"));
        assert_eq!(store.selected(), Some("app.js"));
        assert!(!store.select("style.css"));
        assert_eq!(store.selected(), Some("app.js"));
    }

    #[test]
    fn test_view_missing_content() {
        let mut store = ArtifactStore::default();
        store.replace(FileTree::new(
            ["README.md".to_owned()],
            HashMap::new(),
        ));
        assert_eq!(store.selected(), Some("README.md"));
        assert_eq!(store.view("README.md"), "");
        assert_eq!(store.view("nowhere"), "");
    }
}
