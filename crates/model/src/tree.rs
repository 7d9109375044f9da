use std::collections::{HashMap, HashSet};

/// A generated project: an ordered list of file paths and their contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileTree {
    paths: Vec<String>,
    contents: HashMap<String, String>,
}

impl FileTree {
    /// Creates a file tree.
    ///
    /// Duplicate paths are dropped, keeping the first occurrence. Paths
    /// without an entry in `contents` are kept; viewing them yields empty
    /// content.
    pub fn new<I>(paths: I, contents: HashMap<String, String>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .filter(|path| seen.insert(path.clone()))
            .collect();
        Self { paths, contents }
    }

    /// Returns the file paths in display order.
    #[inline]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Returns the content of `path`, if the backend provided one.
    #[inline]
    pub fn content(&self, path: &str) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    /// Returns `true` if `path` is listed in this tree.
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Returns the number of listed files.
    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no file is listed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
