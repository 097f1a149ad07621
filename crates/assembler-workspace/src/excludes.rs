// excludes.rs - Names skipped while snapshotting the project.
//
// Pattern forms, matched against a single path component:
// - `dirname/` matches a directory with this name at any depth
// - `*.ext`    matches any entry whose name ends with `.ext`
// - `name`     matches an entry with exactly this name

/// Copy-exclude patterns for [`crate::WorkingCopy::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludePatterns {
    patterns: Vec<String>,
}

impl ExcludePatterns {
    /// No excludes: the whole project is copied.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from configured patterns. Blank entries and `#` comments are dropped.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty() && !p.starts_with('#'))
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check a single entry. `is_dir` gates the `dirname/` form.
    pub fn should_exclude(&self, name: &str, is_dir: bool) -> bool {
        self.patterns.iter().any(|pattern| {
            if let Some(dir_name) = pattern.strip_suffix('/') {
                is_dir && name == dir_name
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                name.ends_with(suffix)
            } else {
                name == pattern
            }
        })
    }
}
