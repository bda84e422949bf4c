//! Catalog file-name search.

use crate::consts::{DEFAULT_SEARCH_DELIMITERS, DEFAULT_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how catalog files are looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Base for relative names, also the base for dependencies. Empty means
    /// the current directory for lookups and the catalog's own directory
    /// for its dependencies.
    pub directory: PathBuf,
    /// Characters at which a missing file name is truncated and retried; `None` is `"_."`.
    pub search_delimiters: Option<String>,
    /// Appended to candidate names; `None` is `".qm"`.
    pub suffix: Option<String>,
}

impl LoadOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into(), ..Self::default() }
    }

    pub fn with_search_delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.search_delimiters = Some(delimiters.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn suffix_or_default(&self) -> &str {
        self.suffix.as_deref().unwrap_or(DEFAULT_SUFFIX)
    }

    pub fn delimiters_or_default(&self) -> &str {
        self.search_delimiters.as_deref().unwrap_or(DEFAULT_SEARCH_DELIMITERS)
    }
}

fn is_readable_file(path: &Path) -> bool {
    let ok = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    tracing::debug!(path = %path.display(), readable = ok, "testing file");
    ok
}

/// `name + suffix`, then `name`, then `name` cut at its rightmost delimiter, and so on.
///
/// For `foo.fr_ca` in `/opt/foolib` that is `foo.fr_ca.qm`, `foo.fr_ca`,
/// `foo.fr.qm`, `foo.fr`, `foo.qm`, `foo`.
pub fn find_by_truncation(filename: &str, options: &LoadOptions) -> Option<PathBuf> {
    let suffix = options.suffix_or_default();
    let delims = options.delimiters_or_default();
    let mut fname = filename;
    loop {
        let with_suffix = options.directory.join(format!("{fname}{suffix}"));
        if is_readable_file(&with_suffix) {
            return Some(with_suffix);
        }
        let bare = options.directory.join(fname);
        if !fname.is_empty() && is_readable_file(&bare) {
            return Some(bare);
        }

        let rightmost = delims.chars().filter_map(|ch| fname.rfind(ch)).max().unwrap_or(0);
        if rightmost == 0 {
            return None;
        }
        fname = &fname[..rightmost];
    }
}

/// Locale-driven search over `filename + prefix + language + suffix`.
///
/// Each UI language is tried as given (dashes turned into underscores) and
/// then lower-cased; afterwards `filename + suffix` (explicit suffix only),
/// `filename + prefix` and `filename` are tried.
pub fn find_for_locale<S: AsRef<str>>(
    ui_languages: &[S],
    filename: &str,
    prefix: &str,
    options: &LoadOptions,
) -> Option<PathBuf> {
    tracing::debug!(
        filename,
        prefix,
        directory = %options.directory.display(),
        "searching translation"
    );
    let suffix = options.suffix_or_default();
    let base = format!("{filename}{prefix}");

    for lang in ui_languages {
        let given = lang.as_ref().replace('-', "_");
        let lower = given.to_lowercase();
        let mut candidates = vec![given.as_str()];
        if lower != given {
            candidates.push(lower.as_str());
        }
        for loc in candidates {
            let with_suffix = options.directory.join(format!("{base}{loc}{suffix}"));
            if is_readable_file(&with_suffix) {
                return Some(with_suffix);
            }
            let bare = options.directory.join(format!("{base}{loc}"));
            if is_readable_file(&bare) {
                return Some(bare);
            }
        }
    }

    if let Some(explicit) = options.suffix.as_deref() {
        let p = options.directory.join(format!("{filename}{explicit}"));
        if is_readable_file(&p) {
            return Some(p);
        }
    }
    for name in [base.as_str(), filename] {
        if name.is_empty() {
            continue;
        }
        let p = options.directory.join(name);
        if is_readable_file(&p) {
            return Some(p);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn truncation_walks_back_to_shorter_names() {
        let tmp = tempdir().unwrap();
        let opts = LoadOptions::new(tmp.path());

        touch(tmp.path(), "foo.qm");
        assert_eq!(find_by_truncation("foo.fr_ca", &opts), Some(tmp.path().join("foo.qm")));

        touch(tmp.path(), "foo.fr");
        assert_eq!(find_by_truncation("foo.fr_ca", &opts), Some(tmp.path().join("foo.fr")));

        touch(tmp.path(), "foo.fr.qm");
        assert_eq!(find_by_truncation("foo.fr_ca", &opts), Some(tmp.path().join("foo.fr.qm")));

        touch(tmp.path(), "foo.fr_ca");
        assert_eq!(find_by_truncation("foo.fr_ca", &opts), Some(tmp.path().join("foo.fr_ca")));
    }

    #[test]
    fn truncation_gives_up_without_delimiters() {
        let tmp = tempdir().unwrap();
        let opts = LoadOptions::new(tmp.path());
        assert_eq!(find_by_truncation("nothing_here", &opts), None);
        assert_eq!(find_by_truncation("", &opts), None);
    }

    #[test]
    fn custom_suffix_and_delimiters() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "app-de.cat");
        let opts = LoadOptions::new(tmp.path()).with_suffix(".cat").with_search_delimiters("-");
        assert_eq!(find_by_truncation("app-de-AT", &opts), Some(tmp.path().join("app-de.cat")));
    }

    #[test]
    fn absolute_name_ignores_directory() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "abs.qm");
        let abs = tmp.path().join("abs");
        let opts = LoadOptions::new("/definitely/not/here");
        assert_eq!(
            find_by_truncation(abs.to_str().unwrap(), &opts),
            Some(tmp.path().join("abs.qm"))
        );
    }

    #[test]
    fn locale_search_order() {
        let tmp = tempdir().unwrap();
        let opts = LoadOptions::new(tmp.path());
        let langs = ["en-US", "en"];

        // the default suffix is not used for the bare fallbacks
        touch(tmp.path(), "foo.qm");
        assert_eq!(find_for_locale(&langs, "foo", ".", &opts), None);

        touch(tmp.path(), "foo");
        assert_eq!(find_for_locale(&langs, "foo", ".", &opts), Some(tmp.path().join("foo")));

        touch(tmp.path(), "foo.");
        assert_eq!(find_for_locale(&langs, "foo", ".", &opts), Some(tmp.path().join("foo.")));

        touch(tmp.path(), "foo.en.qm");
        assert_eq!(find_for_locale(&langs, "foo", ".", &opts), Some(tmp.path().join("foo.en.qm")));

        touch(tmp.path(), "foo.en_us.qm");
        assert_eq!(find_for_locale(&langs, "foo", ".", &opts), Some(tmp.path().join("foo.en_us.qm")));

        touch(tmp.path(), "foo.en_US");
        assert_eq!(find_for_locale(&langs, "foo", ".", &opts), Some(tmp.path().join("foo.en_US")));

        touch(tmp.path(), "foo.en_US.qm");
        assert_eq!(find_for_locale(&langs, "foo", ".", &opts), Some(tmp.path().join("foo.en_US.qm")));
    }

    #[test]
    fn locale_search_explicit_suffix_fallback() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "foo.cat");
        let opts = LoadOptions::new(tmp.path()).with_suffix(".cat");
        assert_eq!(find_for_locale(&["pl"], "foo", "_", &opts), Some(tmp.path().join("foo.cat")));
        assert_eq!(find_for_locale(&["pl"], "bar", "_", &opts), None);
    }
}
