use crate::errors::{CatalogError, Result};
use crate::format::{self, Section, Sections};
use crate::locate::{self, LoadOptions};
use crate::message::{self, MessageRecord};
use crate::plural::PluralRules;
use crate::resolver::{HashEntry, HashTable};
use crate::source::{self, ByteSource};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A loaded translation unit.
///
/// A catalog is either empty (every lookup misses) or fully loaded from one
/// byte source. Loading replaces previous contents; a failed load leaves the
/// catalog empty. Lookups take `&self` and never mutate.
#[derive(Default)]
pub struct Catalog {
    source: Option<Box<dyn ByteSource>>,
    sections: Sections,
    dependencies: Vec<Catalog>,
    file_path: Option<PathBuf>,
}

/// Section sizes and metadata, as reported by `qm info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub language: String,
    pub file_path: Option<PathBuf>,
    pub messages_len: usize,
    pub hashes_len: usize,
    pub contexts_len: usize,
    pub numerus_rules_len: usize,
    pub entry_count: usize,
    pub dependencies: Vec<String>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("language", &self.language())
            .field("file_path", &self.file_path)
            .field("len", &self.bytes().len())
            .field("sections", &self.sections)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads from an in-memory or mapped buffer. `directory` resolves dependencies.
    pub fn load_source<S: ByteSource + 'static>(&mut self, source: S, directory: impl AsRef<Path>) -> Result<()> {
        self.clear();
        let mut chain = Vec::new();
        self.load_boxed(Box::new(source), directory.as_ref(), &mut chain)
    }

    /// Loads `filename`, trying the truncated names described in [`locate::find_by_truncation`].
    pub fn load_file(&mut self, filename: &str, options: &LoadOptions) -> Result<()> {
        self.clear();
        let mut chain = Vec::new();
        self.load_file_inner(filename, options, &mut chain)
    }

    /// Loads the best match for the given UI languages, see [`locate::find_for_locale`].
    pub fn load_locale<S: AsRef<str>>(
        &mut self,
        ui_languages: &[S],
        filename: &str,
        prefix: &str,
        options: &LoadOptions,
    ) -> Result<()> {
        self.clear();
        let path = locate::find_for_locale(ui_languages, filename, prefix, options)
            .ok_or_else(|| CatalogError::NotFound(filename.to_string()))?;
        let mut chain = Vec::new();
        self.load_path(path, &options.directory, &mut chain)
    }

    fn load_file_inner(&mut self, filename: &str, options: &LoadOptions, chain: &mut Vec<PathBuf>) -> Result<()> {
        let path = locate::find_by_truncation(filename, options)
            .ok_or_else(|| CatalogError::NotFound(filename.to_string()))?;
        self.load_path(path, &options.directory, chain)
    }

    fn load_path(&mut self, path: PathBuf, directory: &Path, chain: &mut Vec<PathBuf>) -> Result<()> {
        let key = fs::canonicalize(&path)?;
        if chain.contains(&key) {
            return Err(CatalogError::CyclicDependency(key));
        }
        let source = source::open_file(&path)?;
        let base_dir = if directory.as_os_str().is_empty() {
            key.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            directory.to_path_buf()
        };

        chain.push(key);
        let result = self.load_boxed(source, &base_dir, chain);
        chain.pop();
        result?;

        self.file_path = Some(path);
        Ok(())
    }

    fn load_boxed(&mut self, source: Box<dyn ByteSource>, directory: &Path, chain: &mut Vec<PathBuf>) -> Result<()> {
        match Self::parse_with_dependencies(source.bytes(), directory, chain) {
            Ok((sections, dependencies)) => {
                self.source = Some(source);
                self.sections = sections;
                self.dependencies = dependencies;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog load failed");
                self.clear();
                Err(e)
            }
        }
    }

    fn parse_with_dependencies(
        buf: &[u8],
        directory: &Path,
        chain: &mut Vec<PathBuf>,
    ) -> Result<(Sections, Vec<Catalog>)> {
        let sections = format::parse_sections(buf)?;
        let options = LoadOptions::new(directory);
        let mut dependencies = Vec::with_capacity(sections.dependencies.len());
        for name in &sections.dependencies {
            tracing::debug!(dependency = %name, directory = %directory.display(), "loading dependency");
            let mut dep = Catalog::new();
            dep.load_file_inner(name, &options, chain).map_err(|e| match e {
                CatalogError::CyclicDependency(p) => CatalogError::CyclicDependency(p),
                other => CatalogError::DependencyLoadFailed { name: name.clone(), source: Box::new(other) },
            })?;
            dependencies.push(dep);
        }
        Ok((sections, dependencies))
    }

    /// Releases the buffer, all sections and all dependencies.
    pub fn clear(&mut self) {
        self.source = None;
        self.sections = Sections::default();
        self.dependencies.clear();
        self.file_path = None;
    }

    pub fn is_empty(&self) -> bool {
        self.sections.messages.is_none()
            && self.sections.hashes.is_none()
            && self.sections.contexts.is_none()
            && self.dependencies.is_empty()
    }

    /// Target language stored in the catalog, empty if none.
    pub fn language(&self) -> &str {
        self.sections.language.as_deref().unwrap_or("")
    }

    /// Path of the loaded file; `None` for in-memory loads or when nothing is loaded.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn dependencies(&self) -> &[Catalog] {
        &self.dependencies
    }

    pub fn dependency_names(&self) -> &[String] {
        &self.sections.dependencies
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.source.as_ref().map(|s| s.bytes()).unwrap_or(&[])
    }

    pub(crate) fn view(&self, section: Option<Section>) -> &[u8] {
        section.map(|s| s.slice(self.bytes())).unwrap_or(&[])
    }

    pub(crate) fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn plural_rules(&self) -> PluralRules<'_> {
        PluralRules::new(self.view(self.sections.numerus_rules)).unwrap_or_default()
    }

    pub(crate) fn hash_table(&self) -> HashTable<'_> {
        HashTable::new(self.view(self.sections.hashes))
    }

    /// Hash-table entries in table order.
    pub fn entries(&self) -> impl Iterator<Item = HashEntry> + '_ {
        self.hash_table().iter()
    }

    /// Every field of the record at `offset` in the Messages section.
    pub fn record_at(&self, offset: u32) -> Option<MessageRecord> {
        message::read_record(self.view(self.sections.messages), offset as usize)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            language: self.language().to_string(),
            file_path: self.file_path.clone(),
            messages_len: self.view(self.sections.messages).len(),
            hashes_len: self.view(self.sections.hashes).len(),
            contexts_len: self.view(self.sections.contexts).len(),
            numerus_rules_len: self.view(self.sections.numerus_rules).len(),
            entry_count: self.hash_table().len(),
            dependencies: self.sections.dependencies.clone(),
        }
    }
}
