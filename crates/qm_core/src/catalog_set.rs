use crate::catalog::Catalog;

/// Caller-owned stack of installed catalogs.
///
/// The most recently installed catalog is searched first and the first hit
/// wins, so installing a catalog again gives it priority.
#[derive(Debug, Default)]
pub struct CatalogSet {
    catalogs: Vec<Catalog>, // install order
}

impl CatalogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty catalogs are refused and handed back.
    pub fn install(&mut self, catalog: Catalog) -> Result<(), Catalog> {
        if catalog.is_empty() {
            return Err(catalog);
        }
        self.catalogs.push(catalog);
        Ok(())
    }

    /// Removes by search position (0 = searched first).
    pub fn remove(&mut self, position: usize) -> Option<Catalog> {
        let idx = position.checked_add(1).and_then(|p| self.catalogs.len().checked_sub(p))?;
        Some(self.catalogs.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// Catalogs in search order.
    pub fn iter(&self) -> impl Iterator<Item = &Catalog> {
        self.catalogs.iter().rev()
    }

    pub fn translate(
        &self,
        context: &str,
        source_text: &str,
        disambiguation: Option<&str>,
        n: Option<i32>,
    ) -> Option<String> {
        self.iter().find_map(|c| c.translate(context, source_text, disambiguation, n))
    }

    pub fn translate_raw(&self, context: &[u8], source_text: &[u8], comment: &[u8], n: i32) -> Option<Vec<u16>> {
        self.iter().find_map(|c| c.translate_raw(context, source_text, comment, n))
    }
}
