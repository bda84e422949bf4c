//! JSON description of a catalog, compiled by `qm compile`.
//!
//! ```json
//! {
//!   "language": "pl_PL",
//!   "numerus_rules": "0101ff140204fd2c0c0e",
//!   "dependencies": ["qt_pl"],
//!   "contexts": true,
//!   "messages": [
//!     { "context": "Dialog", "source": "Cancel", "translations": ["Anuluj"] }
//!   ]
//! }
//! ```

use crate::errors::Result;
use crate::writer::CatalogWriter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEntry {
    #[serde(default)]
    pub context: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    pub translations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Plural rules bytecode, hex encoded.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub numerus_rules: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub contexts: bool,

    #[serde(default)]
    pub messages: Vec<MessageEntry>,
}

impl CatalogManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }

    pub fn into_writer(self) -> Result<CatalogWriter> {
        let mut w = CatalogWriter::new();
        if let Some(lang) = self.language {
            w.set_language(lang);
        }
        w.set_numerus_rules(&hex::decode(self.numerus_rules.trim())?)?;
        for dep in self.dependencies {
            w.add_dependency(dep);
        }
        w.with_context_table(self.contexts);
        for m in &self.messages {
            w.add_message(&m.context, &m.source, &m.comment, &m.translations);
        }
        Ok(w)
    }
}
