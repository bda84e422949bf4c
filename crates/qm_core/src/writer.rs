//! Catalog writer: builds a QM buffer from messages, then publishes it atomically.

use crate::consts::{RecordTag, SectionTag, MAGIC};
use crate::errors::{CatalogError, Result};
use crate::plural;
use crate::utils::{elf_hash, message_hash, write_u16, write_u32, write_u8, write_utf16};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct PendingMessage {
    context: String,
    source_text: String,
    comment: String,
    translations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogWriter {
    language: Option<String>,
    numerus_rules: Vec<u8>,
    dependencies: Vec<String>,
    messages: Vec<PendingMessage>,
    context_table: bool,
}

impl CatalogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = Some(language.into());
    }

    /// Rejects bytecode that would fail to load.
    pub fn set_numerus_rules(&mut self, rules: &[u8]) -> Result<()> {
        if !plural::is_valid(rules) {
            return Err(CatalogError::InvalidPluralRules);
        }
        self.numerus_rules = rules.to_vec();
        Ok(())
    }

    pub fn add_dependency(&mut self, name: impl Into<String>) {
        self.dependencies.push(name.into());
    }

    /// Emit a Contexts section so lookups for foreign contexts miss early.
    pub fn with_context_table(&mut self, enabled: bool) {
        self.context_table = enabled;
    }

    /// One message; `translations` holds the plural forms in order.
    pub fn add_message<S: AsRef<str>>(&mut self, context: &str, source_text: &str, comment: &str, translations: &[S]) {
        self.messages.push(PendingMessage {
            context: context.to_string(),
            source_text: source_text.to_string(),
            comment: comment.to_string(),
            translations: translations.iter().map(|t| t.as_ref().to_string()).collect(),
        });
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = MAGIC.to_vec();

        if let Some(lang) = &self.language {
            write_section(&mut out, SectionTag::Language, lang.as_bytes())?;
        }

        if !self.dependencies.is_empty() {
            let mut deps = Vec::new();
            for name in &self.dependencies {
                let units = name.encode_utf16().count();
                write_u32(&mut deps, (units * 2) as u32)?;
                write_utf16(&mut deps, name)?;
            }
            write_section(&mut out, SectionTag::Dependencies, &deps)?;
        }

        let (hashes, messages) = self.build_messages()?;
        write_section(&mut out, SectionTag::Hashes, &hashes)?;
        write_section(&mut out, SectionTag::Messages, &messages)?;

        if self.context_table {
            if let Some(contexts) = self.build_context_table()? {
                write_section(&mut out, SectionTag::Contexts, &contexts)?;
            }
        }

        write_section(&mut out, SectionTag::NumerusRules, &self.numerus_rules)?;
        Ok(out)
    }

    fn build_messages(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut messages = Vec::new();
        let mut entries: Vec<(u32, u32)> = Vec::with_capacity(self.messages.len());
        for m in &self.messages {
            let offset = u32::try_from(messages.len())
                .map_err(|_| CatalogError::InvalidInput("messages section exceeds 4 GiB".into()))?;
            for t in &m.translations {
                write_u8(&mut messages, RecordTag::Translation.as_u8())?;
                write_u32(&mut messages, (t.encode_utf16().count() * 2) as u32)?;
                write_utf16(&mut messages, t)?;
            }
            write_field(&mut messages, RecordTag::SourceText, m.source_text.as_bytes())?;
            write_field(&mut messages, RecordTag::Context, m.context.as_bytes())?;
            if !m.comment.is_empty() {
                write_field(&mut messages, RecordTag::Comment, m.comment.as_bytes())?;
            }
            write_u8(&mut messages, RecordTag::End.as_u8())?;
            entries.push((message_hash(m.source_text.as_bytes(), m.comment.as_bytes()), offset));
        }

        // stable: colliding hashes keep insertion order
        entries.sort_by_key(|&(h, _)| h);
        let mut hashes = Vec::with_capacity(entries.len() * 8);
        for (h, off) in entries {
            write_u32(&mut hashes, h)?;
            write_u32(&mut hashes, off)?;
        }
        Ok((hashes, messages))
    }

    fn build_context_table(&self) -> Result<Option<Vec<u8>>> {
        let mut names: Vec<&str> = Vec::new();
        for m in &self.messages {
            if !names.contains(&m.context.as_str()) {
                names.push(&m.context);
            }
        }
        if names.is_empty() {
            return Ok(None);
        }

        let buckets = (names.len() * 2 + 1).min(u16::MAX as usize);
        let mut chains: Vec<Vec<&str>> = vec![Vec::new(); buckets];
        for name in names {
            if name.is_empty() || name.len() > u8::MAX as usize {
                return Err(CatalogError::InvalidInput(format!(
                    "context {name:?} cannot be stored in a context table"
                )));
            }
            chains[(elf_hash(name.as_bytes()) % buckets as u32) as usize].push(name);
        }

        // offset 0 marks an empty bucket, so the overflow area starts with a zero word
        let mut offsets = vec![0u16; buckets];
        let mut overflow = vec![0u8, 0u8];
        for (bucket, chain) in chains.iter().enumerate() {
            if chain.is_empty() {
                continue;
            }
            offsets[bucket] = u16::try_from(overflow.len() / 2)
                .map_err(|_| CatalogError::InvalidInput("context table too large".into()))?;
            for name in chain {
                overflow.push(name.len() as u8);
                overflow.extend_from_slice(name.as_bytes());
            }
            overflow.push(0);
            if overflow.len() % 2 == 1 {
                overflow.push(0);
            }
        }

        let mut table = Vec::with_capacity(2 + buckets * 2 + overflow.len());
        write_u16(&mut table, buckets as u16)?;
        for off in offsets {
            write_u16(&mut table, off)?;
        }
        table.extend_from_slice(&overflow);
        Ok(Some(table))
    }

    /// Writes through a temp file in the target directory, then renames into place.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let bytes = self.to_bytes()?;
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::Builder::new().prefix(".qm_").tempfile_in(dir)?;
        tmp.as_file_mut().write_all(&bytes)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(path)?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "catalog written");
        Ok(path.to_path_buf())
    }
}

/// Empty payloads are left out: a zero length ends the section walk.
fn write_section(out: &mut Vec<u8>, tag: SectionTag, payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        return Ok(());
    }
    let len = u32::try_from(payload.len())
        .map_err(|_| CatalogError::InvalidInput(format!("{tag:?} section exceeds 4 GiB")))?;
    write_u8(out, tag.as_u8())?;
    write_u32(out, len)?;
    out.extend_from_slice(payload);
    Ok(())
}

fn write_field(out: &mut Vec<u8>, tag: RecordTag, payload: &[u8]) -> Result<()> {
    write_u8(out, tag.as_u8())?;
    write_u32(out, payload.len() as u32)?;
    out.extend_from_slice(payload);
    Ok(())
}
