//! QM catalog file format (big-endian).
//!
//! Header:
//!   magic[16] = 3c b8 64 18 ca ef 9c 95 cd 21 1c bf 60 a1 bd dd
//!
//! Sections, repeated until tag 0, length 0 or fewer than 6 bytes left:
//!   tag[1] len[4] payload[len]
//!
//!   0x2f Contexts      u16 buckets, buckets * u16 offset, overflow area
//!   0x42 Hashes        repeat { u32 hash, u32 message offset }, sorted by hash
//!   0x69 Messages      tagged message records
//!   0x88 NumerusRules  plural rules bytecode (see `plural`)
//!   0x96 Dependencies  repeat { u32 byte len, UTF-16BE name }
//!   0xa7 Language      UTF-8 language tag
//!
//! Any other tag is skipped.

use crate::consts::{SectionTag, MAGIC, MAGIC_LEN, NULL_STRING_LEN};
use crate::errors::{CatalogError, Result};
use crate::plural;
use crate::utils::{decode_utf16_be, ByteReader};

/// Offset + length of a section inside the catalog buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Section {
    pub offset: usize,
    pub len: usize,
}

impl Section {
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        buf.get(self.offset..self.offset + self.len).unwrap_or(&[])
    }
}

/// Everything the section walk extracted from one buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub language: Option<String>,
    pub contexts: Option<Section>,
    pub hashes: Option<Section>,
    pub messages: Option<Section>,
    pub numerus_rules: Option<Section>,
    pub dependencies: Vec<String>,
}

pub fn check_magic(buf: &[u8]) -> Result<()> {
    if buf.len() < MAGIC_LEN || &buf[..MAGIC_LEN] != MAGIC {
        return Err(CatalogError::BadMagic);
    }
    Ok(())
}

/// Walks the section records of a whole catalog buffer and validates the plural rules.
/// Dependencies are only named here; loading them is the catalog's job.
pub fn parse_sections(buf: &[u8]) -> Result<Sections> {
    check_magic(buf)?;
    let mut r = ByteReader::at(buf, MAGIC_LEN);
    let mut out = Sections::default();

    while r.remaining() > 5 {
        let raw_tag = r.read_u8()?;
        let len = r.read_u32()?;
        if raw_tag == 0 || len == 0 {
            break;
        }
        if len as usize > r.remaining() {
            return Err(CatalogError::TruncatedSection {
                tag: raw_tag,
                declared: len,
                remaining: r.remaining(),
            });
        }
        let section = Section { offset: r.pos(), len: len as usize };
        let payload = r.take(len as usize)?;

        let tag = SectionTag::from(raw_tag);
        tracing::trace!(?tag, offset = section.offset, len, "section");
        match tag {
            SectionTag::Language => {
                out.language = Some(String::from_utf8_lossy(payload).into_owned());
            }
            SectionTag::Contexts => out.contexts = Some(section),
            SectionTag::Hashes => out.hashes = Some(section),
            SectionTag::Messages => out.messages = Some(section),
            SectionTag::NumerusRules => out.numerus_rules = Some(section),
            SectionTag::Dependencies => {
                out.dependencies.extend(parse_dependency_list(payload)?);
            }
            SectionTag::Unknown(_) => {}
        }
    }

    let rules = out.numerus_rules.map(|s| s.slice(buf)).unwrap_or(&[]);
    if !plural::is_valid(rules) {
        return Err(CatalogError::InvalidPluralRules);
    }
    Ok(out)
}

/// Serialized string list: u32 byte length (0xFFFFFFFF = null) + UTF-16BE units.
pub fn parse_dependency_list(payload: &[u8]) -> Result<Vec<String>> {
    let mut r = ByteReader::new(payload);
    let mut names = Vec::new();
    while !r.is_empty() {
        let len = r.read_u32().map_err(|_| CatalogError::CorruptDependencyList)?;
        if len == NULL_STRING_LEN {
            names.push(String::new());
            continue;
        }
        if len % 2 != 0 {
            return Err(CatalogError::CorruptDependencyList);
        }
        let bytes = r.take(len as usize).map_err(|_| CatalogError::CorruptDependencyList)?;
        names.push(String::from_utf16_lossy(&decode_utf16_be(bytes)));
    }
    Ok(names)
}
