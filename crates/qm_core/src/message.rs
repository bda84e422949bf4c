//! Message records inside the Messages section.
//!
//! A record is a run of tagged fields ended by `End`:
//!   Translation  u32 len, UTF-16BE payload (len is even), one per plural form
//!   SourceText   u32 len, bytes
//!   Context      u32 len, bytes
//!   Comment      u32 len, bytes
//!   Obsolete1    4 bytes, ignored
//! Malformed input never fails a query; the record just does not match.

use crate::consts::{RecordTag, OBSOLETE1_WIDTH};
use crate::errors::Result;
use crate::utils::{decode_utf16_be, matches_stored, ByteReader};

/// Lookup key for one record walk. Strings are already NUL-trimmed.
#[derive(Debug, Clone, Copy)]
pub struct MessageQuery<'q> {
    pub context: &'q [u8],
    pub source_text: &'q [u8],
    pub comment: &'q [u8],
    pub numerus: u32,
}

/// Decodes the record at `offset` if it matches `query`, returning the selected plural form.
pub fn decode(messages: &[u8], offset: usize, query: &MessageQuery<'_>) -> Option<Vec<u16>> {
    if offset > messages.len() {
        return None;
    }
    let mut r = ByteReader::at(messages, offset);
    let mut skip = Some(query.numerus);
    let mut found: Option<&[u8]> = None;

    loop {
        let tag = if r.is_empty() { RecordTag::Unknown(0) } else { RecordTag::from(r.read_u8().ok()?) };
        match tag {
            RecordTag::End => break,
            RecordTag::Translation => {
                let len = r.read_u32().ok()?;
                if len & 1 != 0 {
                    return None;
                }
                let payload = r.take(len as usize).ok()?;
                skip = match skip {
                    Some(0) => {
                        found = Some(payload);
                        None
                    }
                    Some(k) => Some(k - 1),
                    None => None,
                };
            }
            RecordTag::Obsolete1 => r.skip(OBSOLETE1_WIDTH).ok()?,
            RecordTag::SourceText => {
                let field = read_field(&mut r).ok()?;
                if !matches_stored(field, query.source_text) {
                    return None;
                }
            }
            RecordTag::Context => {
                let field = read_field(&mut r).ok()?;
                if !matches_stored(field, query.context) {
                    return None;
                }
            }
            RecordTag::Comment => {
                let field = read_field(&mut r).ok()?;
                // an empty stored comment matches any disambiguation
                if field.first().is_some_and(|&b| b != 0) && !matches_stored(field, query.comment) {
                    return None;
                }
            }
            RecordTag::SourceText16
            | RecordTag::Context16
            | RecordTag::Obsolete2
            | RecordTag::Unknown(_) => return None,
        }
    }

    found.map(decode_utf16_be)
}

fn read_field<'a>(r: &mut ByteReader<'a>) -> Result<&'a [u8]> {
    let len = r.read_u32()?;
    r.take(len as usize)
}

/// Fully materialized record, for inspection tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRecord {
    pub source_text: Option<Vec<u8>>,
    pub context: Option<Vec<u8>>,
    pub comment: Option<Vec<u8>>,
    pub translations: Vec<Vec<u16>>,
}

impl MessageRecord {
    pub fn translation_strings(&self) -> Vec<String> {
        self.translations.iter().map(|t| String::from_utf16_lossy(t)).collect()
    }
}

fn trim_nul(field: &[u8]) -> Vec<u8> {
    match field.split_last() {
        Some((0, rest)) => rest.to_vec(),
        _ => field.to_vec(),
    }
}

/// Reads every field of the record at `offset`. `None` for malformed records.
pub fn read_record(messages: &[u8], offset: usize) -> Option<MessageRecord> {
    if offset > messages.len() {
        return None;
    }
    let mut r = ByteReader::at(messages, offset);
    let mut rec = MessageRecord::default();
    loop {
        if r.is_empty() {
            return None;
        }
        match RecordTag::from(r.read_u8().ok()?) {
            RecordTag::End => return Some(rec),
            RecordTag::Translation => {
                let len = r.read_u32().ok()?;
                if len & 1 != 0 {
                    return None;
                }
                rec.translations.push(decode_utf16_be(r.take(len as usize).ok()?));
            }
            RecordTag::Obsolete1 => r.skip(OBSOLETE1_WIDTH).ok()?,
            RecordTag::SourceText => rec.source_text = Some(trim_nul(read_field(&mut r).ok()?)),
            RecordTag::Context => rec.context = Some(trim_nul(read_field(&mut r).ok()?)),
            RecordTag::Comment => rec.comment = Some(trim_nul(read_field(&mut r).ok()?)),
            _ => return None,
        }
    }
}
