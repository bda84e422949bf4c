#![allow(dead_code)]

use qm_core::consts::MAGIC;
use qm_core::{CatalogWriter, Catalog};
use std::path::Path;

pub fn section(out: &mut Vec<u8>, tag: u8, payload: &[u8]) {
    out.push(tag);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
}

pub fn field(out: &mut Vec<u8>, tag: u8, payload: &[u8]) {
    out.push(tag);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
}

pub fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
}

/// Record fields: translation, source text, context; then End.
pub fn record(context: &str, source: &str, translation: &str) -> Vec<u8> {
    let mut v = Vec::new();
    field(&mut v, 3, &utf16(translation));
    field(&mut v, 6, source.as_bytes());
    field(&mut v, 7, context.as_bytes());
    v.push(1);
    v
}

/// Builds a catalog by hand from records and explicit (hash, record index) entries.
pub fn hand_built(records: &[Vec<u8>], entries: &[(u32, usize)]) -> Vec<u8> {
    let mut messages = Vec::new();
    let mut offsets = Vec::new();
    for r in records {
        offsets.push(messages.len() as u32);
        messages.extend_from_slice(r);
    }
    let mut hashes = Vec::new();
    for &(h, idx) in entries {
        hashes.extend_from_slice(&h.to_be_bytes());
        hashes.extend_from_slice(&offsets[idx].to_be_bytes());
    }
    let mut buf = MAGIC.to_vec();
    section(&mut buf, 0x69, &messages);
    section(&mut buf, 0x42, &hashes);
    buf
}

pub fn load_bytes(buf: Vec<u8>) -> Catalog {
    let mut c = Catalog::new();
    c.load_source(buf, "").expect("catalog loads");
    c
}

pub fn write_catalog(dir: &Path, name: &str, build: impl FnOnce(&mut CatalogWriter)) {
    let mut w = CatalogWriter::new();
    build(&mut w);
    w.write_to(dir.join(name)).expect("catalog written");
}
