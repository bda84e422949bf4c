use crate::errors::{CatalogError, Result};
use byteorder::{BigEndian as BE, ByteOrder, WriteBytesExt};
use std::io::{self, Write};

/// Bounds-checked big-endian cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, wanted: usize) -> Result<()> {
        match self.pos.checked_add(wanted) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => Err(CatalogError::OutOfBounds { offset: self.pos, wanted, len: self.buf.len() }),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(2)?;
        let v = BE::read_u16(&self.buf[self.pos..]);
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        let v = BE::read_u32(&self.buf[self.pos..]);
        self.pos += 4;
        Ok(v)
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        self.check(n)?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }
}

/// Feeds `bytes` into an ELF hash accumulator, stopping at the first NUL.
pub fn elf_hash_continue(bytes: &[u8], h: &mut u32) {
    for &b in bytes {
        if b == 0 {
            break;
        }
        *h = (*h << 4).wrapping_add(b as u32);
        let g = *h & 0xf000_0000;
        if g != 0 {
            *h ^= g >> 24;
        }
        *h &= !g;
    }
}

/// Zero is reserved; a finished hash is never 0.
pub fn elf_hash_finish(h: &mut u32) {
    if *h == 0 {
        *h = 1;
    }
}

pub fn elf_hash(bytes: &[u8]) -> u32 {
    let mut h = 0;
    elf_hash_continue(bytes, &mut h);
    elf_hash_finish(&mut h);
    h
}

/// Hash of a source text continued over its disambiguation comment.
pub fn message_hash(source_text: &[u8], comment: &[u8]) -> u32 {
    let mut h = 0;
    elf_hash_continue(source_text, &mut h);
    elf_hash_continue(comment, &mut h);
    elf_hash_finish(&mut h);
    h
}

/// Query strings behave like C strings: everything after the first NUL is ignored.
pub fn c_str(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(i) => &bytes[..i],
        None => bytes,
    }
}

/// Compares a stored field against a query string; one trailing NUL on the stored side is dropped.
pub fn matches_stored(found: &[u8], target: &[u8]) -> bool {
    let found = match found.split_last() {
        Some((0, rest)) => rest,
        _ => found,
    };
    found == target
}

pub fn decode_utf16_be(bytes: &[u8]) -> Vec<u16> {
    let mut out = vec![0u16; bytes.len() / 2];
    BE::read_u16_into(&bytes[..out.len() * 2], &mut out);
    out
}

pub fn write_u8<W: Write>(w: &mut W, v: u8) -> io::Result<()> { w.write_u8(v) }
pub fn write_u16<W: Write>(w: &mut W, v: u16) -> io::Result<()> { w.write_u16::<BE>(v) }
pub fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> { w.write_u32::<BE>(v) }

pub fn write_utf16<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    for unit in s.encode_utf16() {
        w.write_u16::<BE>(unit)?;
    }
    Ok(())
}
