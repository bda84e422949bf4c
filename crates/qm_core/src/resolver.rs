//! Translation lookup over a loaded catalog.

use crate::catalog::Catalog;
use crate::consts::HASH_ENTRY_SIZE;
use crate::errors::Result;
use crate::message::{self, MessageQuery};
use crate::utils::{c_str, elf_hash, matches_stored, message_hash, ByteReader};
use byteorder::{BigEndian as BE, ByteOrder};

/// One `(hash, message offset)` pair of the Hashes section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEntry {
    pub hash: u32,
    pub offset: u32,
}

/// The Hashes section, sorted ascending by hash; equal hashes form a contiguous run.
#[derive(Debug, Clone, Copy)]
pub struct HashTable<'a> {
    bytes: &'a [u8],
}

impl<'a> HashTable<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / HASH_ENTRY_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn hash_at(&self, i: usize) -> u32 {
        BE::read_u32(&self.bytes[i * HASH_ENTRY_SIZE..])
    }

    pub fn entry(&self, i: usize) -> HashEntry {
        let at = i * HASH_ENTRY_SIZE;
        HashEntry {
            hash: BE::read_u32(&self.bytes[at..]),
            offset: BE::read_u32(&self.bytes[at + 4..]),
        }
    }

    pub fn iter(self) -> impl Iterator<Item = HashEntry> + 'a {
        (0..self.len()).map(move |i| self.entry(i))
    }

    /// Binary search for any entry equal to `h`, then back up to the first of its run.
    pub fn run_start(&self, h: u32) -> Option<usize> {
        let (mut lo, mut hi) = (0usize, self.len());
        let mut hit = None;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let mh = self.hash_at(mid);
            if mh == h {
                hit = Some(mid);
                break;
            } else if mh < h {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let mut i = hit?;
        while i > 0 && self.hash_at(i - 1) == h {
            i -= 1;
        }
        Some(i)
    }

    /// All entries whose hash equals `h`, in table order.
    pub fn candidates(self, h: u32) -> impl Iterator<Item = HashEntry> + 'a {
        let start = self.run_start(h).unwrap_or(self.len());
        (start..self.len()).map(move |i| self.entry(i)).take_while(move |e| e.hash == h)
    }
}

/// Walks the context chain of the bucket `context` hashes to.
fn find_context(contexts: &[u8], context: &[u8]) -> Result<bool> {
    let mut r = ByteReader::new(contexts);
    let buckets = r.read_u16()? as usize;
    if buckets == 0 {
        return Ok(false);
    }
    let bucket = (elf_hash(context) % buckets as u32) as usize;
    let off = ByteReader::at(contexts, 2 + bucket * 2).read_u16()? as usize;
    if off == 0 {
        return Ok(false);
    }
    let mut chain = ByteReader::at(contexts, 2 + buckets * 2 + off * 2);
    loop {
        let len = chain.read_u8()? as usize;
        if len == 0 {
            return Ok(false);
        }
        if matches_stored(chain.take(len)?, context) {
            return Ok(true);
        }
    }
}

impl Catalog {
    /// Looks up a translation. Absence anywhere, including dependencies, is `None`.
    ///
    /// `n` picks the plural form; `None` means no quantity (form 0).
    pub fn translate(
        &self,
        context: &str,
        source_text: &str,
        disambiguation: Option<&str>,
        n: Option<i32>,
    ) -> Option<String> {
        self.translate_raw(
            context.as_bytes(),
            source_text.as_bytes(),
            disambiguation.unwrap_or("").as_bytes(),
            n.unwrap_or(-1),
        )
        .map(|units| String::from_utf16_lossy(&units))
    }

    /// Byte-string lookup returning UTF-16 code units. A negative `n` means no quantity.
    pub fn translate_raw(&self, context: &[u8], source_text: &[u8], comment: &[u8], n: i32) -> Option<Vec<u16>> {
        let context = c_str(context);
        let source_text = c_str(source_text);
        let comment = c_str(comment);

        self.lookup_local(context, source_text, comment, n).or_else(|| {
            self.dependencies()
                .iter()
                .find_map(|dep| dep.translate_raw(context, source_text, comment, n))
        })
    }

    fn lookup_local(&self, context: &[u8], source_text: &[u8], comment: &[u8], n: i32) -> Option<Vec<u16>> {
        let table = self.hash_table();
        if table.is_empty() {
            return None;
        }
        if let Some(section) = self.sections().contexts {
            let contexts = section.slice(self.bytes());
            if !find_context(contexts, context).unwrap_or(false) {
                return None;
            }
        }

        let numerus = if n >= 0 { self.plural_rules().resolve(n) } else { 0 };
        let messages = self.view(self.sections().messages);

        let mut comment = comment;
        loop {
            let query = MessageQuery { context, source_text, comment, numerus };
            let h = message_hash(source_text, comment);
            let hit = table
                .candidates(h)
                .find_map(|e| message::decode(messages, e.offset as usize, &query));
            if hit.is_some() {
                return hit;
            }
            if comment.is_empty() {
                return None;
            }
            // retry once without the disambiguation
            comment = b"";
        }
    }
}
