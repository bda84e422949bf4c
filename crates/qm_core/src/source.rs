//! Byte providers backing a loaded catalog.
//!
//! A catalog keeps its source alive for as long as it is loaded; all section
//! views borrow from it.

use crate::consts::{MAGIC, MAGIC_LEN};
use crate::errors::{CatalogError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// Immutable, contiguous bytes that outlive every view taken from them.
pub trait ByteSource: Send + Sync {
    fn bytes(&self) -> &[u8];
}

impl ByteSource for Vec<u8> {
    fn bytes(&self) -> &[u8] { self }
}

impl ByteSource for Box<[u8]> {
    fn bytes(&self) -> &[u8] { self }
}

impl ByteSource for Arc<[u8]> {
    fn bytes(&self) -> &[u8] { self }
}

impl ByteSource for &'static [u8] {
    fn bytes(&self) -> &[u8] { self }
}

impl ByteSource for Mmap {
    fn bytes(&self) -> &[u8] { self }
}

/// Opens a catalog file: magic is checked before mapping, heap copy if mmap fails.
pub fn open_file(path: impl AsRef<Path>) -> Result<Box<dyn ByteSource>> {
    let path = path.as_ref();
    let mut f = File::open(path)?;
    let size = f.metadata()?.len();
    if size < MAGIC_LEN as u64 {
        return Err(CatalogError::BadMagic);
    }
    let mut head = [0u8; MAGIC_LEN];
    f.read_exact(&mut head)?;
    if &head != MAGIC {
        return Err(CatalogError::BadMagic);
    }

    // the file is opened read-only and never written through the map
    match unsafe { Mmap::map(&f) } {
        Ok(mmap) => {
            tracing::debug!(path = %path.display(), len = mmap.len(), "mapped catalog");
            Ok(Box::new(mmap))
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "mmap failed, reading into memory");
            f.seek(SeekFrom::Start(0))?;
            let mut buf = Vec::with_capacity(size as usize);
            f.read_to_end(&mut buf)?;
            Ok(Box::new(buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_rejects_short_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let short = dir.path().join("short.qm");
        std::fs::write(&short, &MAGIC[..8]).unwrap();
        assert!(matches!(open_file(&short), Err(CatalogError::BadMagic)));

        let foreign = dir.path().join("foreign.qm");
        std::fs::write(&foreign, [0u8; 32]).unwrap();
        assert!(matches!(open_file(&foreign), Err(CatalogError::BadMagic)));
    }

    #[test]
    fn open_maps_whole_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(MAGIC).unwrap();
        tmp.write_all(&[1, 2, 3]).unwrap();
        tmp.flush().unwrap();
        let src = open_file(tmp.path()).unwrap();
        assert_eq!(src.bytes().len(), MAGIC_LEN + 3);
        assert_eq!(&src.bytes()[MAGIC_LEN..], &[1, 2, 3]);
    }

    #[test]
    fn in_memory_sources() {
        let v: Vec<u8> = vec![1, 2];
        let a: Arc<[u8]> = Arc::from(vec![3u8, 4]);
        let s: &'static [u8] = b"xy";
        assert_eq!(ByteSource::bytes(&v), &[1, 2]);
        assert_eq!(ByteSource::bytes(&a), &[3, 4]);
        assert_eq!(ByteSource::bytes(&s), b"xy");
    }
}
