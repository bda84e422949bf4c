// crates/qm_core/src/consts.rs

pub const MAGIC_LEN: usize = 16;
pub const MAGIC: &[u8; MAGIC_LEN] = &[
    0x3c, 0xb8, 0x64, 0x18, 0xca, 0xef, 0x9c, 0x95,
    0xcd, 0x21, 0x1c, 0xbf, 0x60, 0xa1, 0xbd, 0xdd,
];

pub const DEFAULT_SUFFIX: &str = ".qm";
pub const DEFAULT_SEARCH_DELIMITERS: &str = "_.";

/// Hashes section entry: u32 hash + u32 message offset.
pub const HASH_ENTRY_SIZE: usize = 8;

/// Serialized null string in the dependency list.
pub const NULL_STRING_LEN: u32 = 0xFFFF_FFFF;

/// Top-level section kinds. `Unknown` is skipped so newer writers stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionTag {
    Contexts,
    Hashes,
    Messages,
    NumerusRules,
    Dependencies,
    Language,
    Unknown(u8),
}

impl SectionTag {
    pub fn as_u8(self) -> u8 {
        match self {
            SectionTag::Contexts => 0x2f,
            SectionTag::Hashes => 0x42,
            SectionTag::Messages => 0x69,
            SectionTag::NumerusRules => 0x88,
            SectionTag::Dependencies => 0x96,
            SectionTag::Language => 0xa7,
            SectionTag::Unknown(t) => t,
        }
    }
}

impl From<u8> for SectionTag {
    fn from(tag: u8) -> Self {
        match tag {
            0x2f => SectionTag::Contexts,
            0x42 => SectionTag::Hashes,
            0x69 => SectionTag::Messages,
            0x88 => SectionTag::NumerusRules,
            0x96 => SectionTag::Dependencies,
            0xa7 => SectionTag::Language,
            other => SectionTag::Unknown(other),
        }
    }
}

/// Field tags inside one message record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    End,
    SourceText16,
    Translation,
    Context16,
    Obsolete1,
    SourceText,
    Context,
    Comment,
    Obsolete2,
    Unknown(u8),
}

impl RecordTag {
    pub fn as_u8(self) -> u8 {
        match self {
            RecordTag::End => 1,
            RecordTag::SourceText16 => 2,
            RecordTag::Translation => 3,
            RecordTag::Context16 => 4,
            RecordTag::Obsolete1 => 5,
            RecordTag::SourceText => 6,
            RecordTag::Context => 7,
            RecordTag::Comment => 8,
            RecordTag::Obsolete2 => 9,
            RecordTag::Unknown(t) => t,
        }
    }
}

impl From<u8> for RecordTag {
    fn from(tag: u8) -> Self {
        match tag {
            1 => RecordTag::End,
            2 => RecordTag::SourceText16,
            3 => RecordTag::Translation,
            4 => RecordTag::Context16,
            5 => RecordTag::Obsolete1,
            6 => RecordTag::SourceText,
            7 => RecordTag::Context,
            8 => RecordTag::Comment,
            9 => RecordTag::Obsolete2,
            other => RecordTag::Unknown(other),
        }
    }
}

/// Fixed payload width of the `Obsolete1` record field.
pub const OBSOLETE1_WIDTH: usize = 4;
