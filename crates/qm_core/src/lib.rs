pub mod consts;
pub mod errors;
pub mod utils;
pub mod source;
pub mod format;
pub mod plural;
pub mod message;
pub mod resolver;
pub mod catalog;
pub mod catalog_set;
pub mod locate;
pub mod writer;
pub mod manifest;

pub use catalog::{Catalog, CatalogStats};
pub use catalog_set::CatalogSet;
pub use errors::{CatalogError, Result};
pub use locate::LoadOptions;
pub use manifest::{CatalogManifest, MessageEntry};
pub use message::MessageRecord;
pub use plural::PluralRules;
pub use resolver::HashEntry;
pub use source::ByteSource;
pub use utils::{elf_hash, message_hash};
pub use writer::CatalogWriter;
