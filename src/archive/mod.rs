//! Archive codec module
//!
//! Store-only ZIP-compatible container writing plus the directory helpers
//! used for size-aware archiving.

pub mod crc32;
mod zip;

pub use zip::{
    all_files, create_archive, directory_size, ArchiveEntry, ArchiveError, EntrySource,
};
