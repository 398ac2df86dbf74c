//! Store-only ZIP container writer
//!
//! Builds a ZIP-compatible archive from an ordered list of entries using the
//! stored (uncompressed) method: one local file header + name + raw bytes per
//! entry, a central directory, and a single end record. All integers are
//! little-endian. The subset is deliberately minimal (no deflate, no zip64,
//! no extra fields, no multi-disk); limits that zip64 would lift are
//! reported as errors instead of wrapping silently.

use super::crc32;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

/// Version needed to extract / made by. 2.0 is the floor for any modern
/// unarchiver and the highest feature this writer emits.
const ZIP_VERSION: u16 = 20;

const LOCAL_FILE_HEADER_LEN: u32 = 30;
const CENTRAL_DIRECTORY_HEADER_LEN: u32 = 46;

/// Archive-related errors.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("duplicate archive path: {0}")]
    DuplicatePath(String),

    #[error("archive path too long: {0}")]
    PathTooLong(String),

    #[error("entry too large for a stored archive: {0}")]
    EntryTooLarge(String),

    #[error("too many entries for a single archive: {0}")]
    TooManyEntries(usize),

    #[error("archive exceeds the 4 GiB offset limit")]
    ArchiveTooLarge,
}

/// Where an entry's bytes come from.
#[derive(Debug, Clone)]
pub enum EntrySource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// One file to be written into an archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub source: EntrySource,

    /// Forward-slash path, used verbatim in the local header and the
    /// central directory record. Unique within one archive.
    pub archive_path: String,
}

impl ArchiveEntry {
    pub fn from_file(path: impl Into<PathBuf>, archive_path: impl Into<String>) -> Self {
        Self { source: EntrySource::File(path.into()), archive_path: archive_path.into() }
    }

    pub fn from_bytes(bytes: Vec<u8>, archive_path: impl Into<String>) -> Self {
        Self { source: EntrySource::Bytes(bytes), archive_path: archive_path.into() }
    }
}

struct CentralRecord {
    name: Vec<u8>,
    crc32: u32,
    size: u32,
    local_header_offset: u32,
}

/// Write a store-only archive at `destination` from `entries`, in input order.
pub fn create_archive(destination: &Path, entries: &[ArchiveEntry]) -> Result<(), ArchiveError> {
    if entries.len() > u16::MAX as usize {
        return Err(ArchiveError::TooManyEntries(entries.len()));
    }

    let mut seen_paths = HashSet::new();
    for entry in entries {
        if !seen_paths.insert(entry.archive_path.as_str()) {
            return Err(ArchiveError::DuplicatePath(entry.archive_path.clone()));
        }
    }

    let mut out = BufWriter::new(File::create(destination)?);
    let mut records: Vec<CentralRecord> = Vec::with_capacity(entries.len());
    let mut offset: u32 = 0;

    for entry in entries {
        let data: Cow<'_, [u8]> = match &entry.source {
            EntrySource::Bytes(bytes) => Cow::Borrowed(bytes.as_slice()),
            EntrySource::File(path) => Cow::Owned(fs::read(path)?),
        };
        let size = u32::try_from(data.len())
            .map_err(|_| ArchiveError::EntryTooLarge(entry.archive_path.clone()))?;
        let name = entry.archive_path.as_bytes().to_vec();
        if name.len() > u16::MAX as usize {
            return Err(ArchiveError::PathTooLong(entry.archive_path.clone()));
        }
        let crc = crc32::checksum(&data);

        write_local_file_header(&mut out, &name, crc, size)?;
        out.write_all(&name)?;
        out.write_all(&data)?;

        let name_len = name.len() as u32;
        records.push(CentralRecord { name, crc32: crc, size, local_header_offset: offset });

        offset = offset
            .checked_add(LOCAL_FILE_HEADER_LEN)
            .and_then(|n| n.checked_add(name_len))
            .and_then(|n| n.checked_add(size))
            .ok_or(ArchiveError::ArchiveTooLarge)?;
    }

    let central_directory_offset = offset;
    let mut central_directory_size: u32 = 0;

    for record in &records {
        write_central_directory_header(&mut out, record)?;
        out.write_all(&record.name)?;
        central_directory_size = central_directory_size
            .checked_add(CENTRAL_DIRECTORY_HEADER_LEN + record.name.len() as u32)
            .ok_or(ArchiveError::ArchiveTooLarge)?;
    }

    write_end_of_central_directory(
        &mut out,
        records.len() as u16,
        central_directory_size,
        central_directory_offset,
    )?;
    out.flush()?;

    tracing::debug!(
        destination = %destination.display(),
        entries = records.len(),
        "archive written"
    );
    Ok(())
}

/// Recursively enumerate regular files under `dir` as archive entries.
///
/// Archive paths are forward-slash paths relative to `dir`, with `prefix/`
/// prepended when given, sorted lexicographically for deterministic output.
pub fn all_files(dir: &Path, prefix: Option<&str>) -> io::Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    let base = prefix.unwrap_or("");
    collect_files(dir, base, &mut entries)?;
    entries.sort_by(|a, b| a.archive_path.cmp(&b.archive_path));
    Ok(entries)
}

fn collect_files(dir: &Path, base: &str, entries: &mut Vec<ArchiveEntry>) -> io::Result<()> {
    for dir_entry in fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        let file_type = dir_entry.file_type()?;
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        let archive_path = if base.is_empty() { name } else { format!("{base}/{name}") };

        if file_type.is_dir() {
            collect_files(&dir_entry.path(), &archive_path, entries)?;
        } else if file_type.is_file() {
            entries.push(ArchiveEntry::from_file(dir_entry.path(), archive_path));
        }
    }
    Ok(())
}

/// Total size in bytes of all regular files under `dir`, recursively.
pub fn directory_size(dir: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    for dir_entry in fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        let file_type = dir_entry.file_type()?;
        if file_type.is_dir() {
            total += directory_size(&dir_entry.path())?;
        } else if file_type.is_file() {
            total += dir_entry.metadata()?.len();
        }
    }
    Ok(total)
}

fn write_local_file_header<W: Write>(
    out: &mut W,
    name: &[u8],
    crc32: u32,
    size: u32,
) -> io::Result<()> {
    out.write_all(&LOCAL_FILE_HEADER_SIGNATURE.to_le_bytes())?;
    out.write_all(&ZIP_VERSION.to_le_bytes())?;
    out.write_all(&0u16.to_le_bytes())?; // general purpose flags
    out.write_all(&0u16.to_le_bytes())?; // method: stored
    out.write_all(&0u16.to_le_bytes())?; // mod time
    out.write_all(&0u16.to_le_bytes())?; // mod date
    out.write_all(&crc32.to_le_bytes())?;
    out.write_all(&size.to_le_bytes())?; // compressed
    out.write_all(&size.to_le_bytes())?; // uncompressed
    out.write_all(&(name.len() as u16).to_le_bytes())?;
    out.write_all(&0u16.to_le_bytes())?; // extra field length
    Ok(())
}

fn write_central_directory_header<W: Write>(out: &mut W, record: &CentralRecord) -> io::Result<()> {
    out.write_all(&CENTRAL_DIRECTORY_SIGNATURE.to_le_bytes())?;
    out.write_all(&ZIP_VERSION.to_le_bytes())?; // version made by
    out.write_all(&ZIP_VERSION.to_le_bytes())?; // version needed
    out.write_all(&0u16.to_le_bytes())?; // general purpose flags
    out.write_all(&0u16.to_le_bytes())?; // method: stored
    out.write_all(&0u16.to_le_bytes())?; // mod time
    out.write_all(&0u16.to_le_bytes())?; // mod date
    out.write_all(&record.crc32.to_le_bytes())?;
    out.write_all(&record.size.to_le_bytes())?; // compressed
    out.write_all(&record.size.to_le_bytes())?; // uncompressed
    out.write_all(&(record.name.len() as u16).to_le_bytes())?;
    out.write_all(&0u16.to_le_bytes())?; // extra field length
    out.write_all(&0u16.to_le_bytes())?; // comment length
    out.write_all(&0u16.to_le_bytes())?; // disk number start
    out.write_all(&0u16.to_le_bytes())?; // internal attributes
    out.write_all(&0u32.to_le_bytes())?; // external attributes
    out.write_all(&record.local_header_offset.to_le_bytes())?;
    Ok(())
}

fn write_end_of_central_directory<W: Write>(
    out: &mut W,
    entry_count: u16,
    central_directory_size: u32,
    central_directory_offset: u32,
) -> io::Result<()> {
    out.write_all(&END_OF_CENTRAL_DIRECTORY_SIGNATURE.to_le_bytes())?;
    out.write_all(&0u16.to_le_bytes())?; // this disk
    out.write_all(&0u16.to_le_bytes())?; // central directory disk
    out.write_all(&entry_count.to_le_bytes())?; // entries on this disk
    out.write_all(&entry_count.to_le_bytes())?; // entries total
    out.write_all(&central_directory_size.to_le_bytes())?;
    out.write_all(&central_directory_offset.to_le_bytes())?;
    out.write_all(&0u16.to_le_bytes())?; // comment length
    Ok(())
}
