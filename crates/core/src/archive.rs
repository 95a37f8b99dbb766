//! Read access to ZIP-based OOXML packages.

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened OOXML package.
///
/// Entry names are captured once, in archive order, when the package is
/// opened. Entries are opened through `&mut self`, so at most one entry
/// reader is alive at a time.
pub struct Package<R: Read + Seek> {
    name: String,
    archive: ZipArchive<R>,
    entries: Vec<String>,
}

impl Package<BufReader<File>> {
    /// Open a package from the filesystem.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            _ => Error::IoError(e),
        })?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }
}

impl<R: Read + Seek> Package<R> {
    /// Wrap any seekable reader as a package. `name` is used in error messages.
    pub fn from_reader(reader: R, name: &str) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).map_err(|e| Error::NotAnArchive {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index).map_err(|e| Error::NotAnArchive {
                name: name.to_string(),
                message: e.to_string(),
            })?;
            entries.push(entry.name().to_string());
        }

        log::debug!("Opened package {} with {} entries", name, entries.len());

        Ok(Self {
            name: name.to_string(),
            archive,
            entries,
        })
    }

    /// Name the package was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All entry names in archive order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entry names accepted by `matcher`, in archive order.
    pub fn find_entries<F>(&self, matcher: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        self.entries
            .iter()
            .filter(|name| matcher(name))
            .cloned()
            .collect()
    }

    /// Whether an entry with exactly this path exists.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|name| name == path)
    }

    /// Open an entry for sequential reading.
    pub fn open_entry(&mut self, path: &str) -> Result<ZipFile<'_>> {
        let package = &self.name;
        self.archive.by_name(path).map_err(|e| match e {
            ZipError::FileNotFound => Error::MissingPart {
                package: package.clone(),
                part: path.to_string(),
            },
            ZipError::Io(io) => Error::IoError(io),
            other => Error::NotAnArchive {
                name: package.clone(),
                message: format!("cannot open '{}': {}", path, other),
            },
        })
    }

    /// Read an entry's full contents.
    ///
    /// The size declared in the archive is not trusted for preallocation;
    /// corrupt headers can claim gigabytes.
    pub fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut entry = self.open_entry(path)?;
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        Ok(data)
    }
}
