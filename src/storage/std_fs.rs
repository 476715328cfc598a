//! [`FileSystem`] over a directory of the host file system.

use super::error::Error;
use super::{FileName, FileSystem, MAX_FILES, validate_name};
use heapless::Vec;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

/// Files stored flat in one directory.
#[derive(Debug, Clone)]
pub struct StdFileSystem {
    root: PathBuf,
}

impl StdFileSystem {
    /// Use `root` as the directory holding every file.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, name: &str) -> Result<PathBuf, Error> {
        let name = validate_name(name)?;
        Ok(self.root.join(name.as_str()))
    }
}

fn map_io(err: std::io::Error, fallback: Error) -> Error {
    match err.kind() {
        ErrorKind::NotFound => Error::NotFound,
        _ => fallback,
    }
}

impl FileSystem for StdFileSystem {
    fn create(&mut self, name: &str) -> Result<(), Error> {
        File::create(self.path(name)?).map_err(|e| map_io(e, Error::WriteError))?;
        Ok(())
    }

    fn append(&mut self, name: &str, bytes: &[u8]) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(self.path(name)?)
            .map_err(|e| map_io(e, Error::WriteError))?;
        file.write_all(bytes).map_err(|_| Error::WriteError)
    }

    fn read(&mut self, name: &str, offset: u32, bytes: &mut [u8]) -> Result<usize, Error> {
        let mut file = File::open(self.path(name)?).map_err(|e| map_io(e, Error::ReadError))?;
        file.seek(SeekFrom::Start(u64::from(offset)))
            .map_err(|_| Error::ReadError)?;

        let mut read = 0;
        while read < bytes.len() {
            match file.read(&mut bytes[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return Err(Error::ReadError),
            }
        }
        Ok(read)
    }

    fn size(&mut self, name: &str) -> Result<u32, Error> {
        let meta = fs::metadata(self.path(name)?).map_err(|e| map_io(e, Error::ReadError))?;
        if !meta.is_file() {
            return Err(Error::NotFound);
        }
        u32::try_from(meta.len()).map_err(|_| Error::OutOfBounds)
    }

    fn remove(&mut self, name: &str) -> Result<(), Error> {
        fs::remove_file(self.path(name)?).map_err(|e| map_io(e, Error::WriteError))
    }

    fn list(&mut self) -> Result<Vec<FileName, MAX_FILES>, Error> {
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|e| map_io(e, Error::ReadError))?;
        for entry in entries {
            let entry = entry.map_err(|_| Error::ReadError)?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            // names we could never open are not ours
            let Some(name) = entry.file_name().to_str().and_then(|n| validate_name(n).ok()) else {
                continue;
            };
            names.push(name).map_err(|_| Error::NoSpace)?;
        }
        Ok(names)
    }
}
