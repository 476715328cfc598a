//! # Storage abstraction layer for embedded systems
//!
//! This module provides the persistence traits used by the HTTP file sinks
//! and the firmware update agent.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────┐    ┌─────────────────────┐
//! │  HTTP file sinks /  │    │  Firmware update    │
//! │  application code   │    │  agent              │
//! └─────────────────────┘    └─────────────────────┘
//!           │                          │
//!           ▼                          ▼
//! ┌───────────────────────────────────────────────────┐
//! │  FileSystem (named files)  │  Storage (raw bytes) │
//! └───────────────────────────────────────────────────┘
//!           │                          │
//!           ▼                          ▼
//! ┌─────────────────────┐    ┌─────────────────────┐
//! │ RAM / std::fs / FAT │    │  Flash / EEPROM     │
//! └─────────────────────┘    └─────────────────────┘
//! ```
//!
//! # Core Traits
//!
//! - [`ReadStorage`]: Read data from a block device
//! - [`Storage`]: Read and write operations
//! - [`BlockingErase`]: Synchronous erase operations
//! - [`Region`]: Memory region management
//! - [`FileSystem`]: Named files that can be created, appended, read, listed
//!   and removed
//!
//! # Usage Examples
//!
//! ```rust
//! use iot_http::storage::{FileSystem, RamFileSystem};
//!
//! let mut fs = RamFileSystem::<4, 64>::new();
//! fs.create("device.ver").unwrap();
//! fs.append("device.ver", b"3,1234,8192").unwrap();
//!
//! let mut line = [0u8; 16];
//! let n = fs.read("device.ver", 0, &mut line).unwrap();
//! assert_eq!(&line[..n], b"3,1234,8192");
//! ```

#![allow(missing_docs)]
#![deny(unsafe_code)]

use heapless::{String, Vec};

/// Common error types for storage operations
pub mod error;

#[cfg(feature = "std")]
mod std_fs;

#[cfg(feature = "std")]
pub use std_fs::StdFileSystem;


use error::Error;

/// Re-exports of common traits for convenient importing
pub mod prelude {
    pub use super::{BlockingErase, FileSystem, Partition, ReadStorage, Region, Storage};
}

/// Maximum file name length in bytes
pub const FILE_NAME_CAPACITY: usize = 32;
/// Maximum number of names returned by [`FileSystem::list`]
pub const MAX_FILES: usize = 16;

/// A bounded file name
pub type FileName = String<FILE_NAME_CAPACITY>;

/// A contiguous memory region with start and end boundaries.
///
/// # Examples
///
/// ```rust
/// use iot_http::storage::Region;
///
/// struct FlashRegion {
///     start: u32,
///     size: u32,
/// }
///
/// impl Region for FlashRegion {
///     fn start(&self) -> u32 {
///         self.start
///     }
///
///     fn end(&self) -> u32 {
///         self.start + self.size
///     }
/// }
///
/// let image = FlashRegion { start: 0x4000, size: 0x1C000 };
/// assert!(image.contains(0x5000));
/// assert!(!image.contains(0x2000));
/// assert_eq!(image.len(), 0x1C000);
/// ```
pub trait Region {
    /// Start address of the region (inclusive).
    fn start(&self) -> u32;

    /// End address of the region (exclusive).
    fn end(&self) -> u32;

    /// Check if an address is contained within this region.
    fn contains(&self, address: u32) -> bool {
        (address >= self.start()) && (address < self.end())
    }

    /// Size of the region in bytes.
    fn len(&self) -> u32 {
        self.end().saturating_sub(self.start())
    }

    /// Whether the region spans no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fixed `start..end` address range on a block device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// First address (inclusive)
    pub start: u32,
    /// One past the last address
    pub end: u32,
}

impl Region for Partition {
    fn start(&self) -> u32 {
        self.start
    }

    fn end(&self) -> u32 {
        self.end
    }
}

// ========================
// Block Device Traits
// ========================

/// Trait for reading data from storage devices.
pub trait ReadStorage {
    /// Associated error type for read operations
    type Error: core::fmt::Debug;

    /// Read data from the storage device.
    ///
    /// Reads data from the specified offset into the provided buffer.
    /// The entire buffer will be filled unless an error occurs.
    ///
    /// # Errors
    ///
    /// - `OutOfBounds` if offset + buffer length exceeds device capacity
    /// - `ReadError` if hardware read operation fails
    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error>;

    /// Get the total capacity of the storage device in bytes.
    fn capacity(&self) -> usize;
}

/// Trait for storage devices that support both read and write operations.
pub trait Storage: ReadStorage {
    /// Write data to the storage device.
    ///
    /// Whether already-written locations can be overwritten without an
    /// erase depends on the storage technology.
    ///
    /// # Errors
    ///
    /// - `OutOfBounds` if offset + data length exceeds device capacity
    /// - `WriteError` if hardware write operation fails
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Trait for storage devices that support erase operations.
///
/// After erasing, the region reads back as `0xFF` bytes (flash convention).
pub trait BlockingErase: Storage {
    /// Erase `from..to`.
    ///
    /// # Errors
    ///
    /// - `OutOfBounds` if the address range is invalid
    /// - `EraseError` if the hardware erase operation fails
    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error>;
}

// ========================
// File System Trait
// ========================

/// Named, append-only persistent objects.
///
/// This is the minimal surface the HTTP file sink and the firmware update
/// agent need: whole files are rewritten, never patched in place.
pub trait FileSystem {
    /// Create an empty file, truncating it if it exists.
    fn create(&mut self, name: &str) -> Result<(), Error>;

    /// Append `bytes` to an existing file.
    fn append(&mut self, name: &str, bytes: &[u8]) -> Result<(), Error>;

    /// Read from `offset` into `bytes`; returns the number of bytes read,
    /// `0` at the end of the file.
    fn read(&mut self, name: &str, offset: u32, bytes: &mut [u8]) -> Result<usize, Error>;

    /// Size of a file in bytes.
    fn size(&mut self, name: &str) -> Result<u32, Error>;

    /// Delete a file.
    fn remove(&mut self, name: &str) -> Result<(), Error>;

    /// Names of all files, at most [`MAX_FILES`].
    fn list(&mut self) -> Result<Vec<FileName, MAX_FILES>, Error>;

    /// Whether a file exists.
    fn exists(&mut self, name: &str) -> bool {
        self.size(name).is_ok()
    }
}

/// Reject names that cannot be stored or that would escape a directory.
pub(crate) fn validate_name(name: &str) -> Result<FileName, Error> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::InvalidName);
    }
    FileName::try_from(name).map_err(|_| Error::InvalidName)
}

#[derive(Debug)]
struct RamFile<const BYTES: usize> {
    name: FileName,
    data: Vec<u8, BYTES>,
}

/// A RAM-backed [`FileSystem`] holding up to `FILES` files of `BYTES` bytes each.
///
/// Useful on hosts without persistent storage and as a test double.
#[derive(Debug)]
pub struct RamFileSystem<const FILES: usize, const BYTES: usize> {
    files: Vec<RamFile<BYTES>, FILES>,
}

impl<const FILES: usize, const BYTES: usize> RamFileSystem<FILES, BYTES> {
    /// An empty file system
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name.as_str() == name)
    }

    fn file_mut(&mut self, name: &str) -> Result<&mut RamFile<BYTES>, Error> {
        let index = self.find(name).ok_or(Error::NotFound)?;
        Ok(&mut self.files[index])
    }

    /// The full contents of a file, for inspection.
    pub fn contents(&self, name: &str) -> Option<&[u8]> {
        self.find(name).map(|index| self.files[index].data.as_slice())
    }
}

impl<const FILES: usize, const BYTES: usize> Default for RamFileSystem<FILES, BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const FILES: usize, const BYTES: usize> FileSystem for RamFileSystem<FILES, BYTES> {
    fn create(&mut self, name: &str) -> Result<(), Error> {
        let name = validate_name(name)?;
        match self.find(&name) {
            Some(index) => self.files[index].data.clear(),
            None => self
                .files
                .push(RamFile {
                    name,
                    data: Vec::new(),
                })
                .map_err(|_| Error::NoSpace)?,
        }
        Ok(())
    }

    fn append(&mut self, name: &str, bytes: &[u8]) -> Result<(), Error> {
        self.file_mut(name)?
            .data
            .extend_from_slice(bytes)
            .map_err(|_| Error::NoSpace)
    }

    fn read(&mut self, name: &str, offset: u32, bytes: &mut [u8]) -> Result<usize, Error> {
        let file = self.file_mut(name)?;
        let start = (offset as usize).min(file.data.len());
        let rest = &file.data[start..];
        let n = rest.len().min(bytes.len());
        bytes[..n].copy_from_slice(&rest[..n]);
        Ok(n)
    }

    fn size(&mut self, name: &str) -> Result<u32, Error> {
        Ok(self.file_mut(name)?.data.len() as u32)
    }

    fn remove(&mut self, name: &str) -> Result<(), Error> {
        let index = self.find(name).ok_or(Error::NotFound)?;
        self.files.swap_remove(index);
        Ok(())
    }

    fn list(&mut self) -> Result<Vec<FileName, MAX_FILES>, Error> {
        let mut names = Vec::new();
        for file in &self.files {
            names.push(file.name.clone()).map_err(|_| Error::NoSpace)?;
        }
        Ok(names)
    }
}
