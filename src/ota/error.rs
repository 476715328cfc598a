//! Firmware update error kinds

use crate::network::application::http;
use crate::storage;

/// Represents an error that can occur during the update process.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The version manifest could not be downloaded.
    VersionFetch(http::Error),
    /// The version manifest is not `version,checksum,filesize`.
    Manifest,
    /// The firmware image could not be downloaded.
    ImageFetch(http::Error),
    /// The downloaded image does not match the manifest's size or checksum.
    Integrity,
    /// A local file could not be created, written or read.
    Storage(storage::error::Error),
    /// The new version could not be recorded locally.
    VersionWrite,
    /// The platform failed to activate the new image.
    Activation,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::VersionFetch(e) => write!(f, "version manifest download failed: {}", e),
            Error::Manifest => f.write_str("malformed version manifest"),
            Error::ImageFetch(e) => write!(f, "firmware download failed: {}", e),
            Error::Integrity => f.write_str("firmware image failed the integrity check"),
            Error::Storage(e) => write!(f, "storage error: {}", e),
            Error::VersionWrite => f.write_str("could not record the installed version"),
            Error::Activation => f.write_str("firmware activation failed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::VersionFetch(e) => defmt::write!(f, "VersionFetch({})", e),
            Error::Manifest => defmt::write!(f, "Manifest"),
            Error::ImageFetch(e) => defmt::write!(f, "ImageFetch({})", e),
            Error::Integrity => defmt::write!(f, "Integrity"),
            Error::Storage(e) => defmt::write!(f, "Storage({})", e),
            Error::VersionWrite => defmt::write!(f, "VersionWrite"),
            Error::Activation => defmt::write!(f, "Activation"),
        }
    }
}

impl From<storage::error::Error> for Error {
    fn from(e: storage::error::Error) -> Self {
        Error::Storage(e)
    }
}
