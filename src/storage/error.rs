//! Common error types for storage operations

/// A common error type for storage operations.
///
/// This enum defines a set of common errors that can occur when working with
/// storage devices and file systems. It is designed to be simple and portable
/// for `no_std` environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on an address that is out of bounds.
    OutOfBounds,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// An error occurred during an erase operation.
    EraseError,
    /// An operation was attempted on a device that was not initialized.
    NotInitialized,
    /// The named file does not exist.
    NotFound,
    /// The device or file table has no room left.
    NoSpace,
    /// The file name is empty, too long or contains a path separator.
    InvalidName,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Error::OutOfBounds => "out of bounds",
            Error::WriteError => "write failed",
            Error::ReadError => "read failed",
            Error::EraseError => "erase failed",
            Error::NotInitialized => "not initialized",
            Error::NotFound => "file not found",
            Error::NoSpace => "no space left",
            Error::InvalidName => "invalid file name",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::OutOfBounds => defmt::write!(f, "OutOfBounds"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::EraseError => defmt::write!(f, "EraseError"),
            Error::NotInitialized => defmt::write!(f, "NotInitialized"),
            Error::NotFound => defmt::write!(f, "NotFound"),
            Error::NoSpace => defmt::write!(f, "NoSpace"),
            Error::InvalidName => defmt::write!(f, "InvalidName"),
        }
    }
}
