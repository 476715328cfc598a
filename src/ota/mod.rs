#![allow(missing_docs)]
#![deny(unsafe_code)]

//! # Firmware Update Agent
//!
//! This module checks a web server for a newer firmware image, downloads it
//! into the local file system, verifies it and hands over to the platform to
//! boot it. It works with any connector implementing the
//! [`crate::network::Connect`] trait and any [`FileSystem`].
//!
//! ## Server layout
//!
//! For a configured base URL and image name the server provides:
//!
//! * `<base>/<name>.txt`: the manifest, one line `version,checksum,filesize`
//!   in decimal.
//! * `<base>/<name>.bin`: the firmware image.
//!
//! ## Local files
//!
//! Names are derived from the first six characters of the image name, the
//! `root`:
//!
//! * `<root>.ver` holds the manifest line of the installed image.
//! * `<root>NN.bin` holds the image itself, `NN` being the version modulo 100
//!   on two digits.
//!
//! ## Design
//!
//! The agent is a small state machine:
//!
//! * `Idle`: no update in progress.
//! * `Checking`: fetching the manifest and comparing versions.
//! * `Downloading`: streaming the image into its file.
//! * `Verifying`: checking size and checksum of the stored image.
//! * `Installed`: the image and its version are in place; activation is up
//!   to the [`Platform`].
//!
//! Any failure returns the agent to `Idle`.

use crate::network::Connect;
use crate::network::application::http::data::FileSink;
use crate::network::application::http::url::URL_CAPACITY;
use crate::network::application::http::{self, Client};
use crate::storage::{FileName, FileSystem};
use core::fmt::Write as _;
use heapless::String;

/// Error kinds of the update process
pub mod error;

pub use error::Error;

/// Longest manifest line accepted
pub const MANIFEST_CAPACITY: usize = 50;

const ROOT_CHARS: usize = 6;

/// Whether a verified image is activated right away.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Reboot {
    /// Leave activation to the caller.
    #[default]
    Manual,
    /// Ask the [`Platform`] to reboot once the image is installed.
    Auto,
}

/// How the manifest's checksum is computed over the image bytes.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Checksum {
    /// Sum of all bytes, wrapping at 16 bits.
    #[default]
    Sum16,
    /// CRC-32 (IEEE).
    Crc32,
}

impl Checksum {
    /// Compute the checksum of `data` in one go.
    pub fn compute(self, data: &[u8]) -> u32 {
        let mut digest = Digest::new(self);
        digest.update(data);
        digest.finalize()
    }
}

enum Digest {
    Sum16(u16),
    Crc32(crc32fast::Hasher),
}

impl Digest {
    fn new(checksum: Checksum) -> Self {
        match checksum {
            Checksum::Sum16 => Digest::Sum16(0),
            Checksum::Crc32 => Digest::Crc32(crc32fast::Hasher::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Digest::Sum16(sum) => {
                for &b in data {
                    *sum = sum.wrapping_add(u16::from(b));
                }
            }
            Digest::Crc32(hasher) => hasher.update(data),
        }
    }

    fn finalize(self) -> u32 {
        match self {
            Digest::Sum16(sum) => u32::from(sum),
            Digest::Crc32(hasher) => hasher.finalize(),
        }
    }
}

/// Where and how to look for updates.
#[derive(Debug, Clone, Copy)]
pub struct Config<'a> {
    /// URL of the directory holding the manifest and the image, without a
    /// trailing slash
    pub base_url: &'a str,
    /// Image name, without extension
    pub name: &'a str,
    pub reboot: Reboot,
    pub checksum: Checksum,
    /// Timeout applied to every socket operation
    pub timeout_ms: u32,
}

impl<'a> Config<'a> {
    /// Defaults: manual reboot, 16-bit sum, the network's default timeout.
    pub fn new(base_url: &'a str, name: &'a str) -> Self {
        Self {
            base_url,
            name,
            reboot: Reboot::default(),
            checksum: Checksum::default(),
            timeout_ms: crate::network::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// The server's description of the latest image.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Manifest {
    pub version: u32,
    pub checksum: u32,
    /// Image size in bytes
    pub size: u32,
}

impl Manifest {
    /// Parse `version,checksum,filesize`; surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut fields = text.trim().split(',').map(|f| f.trim().parse::<u32>());
        let mut next = || fields.next().and_then(Result::ok).ok_or(Error::Manifest);
        let manifest = Manifest {
            version: next()?,
            checksum: next()?,
            size: next()?,
        };
        if fields.next().is_some() {
            return Err(Error::Manifest);
        }
        Ok(manifest)
    }
}

/// Represents the state of the update agent.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    Idle,
    Checking,
    Downloading,
    Verifying,
    Installed,
}

/// Result of a successful update check.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Outcome {
    /// The installed version matches the server's.
    UpToDate,
    /// A new image was downloaded, verified and recorded.
    Updated {
        version: u32,
        /// Some older images could not be removed
        stale_images_kept: bool,
    },
}

/// Platform-specific activation.
pub trait Platform {
    /// Reboot into the newly installed image.
    ///
    /// Only returns on failure, which should be reported as
    /// [`Error::Activation`].
    fn reboot(&mut self) -> Result<(), Error>;
}

/// The update agent.
///
/// Owns the file system holding images and version files, and the platform
/// used to activate a new image.
#[derive(Debug)]
pub struct OtaAgent<F: FileSystem, P: Platform> {
    state: State,
    fs: F,
    pub platform: P,
}

impl<F: FileSystem, P: Platform> OtaAgent<F, P> {
    /// Creates a new agent.
    pub fn new(fs: F, platform: P) -> Self {
        Self {
            state: State::Idle,
            fs,
            platform,
        }
    }

    /// Returns the current state of the agent.
    pub fn state(&self) -> State {
        self.state
    }

    /// The file system holding images and version files
    pub fn fs(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Version recorded in `<root>.ver`, `None` when nothing is installed.
    pub fn installed_version(&mut self, name: &str) -> Option<u32> {
        let file = version_file(name).ok()?;
        let mut line = [0u8; MANIFEST_CAPACITY];
        let n = self.fs.read(&file, 0, &mut line).ok()?;
        leading_number(&line[..n])
    }

    /// Check for an update and install it.
    pub fn run<N: Connect, const B: usize>(
        &mut self,
        client: &mut Client<N, B>,
        config: &Config<'_>,
    ) -> Result<Outcome, Error> {
        let result = self.update(client, config);
        match result {
            Ok(Outcome::Updated { .. }) => {}
            Ok(Outcome::UpToDate) => self.state = State::Idle,
            Err(e) => {
                error!("update failed: {}", e);
                self.state = State::Idle;
            }
        }
        result
    }

    fn update<N: Connect, const B: usize>(
        &mut self,
        client: &mut Client<N, B>,
        config: &Config<'_>,
    ) -> Result<Outcome, Error> {
        self.state = State::Checking;
        let version_file = version_file(config.name)?;
        let installed = self.installed_version(config.name);

        let mut text = [0u8; MANIFEST_CAPACITY];
        let url = resource_url(config, "txt").map_err(Error::VersionFetch)?;
        let n = client
            .get_text(&url, &mut text, MANIFEST_CAPACITY, config.timeout_ms)
            .map_err(Error::VersionFetch)?;
        let line = core::str::from_utf8(&text[..n]).map_err(|_| Error::Manifest)?;
        let manifest = Manifest::parse(line)?;
        info!(
            "installed version {}, server version {}",
            installed.unwrap_or(0),
            manifest.version
        );
        if installed == Some(manifest.version) {
            info!("firmware is up to date");
            return Ok(Outcome::UpToDate);
        }

        self.state = State::Downloading;
        let image = image_file(config.name, manifest.version)?;
        let url = resource_url(config, "bin").map_err(Error::ImageFetch)?;
        let downloaded = {
            let mut sink = FileSink::new(&mut self.fs, &image)?;
            match client.get(&url, &mut sink, config.timeout_ms) {
                Ok(()) => sink.error().map_or(Ok(()), |e| Err(Error::Storage(e))),
                Err(e) => Err(Error::ImageFetch(e)),
            }
        };
        if let Err(e) = downloaded {
            self.discard(&image);
            return Err(e);
        }

        self.state = State::Verifying;
        if let Err(e) = self.verify(&image, &manifest, config.checksum) {
            // a corrupt image must never be picked up later
            self.discard(&image);
            return Err(e);
        }

        let stale_images_kept = !self.remove_other_images(&image);
        if stale_images_kept {
            warn!("could not remove every old image");
        }

        let recorded = self.fs.create(&version_file).is_ok()
            && self.fs.append(&version_file, line.trim().as_bytes()).is_ok();
        if !recorded {
            return Err(Error::VersionWrite);
        }

        self.state = State::Installed;
        info!("firmware version {} installed", manifest.version);
        if config.reboot == Reboot::Auto {
            warn!("rebooting into the new firmware");
            self.platform.reboot()?;
        }
        Ok(Outcome::Updated {
            version: manifest.version,
            stale_images_kept,
        })
    }

    fn verify(&mut self, image: &str, manifest: &Manifest, checksum: Checksum) -> Result<(), Error> {
        let mut digest = Digest::new(checksum);
        let mut size: u32 = 0;
        let mut chunk = [0u8; 64];
        loop {
            let n = self.fs.read(image, size, &mut chunk)?;
            if n == 0 {
                break;
            }
            digest.update(&chunk[..n]);
            size += n as u32;
        }

        let computed = digest.finalize();
        debug!(
            "image size {} checksum {}, expected {} and {}",
            size, computed, manifest.size, manifest.checksum
        );
        if size != manifest.size || computed != manifest.checksum {
            return Err(Error::Integrity);
        }
        Ok(())
    }

    fn discard(&mut self, image: &str) {
        if let Err(e) = self.fs.remove(image) {
            warn!("could not remove image {}: {}", image, e);
        }
    }

    /// Delete every `.bin` file except `keep`; false if any removal failed.
    fn remove_other_images(&mut self, keep: &str) -> bool {
        let Ok(names) = self.fs.list() else {
            return false;
        };
        let mut all_removed = true;
        for name in names.iter().filter(|n| is_image(n) && !n.eq_ignore_ascii_case(keep)) {
            debug!("removing old image {}", name.as_str());
            if self.fs.remove(name).is_err() {
                all_removed = false;
            }
        }
        all_removed
    }
}

fn is_image(name: &str) -> bool {
    let len = name.len();
    len >= 4
        && name.is_char_boundary(len - 4)
        && name[len - 4..].eq_ignore_ascii_case(".bin")
}

fn root(name: &str) -> &str {
    match name.char_indices().nth(ROOT_CHARS) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

/// `<root>.ver`
pub fn version_file(name: &str) -> Result<FileName, Error> {
    let mut file = FileName::new();
    write!(file, "{}.ver", root(name))
        .map_err(|_| Error::Storage(crate::storage::error::Error::InvalidName))?;
    Ok(file)
}

/// `<root>NN.bin`, `NN` being the version modulo 100
pub fn image_file(name: &str, version: u32) -> Result<FileName, Error> {
    let mut file = FileName::new();
    write!(file, "{}{:02}.bin", root(name), version % 100)
        .map_err(|_| Error::Storage(crate::storage::error::Error::InvalidName))?;
    Ok(file)
}

fn resource_url(
    config: &Config<'_>,
    extension: &str,
) -> Result<String<URL_CAPACITY>, http::Error> {
    let mut url = String::new();
    write!(url, "{}/{}.{}", config.base_url, config.name, extension)
        .map_err(|_| http::Error::Parse)?;
    Ok(url)
}

fn leading_number(text: &[u8]) -> Option<u32> {
    let text = core::str::from_utf8(text).ok()?.trim_start();
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RamFileSystem;

    #[test]
    fn manifest_lines() {
        assert_eq!(
            Manifest::parse("12,34567,8192\r\n"),
            Ok(Manifest {
                version: 12,
                checksum: 34567,
                size: 8192
            })
        );
        assert_eq!(
            Manifest::parse(" 3, 4 ,5"),
            Ok(Manifest {
                version: 3,
                checksum: 4,
                size: 5
            })
        );
        for bad in ["", "1,2", "1,2,3,4", "a,b,c", "1,,3", "-1,2,3"] {
            assert_eq!(Manifest::parse(bad), Err(Error::Manifest), "{bad:?}");
        }
    }

    #[test]
    fn local_file_names() {
        assert_eq!(version_file("sensor-node").unwrap(), "sensor.ver");
        assert_eq!(image_file("sensor-node", 7).unwrap(), "sensor07.bin");
        assert_eq!(image_file("sensor-node", 123).unwrap(), "sensor23.bin");
        assert_eq!(version_file("fw").unwrap(), "fw.ver");
        assert_eq!(image_file("fw", 5).unwrap(), "fw05.bin");
    }

    #[test]
    fn image_suffix_is_case_insensitive() {
        assert!(is_image("fw05.bin"));
        assert!(is_image("FW04.BIN"));
        assert!(!is_image("fw.ver"));
        assert!(!is_image("bin"));
    }

    #[test]
    fn checksums() {
        assert_eq!(Checksum::Sum16.compute(b""), 0);
        assert_eq!(Checksum::Sum16.compute(&[0xFF; 258]), (0xFF * 258) % 0x1_0000);
        assert_eq!(Checksum::Crc32.compute(b"123456789"), 0xCBF4_3926);
    }

    struct NoReboot;

    impl Platform for NoReboot {
        fn reboot(&mut self) -> Result<(), Error> {
            Err(Error::Activation)
        }
    }

    #[test]
    fn installed_version_reads_leading_number() {
        let mut fs = RamFileSystem::<4, 64>::new();
        fs.create("sensor.ver").unwrap();
        fs.append("sensor.ver", b"42,1000,2048").unwrap();
        let mut agent = OtaAgent::new(fs, NoReboot);
        assert_eq!(agent.installed_version("sensor-node"), Some(42));
        assert_eq!(agent.installed_version("other"), None);
        assert_eq!(agent.state(), State::Idle);
    }
}
