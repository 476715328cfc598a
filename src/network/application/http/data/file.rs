use super::DataIn;
use crate::storage::error::Error;
use crate::storage::{BlockingErase, FileName, FileSystem, Region, Storage, validate_name};

/// Streams a response body into a named file.
///
/// The file is created (or truncated) when the sink is built and again on
/// every [`DataIn::reset`]. Once the declared `Content-Length` has been
/// written, or the terminating chunk of a chunked body arrives, the sink
/// closes itself and drops any further bytes.
#[derive(Debug)]
pub struct FileSink<'a, F: FileSystem> {
    fs: &'a mut F,
    name: FileName,
    len: usize,
    chunked: bool,
    written: usize,
    open: bool,
    error: Option<Error>,
}

impl<'a, F: FileSystem> FileSink<'a, F> {
    /// Create `name` on `fs` and write the body into it.
    pub fn new(fs: &'a mut F, name: &str) -> Result<Self, Error> {
        let name = validate_name(name)?;
        fs.create(&name)?;
        Ok(Self {
            fs,
            name,
            len: 0,
            chunked: false,
            written: 0,
            open: true,
            error: None,
        })
    }

    /// Name of the target file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bytes written to the file so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Whether the sink still accepts bytes
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The storage error that closed the sink, if any
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Stop accepting bytes.
    pub fn close(&mut self) {
        self.open = false;
    }

    fn fail(&mut self, error: Error) {
        warn!("file sink closed: {}", error);
        self.error = Some(error);
        self.open = false;
    }
}

impl<F: FileSystem> DataIn for FileSink<'_, F> {
    fn reset(&mut self) {
        self.len = 0;
        self.chunked = false;
        self.written = 0;
        self.error = None;
        self.open = true;
        if let Err(e) = self.fs.create(&self.name) {
            self.fail(e);
        }
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        if !self.open {
            return 0;
        }
        if buf.is_empty() {
            if self.chunked {
                self.close();
            }
            return 0;
        }
        if let Err(e) = self.fs.append(&self.name, buf) {
            self.fail(e);
            return 0;
        }
        self.written += buf.len();
        if !self.chunked && self.written >= self.len {
            self.close();
        }
        buf.len()
    }

    fn set_len(&mut self, len: usize) {
        self.len = len;
        if !self.chunked && len == 0 {
            self.close();
        }
    }

    fn set_chunked(&mut self, chunked: bool) {
        self.chunked = chunked;
    }

    fn set_content_type(&mut self, _content_type: &str) {}
}

/// Streams a response body into a raw storage region, e.g. a flash
/// partition holding a firmware image.
///
/// The region is erased on [`DataIn::reset`]; bytes are then written
/// sequentially from its start. Bytes past the region's end are dropped.
#[derive(Debug)]
pub struct RegionSink<'a, S: BlockingErase, R: Region> {
    storage: &'a mut S,
    region: R,
    len: usize,
    chunked: bool,
    written: u32,
    open: bool,
    failed: bool,
}

impl<'a, S: BlockingErase, R: Region> RegionSink<'a, S, R> {
    /// Write into `region` of `storage`
    pub fn new(storage: &'a mut S, region: R) -> Self {
        Self {
            storage,
            region,
            len: 0,
            chunked: false,
            written: 0,
            open: false,
            failed: false,
        }
    }

    /// Bytes written into the region so far
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Whether the sink still accepts bytes
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether an erase or write failed
    pub fn failed(&self) -> bool {
        self.failed
    }

    fn fail(&mut self) {
        warn!("region sink closed after {} bytes", self.written);
        self.failed = true;
        self.open = false;
    }
}

impl<S: Storage + BlockingErase, R: Region> DataIn for RegionSink<'_, S, R> {
    fn reset(&mut self) {
        self.len = 0;
        self.chunked = false;
        self.written = 0;
        self.failed = false;
        self.open = true;
        if self
            .storage
            .erase(self.region.start(), self.region.end())
            .is_err()
        {
            self.fail();
        }
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        if !self.open {
            return 0;
        }
        if buf.is_empty() {
            if self.chunked {
                self.open = false;
            }
            return 0;
        }

        let room = (self.region.len() - self.written) as usize;
        let n = buf.len().min(room);
        let offset = self.region.start() + self.written;
        if self.storage.write(offset, &buf[..n]).is_err() {
            self.fail();
            return 0;
        }
        self.written += n as u32;

        let complete = !self.chunked && self.written as usize >= self.len;
        if complete || self.written == self.region.len() {
            self.open = false;
        }
        n
    }

    fn set_len(&mut self, len: usize) {
        self.len = len;
        if !self.chunked && len == 0 {
            self.open = false;
        }
    }

    fn set_chunked(&mut self, chunked: bool) {
        self.chunked = chunked;
    }

    fn set_content_type(&mut self, _content_type: &str) {}
}
