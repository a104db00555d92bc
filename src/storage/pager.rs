//! # Pager
//!
//! Owns the database file handle and translates 1-based page numbers into
//! seek offsets. The pager knows nothing about B-Trees or records; it
//! moves whole pages between disk and owned buffers and keeps count of
//! how many pages the file logically holds.
//!
//! ## Page Count vs File Length
//!
//! The logical page count starts as `floor(file_len / page_size)` and
//! grows by one per [`Pager::allocate_page`]. Allocation writes nothing:
//! a new page becomes real bytes only when [`Pager::write_page`] persists
//! it, so the logical count can briefly run ahead of the file. Reads of
//! such pages see zeroes, which is exactly what a freshly allocated page
//! is defined to contain. [`Pager::real_page_count`] reports the realized
//! count straight from file metadata when the distinction matters.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use eyre::{ensure, Result, WrapErr};
use tracing::{debug, trace};

use crate::config::{DEFAULT_PAGE_SIZE, FILE_HEADER_SIZE};

/// One page's worth of bytes, owned by whoever read or built it.
///
/// Nothing written here reaches the file until the buffer is handed to
/// [`Pager::write_page`]; dropping a `MemPage` discards its changes.
#[derive(Debug, Clone)]
pub struct MemPage {
    pub number: u32,
    pub data: Vec<u8>,
}

impl MemPage {
    pub fn new(number: u32, data: Vec<u8>) -> Self {
        Self { number, data }
    }

    /// A zero-filled page, the image of an allocated-but-unwritten page.
    pub fn zeroed(number: u32, page_size: usize) -> Self {
        Self {
            number,
            data: vec![0; page_size],
        }
    }
}

#[derive(Debug)]
pub struct Pager {
    file: File,
    path: PathBuf,
    page_size: usize,
    page_count: u32,
}

impl Pager {
    /// Opens `path` read-write, creating it if absent. The page size
    /// starts at [`DEFAULT_PAGE_SIZE`] until [`Self::set_page_size`]
    /// adjusts it (the B-Tree layer does so from the file header).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .wrap_err_with(|| format!("failed to open database file '{}'", path.display()))?;
        let len = file
            .metadata()
            .wrap_err("failed to read database file metadata")?
            .len();
        let page_count = (len / DEFAULT_PAGE_SIZE as u64) as u32;
        debug!(
            "opened '{}': {} bytes, {} pages of {}",
            path.display(),
            len,
            page_count,
            DEFAULT_PAGE_SIZE
        );
        Ok(Self {
            file,
            path: path.to_path_buf(),
            page_size: DEFAULT_PAGE_SIZE,
            page_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Logical page count, including pages allocated but not yet written.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Sets the page size and recomputes the page count from the current
    /// file length. No attempt is made to check the size against whatever
    /// was previously written to the file; the caller owns that decision.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        ensure!(page_size > 0, "page size must be nonzero");
        self.page_size = page_size;
        self.page_count = (self.file_len()? / page_size as u64) as u32;
        Ok(())
    }

    /// Returns the first 100 bytes of the file verbatim.
    pub fn read_header(&mut self) -> Result<[u8; FILE_HEADER_SIZE]> {
        let len = self.file_len()?;
        ensure!(
            len >= FILE_HEADER_SIZE as u64,
            "file has no header: {} bytes, need {}",
            len,
            FILE_HEADER_SIZE
        );
        let mut buf = [0u8; FILE_HEADER_SIZE];
        self.file
            .seek(SeekFrom::Start(0))
            .wrap_err("failed to seek to file header")?;
        self.file
            .read_exact(&mut buf)
            .wrap_err("failed to read file header")?;
        Ok(buf)
    }

    /// Grows the logical page count by one and returns the new page's
    /// number. Writes nothing; the page materializes on first write.
    pub fn allocate_page(&mut self) -> u32 {
        self.page_count += 1;
        debug!("allocated page {}", self.page_count);
        self.page_count
    }

    /// Reads page `number` into a fresh owned buffer.
    ///
    /// Bytes the file does not hold yet (an allocated page, or the tail
    /// of a partially written last page) come back as zeroes.
    pub fn read_page(&mut self, number: u32) -> Result<MemPage> {
        ensure!(
            number >= 1 && number <= self.page_count,
            "page {} out of bounds (file has {} pages)",
            number,
            self.page_count
        );
        let mut page = MemPage::zeroed(number, self.page_size);
        let offset = (number as u64 - 1) * self.page_size as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .wrap_err_with(|| format!("failed to seek to page {}", number))?;
        let mut filled = 0;
        while filled < self.page_size {
            match self.file.read(&mut page.data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(e).wrap_err_with(|| format!("failed to read page {}", number))
                }
            }
        }
        trace!(
            "read page {} ({} of {} bytes on disk)",
            number,
            filled,
            self.page_size
        );
        Ok(page)
    }

    /// Writes a page buffer back to its slot in the file.
    pub fn write_page(&mut self, page: &MemPage) -> Result<()> {
        ensure!(
            page.number >= 1 && page.number <= self.page_count,
            "page {} out of bounds (file has {} pages)",
            page.number,
            self.page_count
        );
        ensure!(
            page.data.len() == self.page_size,
            "page buffer is {} bytes but the page size is {}",
            page.data.len(),
            self.page_size
        );
        let offset = (page.number as u64 - 1) * self.page_size as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .wrap_err_with(|| format!("failed to seek to page {}", page.number))?;
        self.file
            .write_all(&page.data)
            .wrap_err_with(|| format!("failed to write page {}", page.number))?;
        trace!("wrote page {}", page.number);
        Ok(())
    }

    /// Page count realized on disk: `floor(file_len / page_size)`,
    /// ignoring allocations that have not been written yet.
    pub fn real_page_count(&self) -> Result<u32> {
        Ok((self.file_len()? / self.page_size as u64) as u32)
    }

    /// Flushes file contents and metadata to the OS.
    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .wrap_err_with(|| format!("failed to sync '{}'", self.path.display()))
    }

    /// Flushes and releases the pager.
    pub fn close(mut self) -> Result<()> {
        self.sync()
    }

    /// Current backing file length in bytes.
    pub fn file_len(&self) -> Result<u64> {
        Ok(self
            .file
            .metadata()
            .wrap_err("failed to read database file metadata")?
            .len())
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        let _ = self.file.sync_all();
    }
}
