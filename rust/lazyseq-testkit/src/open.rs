//! In-memory files with release probes.

use std::{
    collections::HashMap,
    io::{self, Cursor, Read},
    path::{Path, PathBuf},
    sync::Arc,
};

use lazyseq::{fs::Open, resource::Release};

use crate::Counter;

/// An [`Open`] implementation serving files from memory.
///
/// Every successful open and every release is counted, so tests can check that a
/// sequence gives back each handle exactly once. A file can be configured to fail
/// reads after a given number of bytes.
#[derive(Clone, Debug, Default)]
pub struct MemoryOpen {
    files: Arc<HashMap<PathBuf, MemoryFile>>,
    opens: Counter,
    releases: Counter,
    bytes_read: Counter,
}

#[derive(Clone, Debug)]
struct MemoryFile {
    content: Arc<Vec<u8>>,
    fail_after: Option<usize>,
}

impl MemoryOpen {
    pub fn new() -> MemoryOpen {
        MemoryOpen::default()
    }

    /// Adds a file with the given content.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> MemoryOpen {
        self.insert(path.as_ref(), content.into(), None)
    }

    /// Adds a file whose reads fail once `fail_after` bytes have been delivered.
    pub fn with_faulty_file(
        self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        fail_after: usize,
    ) -> MemoryOpen {
        self.insert(path.as_ref(), content.into(), Some(fail_after))
    }

    fn insert(mut self, path: &Path, content: Vec<u8>, fail_after: Option<usize>) -> MemoryOpen {
        let mut files = (*self.files).clone();
        files.insert(
            path.to_path_buf(),
            MemoryFile {
                content: Arc::new(content),
                fail_after,
            },
        );
        self.files = Arc::new(files);
        self
    }

    /// Number of successful opens.
    pub fn opens(&self) -> usize {
        self.opens.get()
    }

    /// Number of released handles.
    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.opens() - self.releases()
    }

    /// Total number of bytes handed out by reads.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read.get()
    }
}

impl Open for MemoryOpen {
    type Handle = MemoryHandle;

    fn open(&self, path: &Path) -> io::Result<MemoryHandle> {
        let file = self
            .files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))?;
        self.opens.incr();
        Ok(MemoryHandle {
            data: Cursor::new(file.content.to_vec()),
            fail_after: file.fail_after,
            releases: self.releases.clone(),
            bytes_read: self.bytes_read.clone(),
        })
    }
}

/// Handle returned by [`MemoryOpen`].
#[derive(Debug)]
pub struct MemoryHandle {
    data: Cursor<Vec<u8>>,
    fail_after: Option<usize>,
    releases: Counter,
    bytes_read: Counter,
}

impl Read for MemoryHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let position = self.data.position() as usize;
        let buf = match self.fail_after {
            Some(limit) if position >= limit => {
                return Err(io::Error::other("injected read fault"));
            }
            Some(limit) => {
                let len = buf.len().min(limit - position);
                &mut buf[..len]
            }
            None => buf,
        };
        let n = self.data.read(buf)?;
        self.bytes_read.add(n);
        Ok(n)
    }
}

impl Release for MemoryHandle {
    fn release(self) {
        self.releases.incr();
    }
}
