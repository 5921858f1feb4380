//! File-backed sequences.
//!
//! - [`Lines`] ([`read_lines`]): one element per line of a file.
//! - [`FileScope`] ([`with_file`]): a single element, the open file itself.
//!
//! Both open the file anew on every run and close it before the run returns, on every
//! exit path. The file is opened through an [`Open`] implementation, [`StdFs`] by
//! default.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use lazyseq_common::{Error, Result, verify_arg};

use crate::{
    control::Control,
    resource::{Phase, Release, ResourceGuard},
    sequence::Sequence,
};

/// Maximum line length accepted by default, in bytes (terminator excluded).
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Default read buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Opens a path for reading.
pub trait Open {
    type Handle: Read + Release;

    fn open(&self, path: &Path) -> io::Result<Self::Handle>;
}

/// Opens files on the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFs;

impl Open for StdFs {
    type Handle = File;

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }
}

#[derive(Clone, Debug)]
pub struct LineOptions {
    /// Lines longer than this (terminator excluded) end the run with
    /// [`ErrorKind::LineTooLong`](lazyseq_common::ErrorKind::LineTooLong).
    pub max_line_len: usize,
    /// Capacity of the read buffer placed over the file.
    pub buffer_capacity: usize,
}

impl Default for LineOptions {
    fn default() -> Self {
        LineOptions {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl LineOptions {
    pub fn validate(&self) -> Result<()> {
        verify_arg!(max_line_len, self.max_line_len > 0);
        verify_arg!(buffer_capacity, self.buffer_capacity > 0);
        Ok(())
    }
}

/// Lines of a file, one element per line, in file order.
///
/// Lines are split on `\n`; a `\r` right before it is dropped as well. A final line
/// without a terminator is still a line, while an empty file produces no element.
///
/// Errors end the run:
/// - the file cannot be opened: a single `Err` with
///   [`ErrorKind::Open`](lazyseq_common::ErrorKind::Open), nothing else;
/// - reading fails, or a line exceeds [`LineOptions::max_line_len`]: the lines read
///   so far, then a single `Err`.
pub struct Lines<O = StdFs> {
    path: PathBuf,
    opener: O,
    options: LineOptions,
    phase: Phase,
}

/// Lines of the file at `path`.
pub fn read_lines(path: impl AsRef<Path>) -> Lines<StdFs> {
    Lines::with_opener(path, StdFs)
}

impl<O: Open> Lines<O> {
    pub fn with_opener(path: impl AsRef<Path>, opener: O) -> Lines<O> {
        Lines {
            path: path.as_ref().to_path_buf(),
            opener,
            options: LineOptions::default(),
            phase: Phase::NotStarted,
        }
    }

    pub fn with_options(mut self, options: LineOptions) -> Result<Lines<O>> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Phase reached by the most recent run.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs the sequence, lending each line to `consumer` without copying it.
    ///
    /// The slice is only valid during the callback.
    pub fn for_each_line<F>(&mut self, mut consumer: F)
    where
        F: FnMut(Result<&[u8]>) -> Control,
    {
        self.phase = Phase::Acquiring;
        let file = match self.opener.open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                self.phase = Phase::AcquireFailed;
                let _ = consumer(Err(Error::open(&self.path, e)));
                return;
            }
        };

        let reader = BufReader::with_capacity(self.options.buffer_capacity, file);
        let mut guard = ResourceGuard::new(self.path.display().to_string(), reader);
        self.phase = Phase::Streaming;
        let phase = scan_lines(
            guard.handle_mut(),
            &self.path,
            self.options.max_line_len,
            &mut consumer,
        );
        self.phase = phase;
        guard.finish(phase);
    }
}

impl<O: Open> Sequence for Lines<O> {
    type Item = Result<Vec<u8>>;

    fn iterate<F>(&mut self, mut consumer: F)
    where
        F: FnMut(Self::Item) -> Control,
    {
        self.for_each_line(|line| consumer(line.map(<[u8]>::to_vec)));
    }
}

enum LineRead {
    Line,
    TooLong,
    Eof,
}

fn scan_lines<R, F>(reader: &mut R, path: &Path, max_line_len: usize, consumer: &mut F) -> Phase
where
    R: BufRead,
    F: FnMut(Result<&[u8]>) -> Control,
{
    let mut line = Vec::new();
    let mut line_no = 0u64;
    loop {
        line.clear();
        line_no += 1;
        match read_line(reader, &mut line, max_line_len) {
            Ok(LineRead::Line) => {
                let phase = Phase::after(consumer(Ok(&line)));
                if phase.is_terminal() {
                    return phase;
                }
            }
            Ok(LineRead::Eof) => return Phase::Exhausted,
            Ok(LineRead::TooLong) => {
                let _ = consumer(Err(Error::line_too_long(path, line_no, max_line_len)));
                return Phase::Errored;
            }
            Err(e) => {
                let _ = consumer(Err(Error::read(path, line_no, e)));
                return Phase::Errored;
            }
        }
    }
}

/// Reads one line into `line`, without its terminator.
fn read_line<R: BufRead>(
    reader: &mut R,
    line: &mut Vec<u8>,
    max_line_len: usize,
) -> io::Result<LineRead> {
    loop {
        let (found, used) = {
            let available = match reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                if line.is_empty() {
                    return Ok(LineRead::Eof);
                }
                break;
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    line.extend_from_slice(&available[..pos]);
                    (true, pos + 1)
                }
                None => {
                    line.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);
        if found {
            break;
        }
        // One extra byte leaves room for a `\r` that is stripped later.
        if line.len() > max_line_len.saturating_add(1) {
            return Ok(LineRead::TooLong);
        }
    }

    if line.last() == Some(&b'\r') {
        line.pop();
    }
    if line.len() > max_line_len {
        return Ok(LineRead::TooLong);
    }
    Ok(LineRead::Line)
}

/// A single-element sequence lending the open file to the consumer.
///
/// The handle is closed as soon as the callback returns, so it cannot be kept
/// beyond it. If the file cannot be opened, the consumer receives a single `Err`
/// with [`ErrorKind::Open`](lazyseq_common::ErrorKind::Open).
pub struct FileScope<O = StdFs> {
    path: PathBuf,
    opener: O,
    phase: Phase,
}

/// The file at `path`, lent to the consumer for the duration of one callback.
pub fn with_file(path: impl AsRef<Path>) -> FileScope<StdFs> {
    FileScope::with_opener(path, StdFs)
}

impl<O: Open> FileScope<O> {
    pub fn with_opener(path: impl AsRef<Path>, opener: O) -> FileScope<O> {
        FileScope {
            path: path.as_ref().to_path_buf(),
            opener,
            phase: Phase::NotStarted,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Phase reached by the most recent run.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn iterate<F>(&mut self, consumer: F)
    where
        F: FnOnce(Result<&mut O::Handle>) -> Control,
    {
        self.phase = Phase::Acquiring;
        let file = match self.opener.open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                self.phase = Phase::AcquireFailed;
                let _ = consumer(Err(Error::open(&self.path, e)));
                return;
            }
        };

        let mut guard = ResourceGuard::new(self.path.display().to_string(), file);
        self.phase = Phase::Streaming;
        let phase = match consumer(Ok(guard.handle_mut())) {
            Control::Continue => Phase::Exhausted,
            Control::Stop => Phase::StoppedByConsumer,
        };
        self.phase = phase;
        guard.finish(phase);
    }
}
