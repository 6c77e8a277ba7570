//! Local filesystem stream implementation

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Stream;

/// A [`Stream`] over a file on the local filesystem.
///
/// Three modes mirror how container files are used: [`FileStream::open`]
/// for reading, [`FileStream::create`] for writing a new file and
/// [`FileStream::open_append`] for reading the header of an existing file
/// and then appending to it.
#[derive(Debug)]
pub struct FileStream {
    /// The file handle; `None` once closed
    file: Option<File>,
    /// Path to the file (for error reporting)
    path: PathBuf,
}

impl FileStream {
    /// Open an existing file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| annotate(e, &path))?;
        debug!(path = %path.display(), "Opened file for reading");
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    /// Create (or truncate) a file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| annotate(e, &path))?;
        debug!(path = %path.display(), "Created file for writing");
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    /// Open an existing file for both reading and writing.
    pub fn open_append<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| annotate(e, &path))?;
        debug!(path = %path.display(), "Opened file for appending");
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    /// Get the path to the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "File is closed"))
    }
}

fn annotate(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {}", path.display(), err))
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.handle()?.read(buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.handle()?.flush()
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.handle()?.seek(pos)
    }
}

impl Stream for FileStream {
    fn is_eof(&mut self) -> io::Result<bool> {
        let file = self.handle()?;
        let position = file.stream_position()?;
        let len = file.metadata()?.len();
        Ok(position >= len)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => {
                file.flush()?;
                file.sync_all()
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "File is closed")),
        }
    }
}
