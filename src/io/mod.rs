//! Byte stream abstraction consumed by the container file layer.
//!
//! The binary codec only needs `std::io::Read`/`Write`; container files also
//! seek, report their position and detect end-of-stream. [`Stream`] bundles
//! those capabilities so the same writer/reader code runs over an in-memory
//! buffer or a file on disk.

mod file;
mod memory;

pub use file::FileStream;
pub use memory::MemoryStream;

use std::io::{self, Read, Seek, Write};

/// A seekable byte stream with end-of-stream detection.
pub trait Stream: Read + Write + Seek {
    /// Current position from the start of the stream.
    fn tell(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    /// Whether the position is at or past the end of the stream.
    fn is_eof(&mut self) -> io::Result<bool>;

    /// Flush and release the stream. Further reads or writes fail.
    fn close(&mut self) -> io::Result<()>;
}

/// A boxed Stream for dynamic dispatch
pub type BoxedStream = Box<dyn Stream>;

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn tell(&mut self) -> io::Result<u64> {
        (**self).tell()
    }

    fn is_eof(&mut self) -> io::Result<bool> {
        (**self).is_eof()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Stream + ?Sized> Stream for &mut S {
    fn tell(&mut self) -> io::Result<u64> {
        (**self).tell()
    }

    fn is_eof(&mut self) -> io::Result<bool> {
        (**self).is_eof()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Read exactly `buf.len()` bytes, returning how many were actually available.
///
/// Unlike `read_exact`, a short read is reported instead of failing so callers
/// can produce their own error for a truncated structure.
pub(crate) fn read_up_to<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
