//! In-memory stream implementation

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::Stream;

/// A growable in-memory byte buffer usable wherever a [`Stream`] is expected.
///
/// Writes overwrite at the current position and extend the buffer as needed.
/// Once closed, every operation fails.
#[derive(Debug, Default, Clone)]
pub struct MemoryStream {
    buffer: Vec<u8>,
    position: usize,
    closed: bool,
}

impl MemoryStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream over existing bytes, positioned at the start.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: bytes.into(),
            position: 0,
            closed: false,
        }
    }

    /// Total number of bytes held.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The full buffer contents, regardless of position.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the stream and return its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Drop all contents and rewind to the start.
    pub fn truncate(&mut self) -> io::Result<()> {
        self.check_closed()?;
        self.buffer.clear();
        self.position = 0;
        Ok(())
    }

    fn check_closed(&self) -> io::Result<()> {
        if self.closed {
            Err(io::Error::new(io::ErrorKind::Other, "Buffer is closed"))
        } else {
            Ok(())
        }
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_closed()?;
        if self.position >= self.buffer.len() {
            return Ok(0);
        }
        let available = &self.buffer[self.position..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.position += n;
        Ok(n)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_closed()?;
        let end = self.position + buf.len();
        if self.position > self.buffer.len() {
            // Seeking past the end leaves a zero-filled gap
            self.buffer.resize(self.position, 0);
        }
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[self.position..end].copy_from_slice(buf);
        self.position = end;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_closed()
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.check_closed()?;
        let target: i128 = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.position as i128 + delta as i128,
            SeekFrom::End(delta) => self.buffer.len() as i128 + delta as i128,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot seek before beginning of file.",
            ));
        }
        self.position = target as usize;
        Ok(self.position as u64)
    }
}

impl Stream for MemoryStream {
    fn is_eof(&mut self) -> io::Result<bool> {
        self.check_closed()?;
        Ok(self.position >= self.buffer.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.check_closed()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_back() {
        let mut stream = MemoryStream::new();
        stream.write_all(b"hello").unwrap();
        assert_eq!(stream.tell().unwrap(), 5);
        assert!(stream.is_eof().unwrap());

        stream.seek(SeekFrom::Start(1)).unwrap();
        let mut buf = [0u8; 3];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ell");
        assert!(!stream.is_eof().unwrap());
    }

    #[test]
    fn test_write_overwrites_in_place() {
        let mut stream = MemoryStream::from_bytes(b"abcdef".to_vec());
        stream.seek(SeekFrom::Start(2)).unwrap();
        stream.write_all(b"XY").unwrap();
        assert_eq!(stream.as_bytes(), b"abXYef");

        stream.seek(SeekFrom::End(0)).unwrap();
        stream.write_all(b"gh").unwrap();
        assert_eq!(stream.as_bytes(), b"abXYefgh");
    }

    #[test]
    fn test_seek_relative_and_before_start() {
        let mut stream = MemoryStream::from_bytes(vec![0u8; 20]);
        stream.seek(SeekFrom::End(-16)).unwrap();
        assert_eq!(stream.tell().unwrap(), 4);
        stream.seek(SeekFrom::Current(-4)).unwrap();
        assert_eq!(stream.tell().unwrap(), 0);
        assert!(stream.seek(SeekFrom::Current(-1)).is_err());
    }

    #[test]
    fn test_short_read_at_end() {
        let mut stream = MemoryStream::from_bytes(b"ab".to_vec());
        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf).unwrap(), 2);
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_closed_stream_rejects_operations() {
        let mut stream = MemoryStream::new();
        stream.close().unwrap();
        assert!(stream.is_closed());
        assert!(stream.write_all(b"x").is_err());
        assert!(stream.is_eof().is_err());
        assert!(stream.close().is_err());
    }

    #[test]
    fn test_truncate() {
        let mut stream = MemoryStream::from_bytes(b"data".to_vec());
        stream.seek(SeekFrom::End(0)).unwrap();
        stream.truncate().unwrap();
        assert!(stream.is_empty());
        assert_eq!(stream.tell().unwrap(), 0);
    }
}
