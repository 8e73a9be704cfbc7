//! Source: line reading over plain and gzip-compressed log files.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};

use flate2::read::MultiGzDecoder;

/// Capacity of the buffered reader wrapped around each log file.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Read one line, without its `\n` / `\r\n` terminator.
///
/// Returns `Ok(None)` at end of input. Bytes that are not valid UTF-8 are
/// replaced rather than rejected: a damaged line should still be
/// searchable.
pub fn read_line<R: BufRead + ?Sized>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Wrap an opened file (positioned at offset 0) in a line reader,
/// decompressing on the fly when `compressed` is set. Every member of a
/// concatenated gzip stream is read.
pub fn line_reader<'a, R>(inner: R, compressed: bool) -> Box<dyn BufRead + Send + 'a>
where
    R: Read + Send + 'a,
{
    if compressed {
        Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, MultiGzDecoder::new(inner)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, inner))
    }
}

/// Owned variant of [`line_reader`] for the iterator, which keeps the
/// file handle alive for as long as the reader.
pub fn open_reader(file: File, compressed: bool) -> Box<dyn BufRead + Send> {
    line_reader(file, compressed)
}
