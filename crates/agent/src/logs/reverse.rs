//! Reverse log reading: walks a plain file backwards from an end cursor
//! with a doubling read window.

use std::io::{Read, Seek, SeekFrom};

use tokio_util::sync::CancellationToken;

use super::error::SearchError;

/// The window is doubled before every read, so the first read is twice this.
pub const INITIAL_WINDOW: u64 = 256;
/// Upper bound of a single read.
pub const MAX_WINDOW: u64 = 16 * 1024 * 1024;

#[inline]
fn is_newline(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// First position in `block` that starts a line: a byte following a
/// `\n`/`\r` which is not itself a newline. The final byte of the block is
/// not inspected.
fn first_line_boundary(block: &[u8]) -> Option<usize> {
    block
        .windows(2)
        .position(|w| is_newline(w[0]) && !is_newline(w[1]))
        .map(|i| i + 1)
}

/// Read the last lines of `file` that end before `end_cursor`.
///
/// Reads backwards in windows of 512 bytes, doubling up to
/// [`MAX_WINDOW`], until a block contains a line boundary (or the start
/// of the file is reached). Everything from that boundary to
/// `end_cursor` is returned, `\r\n` normalised and split on `\n`,
/// together with the number of raw bytes it spans. Only bytes strictly
/// before `end_cursor` are read, so a file being appended to is safe.
///
/// Calling again with `end_cursor - consumed` continues backwards; the
/// walk is over once `consumed` is 0.
pub fn read_last_lines<R>(
    file: &mut R,
    end_cursor: u64,
    cancel: &CancellationToken,
) -> Result<(Vec<String>, usize), SearchError>
where
    R: Read + Seek + ?Sized,
{
    if end_cursor == 0 {
        return Ok((Vec::new(), 0));
    }

    let mut tail: Vec<u8> = Vec::new();
    let mut boundary = 0usize;
    let mut cursor = end_cursor;
    let mut size = INITIAL_WINDOW;

    while cursor > 0 {
        size = (size * 2).min(MAX_WINDOW);
        let step = size.min(cursor);
        cursor -= step;

        file.seek(SeekFrom::Start(cursor))?;
        let mut block = vec![0u8; step as usize];
        file.read_exact(&mut block)?;

        let found = first_line_boundary(&block);
        block.extend_from_slice(&tail);
        tail = block;

        if let Some(pos) = found {
            boundary = pos;
            break;
        }
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
    }

    let text = &tail[boundary..];
    let lines = String::from_utf8_lossy(text)
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect();
    Ok((lines, text.len()))
}
