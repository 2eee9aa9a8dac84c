/*!
    Cursor over a caller-owned memory region.
*/

use media_types::{Error, Result};

/**
    Origin for [`MemoryReader::seek`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Whence {
    /// Offset is absolute from the start of the buffer.
    Start,
    /// Offset is relative to the current position.
    Current,
    /// Offset is relative to the end of the buffer.
    End,
    /// Report the total size; the cursor does not move.
    Size,
}

/**
    Result of a single read.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadChunk {
    /// Number of bytes copied into the destination.
    pub len: usize,
    /// True once the cursor sits at (or beyond) the end of the buffer.
    pub eof: bool,
}

/**
    Sequential, seekable reader over a borrowed byte slice.

    Reads slice directly out of the caller's memory; nothing is buffered or
    copied beyond the destination handed to [`read`](Self::read). The cursor
    may be placed past the end, in which case reads return zero bytes with
    `eof` set.
*/
#[derive(Debug)]
pub struct MemoryReader<'a> {
    data: &'a [u8],
    position: u64,
}

impl<'a> MemoryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /**
        Total size of the underlying buffer.
    */
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /**
        Absolute cursor position.
    */
    pub fn position(&self) -> u64 {
        self.position
    }

    /**
        Bytes left between the cursor and the end of the buffer.
    */
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position)
    }

    /**
        Copy up to `dst.len()` bytes from the cursor and advance it.

        A short read means the end of the buffer was reached; `eof` is set on
        that same read rather than on a following one.
    */
    pub fn read(&mut self, dst: &mut [u8]) -> ReadChunk {
        let available = self.remaining();
        let len = (dst.len() as u64).min(available) as usize;
        if len > 0 {
            let start = self.position as usize;
            dst[..len].copy_from_slice(&self.data[start..start + len]);
            self.position += len as u64;
        }
        ReadChunk {
            len,
            eof: self.remaining() == 0,
        }
    }

    /**
        Move the cursor and return the new absolute position.

        [`Whence::Size`] returns the buffer size without moving. Positions that
        would be negative, or overflow, are rejected with an I/O error and leave
        the cursor untouched.
    */
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.position as i64,
            Whence::End => self.data.len() as i64,
            Whence::Size => return Ok(self.len()),
        };

        let target = base
            .checked_add(offset)
            .ok_or_else(|| Error::io("seek", format!("offset {offset} overflows")))?;
        if target < 0 {
            return Err(Error::io(
                "seek",
                format!("negative position {target} ({whence:?} {offset:+})"),
            ));
        }

        self.position = target as u64;
        Ok(self.position)
    }
}
