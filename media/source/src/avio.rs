/*!
    Custom FFmpeg I/O over a [`MemoryReader`].
*/

use std::ffi::{c_int, c_void};
use std::marker::PhantomData;

use ffmpeg_next::ffi;

use media_types::{Error, Result};

use crate::reader::{MemoryReader, Whence};

// stdio whence values, as passed through by libavformat.
const SEEK_SET: c_int = 0;
const SEEK_CUR: c_int = 1;
const SEEK_END: c_int = 2;

/**
    Owning handle for an `AVIOContext` that reads from caller memory.

    Owns three things: the `AVIOContext` itself, the staging window FFmpeg
    reads into, and the boxed [`MemoryReader`] passed to the callbacks as
    their opaque pointer. All three are released together on drop. The
    format context using this handle must be closed first.
*/
pub struct AvioContext<'a> {
    ctx: *mut ffi::AVIOContext,
    reader: *mut MemoryReader<'a>,
    _data: PhantomData<&'a [u8]>,
}

impl<'a> AvioContext<'a> {
    /**
        Allocate the staging window and the I/O context over `data`.

        `buffer_size` is the size of the staging window, and must be non-zero
        and fit in a C `int`.
    */
    pub fn new(data: &'a [u8], buffer_size: usize) -> Result<Self> {
        let window = c_int::try_from(buffer_size)
            .ok()
            .filter(|&size| size > 0)
            .ok_or_else(|| {
                Error::allocation(
                    "avio_alloc_context",
                    format!("invalid staging window size {buffer_size}"),
                )
            })?;

        let reader = Box::into_raw(Box::new(MemoryReader::new(data)));

        let buffer = unsafe { ffi::av_malloc(buffer_size) }.cast::<u8>();
        if buffer.is_null() {
            // SAFETY: `reader` came from `Box::into_raw` above and was never shared.
            drop(unsafe { Box::from_raw(reader) });
            return Err(Error::allocation(
                "av_malloc",
                format!("could not allocate {buffer_size} byte staging window"),
            ));
        }

        let ctx = unsafe {
            ffi::avio_alloc_context(
                buffer,
                window,
                0,
                reader.cast::<c_void>(),
                Some(read_packet),
                None,
                Some(seek),
            )
        };
        if ctx.is_null() {
            unsafe {
                ffi::av_free(buffer.cast::<c_void>());
                drop(Box::from_raw(reader));
            }
            return Err(Error::allocation(
                "avio_alloc_context",
                "could not allocate I/O context",
            ));
        }

        Ok(Self {
            ctx,
            reader,
            _data: PhantomData,
        })
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut ffi::AVIOContext {
        self.ctx
    }

    /**
        Current cursor position of the underlying reader.
    */
    pub fn position(&self) -> u64 {
        // SAFETY: callbacks only run inside FFmpeg calls, which need `&mut` access
        // to the owning demuxer; no callback can be running during `&self`.
        unsafe { (*self.reader).position() }
    }

    /**
        Size of the underlying buffer.
    */
    pub fn len(&self) -> u64 {
        unsafe { (*self.reader).len() }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for AvioContext<'_> {
    fn drop(&mut self) {
        unsafe {
            // FFmpeg may have swapped the staging window, so free whatever the
            // context currently points at rather than the original allocation.
            let buffer: *mut *mut u8 = &mut (*self.ctx).buffer;
            ffi::av_freep(buffer.cast::<c_void>());
            ffi::avio_context_free(&mut self.ctx);
            drop(Box::from_raw(self.reader));
        }
        tracing::trace!("memory I/O context released");
    }
}

impl std::fmt::Debug for AvioContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvioContext")
            .field("position", &self.position())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

unsafe extern "C" fn read_packet(opaque: *mut c_void, buf: *mut u8, buf_size: c_int) -> c_int {
    if opaque.is_null() || buf.is_null() || buf_size < 0 {
        return ffi::AVERROR(ffi::EINVAL);
    }

    // SAFETY: `opaque` is the reader installed by `AvioContext::new`, alive for
    // as long as the context; FFmpeg hands us `buf_size` writable bytes.
    let reader = unsafe { &mut *opaque.cast::<MemoryReader<'_>>() };
    let dst = unsafe { std::slice::from_raw_parts_mut(buf, buf_size as usize) };

    let chunk = reader.read(dst);
    if chunk.len == 0 {
        return ffi::AVERROR_EOF;
    }
    chunk.len as c_int
}

unsafe extern "C" fn seek(opaque: *mut c_void, offset: i64, whence: c_int) -> i64 {
    if opaque.is_null() {
        return ffi::AVERROR(ffi::EINVAL) as i64;
    }

    let reader = unsafe { &mut *opaque.cast::<MemoryReader<'_>>() };

    let whence = match whence & !(ffi::AVSEEK_FORCE as c_int) {
        w if w == ffi::AVSEEK_SIZE as c_int => Whence::Size,
        SEEK_SET => Whence::Start,
        SEEK_CUR => Whence::Current,
        SEEK_END => Whence::End,
        other => {
            tracing::debug!(whence = other, "unsupported seek origin");
            return ffi::AVERROR(ffi::EINVAL) as i64;
        }
    };

    match reader.seek(offset, whence) {
        Ok(position) => position as i64,
        Err(err) => {
            tracing::debug!(%err, "memory seek rejected");
            ffi::AVERROR(ffi::EIO) as i64
        }
    }
}
