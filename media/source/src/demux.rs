/*!
    Container demuxer over an in-memory buffer.
*/

use std::ffi::c_int;
use std::ptr;

use ffmpeg_next::{
    ffi,
    format::{context::Input as InputContext, stream::Disposition},
};

use media_types::{Error, Result, StreamInfo};

use crate::avio::AvioContext;
use crate::codec_config::CodecConfig;
use crate::convert::{is_again, kind_from_ffmpeg, rational_from_ffmpeg};
use crate::packet::Packet;
use crate::select::select_best_video;

/**
    Default size of the staging window FFmpeg reads through.
*/
pub const DEFAULT_IO_BUFFER_SIZE: usize = 16 * 1024;

/**
    Demuxer for a complete container held in caller memory.

    Created by [`ContainerDemuxer::open`], which probes the container and
    indexes its streams without decoding anything. Packets are then pulled in
    file order with [`read_packet`](Self::read_packet).

    The format context is declared before the I/O handle so that it is always
    closed first; the I/O handle in turn releases the staging window and the
    reader. The borrowed buffer outlives both.
*/
pub struct ContainerDemuxer<'a> {
    input: InputContext,
    io: AvioContext<'a>,
    format: String,
    streams: Vec<StreamInfo>,
    packets_read: u64,
}

impl<'a> ContainerDemuxer<'a> {
    /**
        Open `data` as a media container.

        # Arguments

        * `data` - The complete encoded container; borrowed, never copied
        * `io_buffer_size` - Size of the staging window used by the read callback
    */
    pub fn open(data: &'a [u8], io_buffer_size: usize) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::allocation("ffmpeg init", e.to_string()))?;

        if data.is_empty() {
            return Err(Error::open("avformat_open_input", "input buffer is empty"));
        }

        let mut io = AvioContext::new(data, io_buffer_size)?;

        let mut ctx = unsafe { ffi::avformat_alloc_context() };
        if ctx.is_null() {
            return Err(Error::allocation(
                "avformat_alloc_context",
                "could not allocate format context",
            ));
        }

        unsafe {
            (*ctx).pb = io.as_mut_ptr();
            (*ctx).flags |= ffi::AVFMT_FLAG_CUSTOM_IO as c_int;
        }

        // On failure FFmpeg frees the format context itself; the I/O handle is
        // still ours and drops with `io`.
        let ret =
            unsafe { ffi::avformat_open_input(&mut ctx, ptr::null(), ptr::null(), ptr::null_mut()) };
        if ret < 0 {
            return Err(Error::open(
                "avformat_open_input",
                ffmpeg_next::Error::from(ret).to_string(),
            ));
        }

        // From here on `input` owns the format context and, being declared after
        // `io`, drops before it on every early return.
        let mut input = unsafe { InputContext::wrap(ctx) };

        let ret = unsafe { ffi::avformat_find_stream_info(input.as_mut_ptr(), ptr::null_mut()) };
        if ret < 0 {
            return Err(Error::open(
                "avformat_find_stream_info",
                ffmpeg_next::Error::from(ret).to_string(),
            ));
        }

        let format = input.format().name().to_string();
        let streams: Vec<StreamInfo> = input.streams().map(|s| stream_info(&s)).collect();

        tracing::debug!(
            format = %format,
            streams = streams.len(),
            bytes = data.len(),
            "container opened"
        );
        for stream in &streams {
            tracing::debug!(
                index = stream.index,
                kind = stream.kind.as_str(),
                codec = %stream.codec,
                width = stream.width,
                height = stream.height,
                frame_rate = ?stream.frame_rate,
                attached_picture = stream.attached_picture,
                "stream discovered"
            );
        }

        Ok(Self {
            input,
            io,
            format,
            streams,
            packets_read: 0,
        })
    }

    /**
        All streams found in the container, in index order.
    */
    pub fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    /**
        Short name of the detected container format (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    */
    pub fn format_name(&self) -> &str {
        &self.format
    }

    /**
        Choose the video stream to decode.

        Applies [`select_best_video`]; fails with an unsupported-stream error
        when the container holds no decodable video.
    */
    pub fn select_video_stream(&self) -> Result<&StreamInfo> {
        select_best_video(&self.streams).ok_or_else(|| {
            let kinds: Vec<&str> = self.streams.iter().map(|s| s.kind.as_str()).collect();
            Error::unsupported_stream(
                "select_video_stream",
                format!("container has no video stream (found: [{}])", kinds.join(", ")),
            )
        })
    }

    /**
        Copy the codec parameters of stream `index` for a decoder.
    */
    pub fn codec_config(&self, index: usize) -> Result<CodecConfig> {
        let stream = self.input.stream(index).ok_or_else(|| {
            Error::unsupported_stream("codec_config", format!("no stream with index {index}"))
        })?;
        Ok(CodecConfig::new(&stream.parameters(), index))
    }

    /**
        Read the next packet from the container.

        Returns `Ok(Some(packet))` for each packet, `Ok(None)` at end of
        stream, or an I/O error if the demuxer fails for another reason.
        Packets come in file order, interleaved between streams; callers drop
        the ones belonging to streams they are not decoding.
    */
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    self.packets_read += 1;
                    return Ok(Some(Packet::new(packet)));
                }
                Err(ffmpeg_next::Error::Eof) => return Ok(None),
                Err(e) if is_again(&e) => continue,
                Err(e) => return Err(Error::io("av_read_frame", e.to_string())),
            }
        }
    }

    /**
        Number of packets read so far, across all streams.
    */
    pub fn packets_read(&self) -> u64 {
        self.packets_read
    }

    /**
        Position of the memory reader, in bytes from the start of the buffer.
    */
    pub fn io_position(&self) -> u64 {
        self.io.position()
    }
}

impl Drop for ContainerDemuxer<'_> {
    fn drop(&mut self) {
        tracing::debug!(packets_read = self.packets_read, "container demuxer closed");
    }
}

impl std::fmt::Debug for ContainerDemuxer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerDemuxer")
            .field("format", &self.format_name())
            .field("streams", &self.streams)
            .field("packets_read", &self.packets_read)
            .finish_non_exhaustive()
    }
}

fn stream_info(stream: &ffmpeg_next::format::stream::Stream<'_>) -> StreamInfo {
    let parameters = stream.parameters();

    // SAFETY: reading plain fields of the AVCodecParameters owned by the stream.
    let (width, height) = unsafe {
        let ptr = parameters.as_ptr();
        ((*ptr).width.max(0) as u32, (*ptr).height.max(0) as u32)
    };

    let frame_rate = [stream.avg_frame_rate(), stream.rate()]
        .into_iter()
        .map(rational_from_ffmpeg)
        .find(|r| r.to_positive_f64().is_some());

    StreamInfo {
        index: stream.index(),
        kind: kind_from_ffmpeg(parameters.medium()),
        codec: parameters.id().name().to_string(),
        width,
        height,
        frame_rate,
        attached_picture: stream.disposition().contains(Disposition::ATTACHED_PIC),
    }
}
