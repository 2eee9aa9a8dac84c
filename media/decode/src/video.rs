/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    format::Pixel,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use media_source::{CodecConfig, Packet, is_again};
use media_types::{Error, Result};

/**
    A decoded frame in whatever layout the codec produced.

    Holds a reference to the decoder's frame buffers; the pixel data is not
    copied. Frames with zero width or height can show up while a decoder is
    still priming and should be skipped by consumers.
*/
pub struct RawFrame {
    frame: VideoFrameFFmpeg,
}

impl RawFrame {
    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /**
        Source pixel format, as reported by the codec.
    */
    pub fn format(&self) -> Pixel {
        self.frame.format()
    }

    pub fn pts(&self) -> Option<i64> {
        self.frame.pts()
    }

    /**
        Returns true if the frame has no visible area.
    */
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /**
        The FFmpeg frame, for handing to a converter.
    */
    pub fn as_ffmpeg(&self) -> &VideoFrameFFmpeg {
        &self.frame
    }
}

impl From<VideoFrameFFmpeg> for RawFrame {
    /**
        Wrap a frame produced elsewhere, e.g. by a filter or in tests.
    */
    fn from(frame: VideoFrameFFmpeg) -> Self {
        Self { frame }
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .field("pts", &self.pts())
            .finish()
    }
}

/**
    Video decoder bound to one container stream.

    Uses the codec library's send/receive model: each packet is submitted
    whole, then every frame that became ready is drained. "Need more input"
    is ordinary flow control and simply ends the drain.
*/
pub struct StreamDecoder {
    decoder: VideoDecoderFFmpeg,
    stream_index: usize,
    frames_decoded: u64,
}

impl StreamDecoder {
    /**
        Open a decoder for the stream described by `config`.

        The decoder runs on the calling thread only; codec-internal worker
        threads are disabled.
    */
    pub fn open(config: CodecConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::allocation("ffmpeg init", e.to_string()))?;

        let stream_index = config.stream_index();
        let codec_id = config.codec_id();

        let mut context = codec::context::Context::from_parameters(config.into_parameters())
            .map_err(|e| Error::allocation("avcodec_parameters_to_context", e.to_string()))?;

        unsafe {
            (*context.as_mut_ptr()).thread_count = 1;
        }

        let decoder = context.decoder().video().map_err(|e| match e {
            ffmpeg_next::Error::DecoderNotFound => Error::unsupported_stream(
                "avcodec_find_decoder",
                format!("no decoder available for {codec_id:?}"),
            ),
            e => Error::open("avcodec_open2", e.to_string()),
        })?;

        tracing::debug!(
            stream_index,
            codec = codec_id.name(),
            width = decoder.width(),
            height = decoder.height(),
            "video decoder opened"
        );

        Ok(Self {
            decoder,
            stream_index,
            frames_decoded: 0,
        })
    }

    /**
        Index of the container stream this decoder is bound to.
    */
    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /**
        Number of frames produced so far, degenerate ones included.
    */
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /**
        Decode a packet, returning the frames that became ready.

        May return zero, one, or multiple frames depending on codec buffering.
        When the decoder refuses the packet because its output is full, the
        pending frames are drained and the packet is resent once. If it is
        still refused, the packet is left unconsumed (see
        [`Packet::remaining`]) so the caller can offer it again.
    */
    pub fn decode(&mut self, packet: &mut Packet) -> Result<Vec<RawFrame>> {
        let mut frames = Vec::new();

        // An empty packet would be taken as the end-of-stream signal.
        if packet.is_consumed() {
            tracing::trace!(size = packet.size(), "skipping consumed or empty packet");
            return Ok(frames);
        }

        match self.decoder.send_packet(packet.as_ffmpeg()) {
            Ok(()) => {}
            Err(e) if is_again(&e) => {
                self.receive_frames(&mut frames)?;
                match self.decoder.send_packet(packet.as_ffmpeg()) {
                    Ok(()) => {}
                    Err(e) if is_again(&e) => {
                        if frames.is_empty() {
                            return Err(Error::decode(
                                "avcodec_send_packet",
                                "decoder refused input without producing output",
                            ));
                        }
                        tracing::debug!(
                            pending = frames.len(),
                            "decoder input full, packet kept for the next call"
                        );
                        return Ok(frames);
                    }
                    Err(e) => return Err(Error::decode("avcodec_send_packet", e.to_string())),
                }
            }
            Err(e) => return Err(Error::decode("avcodec_send_packet", e.to_string())),
        }

        let size = packet.size();
        packet.consume(size);

        self.receive_frames(&mut frames)?;
        Ok(frames)
    }

    /**
        Flush the decoder to get any remaining buffered frames.

        Call this once the container reports end of stream. Further calls
        return no frames.
    */
    pub fn flush(&mut self) -> Result<Vec<RawFrame>> {
        let mut frames = Vec::new();

        match self.decoder.send_eof() {
            Ok(()) => {}
            Err(e) if is_again(&e) => {
                self.receive_frames(&mut frames)?;
                match self.decoder.send_eof() {
                    Ok(()) | Err(ffmpeg_next::Error::Eof) => {}
                    Err(e) => return Err(Error::decode("avcodec_send_packet", e.to_string())),
                }
            }
            // Already flushed.
            Err(ffmpeg_next::Error::Eof) => {}
            Err(e) => return Err(Error::decode("avcodec_send_packet", e.to_string())),
        }

        self.receive_frames(&mut frames)?;
        Ok(frames)
    }

    /**
        Drain every frame the decoder has ready.
    */
    fn receive_frames(&mut self, frames: &mut Vec<RawFrame>) -> Result<()> {
        loop {
            let mut frame = VideoFrameFFmpeg::empty();
            match self.decoder.receive_frame(&mut frame) {
                Ok(()) => {
                    self.frames_decoded += 1;
                    frames.push(RawFrame { frame });
                }
                // Need more input, or fully drained.
                Err(e) if is_again(&e) => return Ok(()),
                Err(ffmpeg_next::Error::Eof) => return Ok(()),
                Err(e) => return Err(Error::decode("avcodec_receive_frame", e.to_string())),
            }
        }
    }
}

impl Drop for StreamDecoder {
    fn drop(&mut self) {
        tracing::debug!(
            stream_index = self.stream_index,
            frames_decoded = self.frames_decoded,
            "video decoder closed"
        );
    }
}

impl std::fmt::Debug for StreamDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDecoder")
            .field("stream_index", &self.stream_index)
            .field("frames_decoded", &self.frames_decoded)
            .finish_non_exhaustive()
    }
}
