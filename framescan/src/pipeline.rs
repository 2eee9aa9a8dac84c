/*!
    The decode pipeline: one instance, one buffer, one synchronous pull loop.
*/

use std::ops::ControlFlow;

use media_decode::{RawFrame, StreamDecoder};
use media_source::ContainerDemuxer;
use media_transform::FrameConverter;
use media_types::{Error, FrameView, Result, StreamInfo};
use tracing::Span;

use crate::config::PipelineConfig;

/**
    Lifecycle of a [`DecodePipeline`].

    ```text
    Uninitialized -> Configured -> Streaming -> Exhausted | Failed -> Disposed
    ```

    A failed setup goes straight from `Uninitialized` to `Failed`.
    [`DecodePipeline::reset`] returns a terminal pipeline to `Configured`.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Uninitialized,
    Configured,
    Streaming,
    Exhausted,
    Failed,
    Disposed,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Configured => "configured",
            Self::Streaming => "streaming",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
            Self::Disposed => "disposed",
        }
    }

    /**
        Returns true for `Exhausted` and `Failed`.
    */
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
    Where a delivered frame came from.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameOrigin {
    /// Zero-based delivery ordinal.
    pub index: u64,
    /// Zero-based ordinal of the video packet whose decode produced the frame.
    /// Frames drained at end of stream carry the last packet's ordinal.
    pub packet_index: u64,
}

/**
    Counters for one call to [`DecodePipeline::process`].
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Packets read from the container, all streams.
    pub packets_read: u64,
    /// Packets of the selected stream handed to the decoder.
    pub packets_decoded: u64,
    /// Frames passed to the callback.
    pub frames_delivered: u64,
    /// Zero-sized frames dropped before conversion.
    pub frames_skipped: u64,
    /// The callback asked to stop before the container ended.
    pub stopped_early: bool,
}

/**
    Resources held while a buffer is configured.

    Fields drop in declaration order: the decoder goes first, then the
    converter's frame buffers, then the demuxer with its I/O handle.
*/
struct Session<'a> {
    decoder: StreamDecoder,
    converter: FrameConverter,
    demuxer: ContainerDemuxer<'a>,
    video: StreamInfo,
}

impl<'a> Session<'a> {
    fn open(data: &'a [u8], config: &PipelineConfig) -> Result<Self> {
        let demuxer = ContainerDemuxer::open(data, config.io_buffer_size)?;
        let video = demuxer.select_video_stream()?.clone();
        let decoder = StreamDecoder::open(demuxer.codec_config(video.index)?)?;
        let converter = FrameConverter::new(config.geometry_policy);

        tracing::info!(
            stream = video.index,
            codec = %video.codec,
            width = video.width,
            height = video.height,
            "video stream selected"
        );

        Ok(Self {
            decoder,
            converter,
            demuxer,
            video,
        })
    }

    fn run<F>(&mut self, on_frame: &mut F, flush_at_end: bool) -> Result<RunSummary>
    where
        F: FnMut(&FrameView<'_>, &FrameOrigin) -> ControlFlow<()>,
    {
        let mut summary = RunSummary::default();
        let video_index = self.video.index;

        while let Some(mut packet) = self.demuxer.read_packet()? {
            summary.packets_read += 1;
            if packet.stream_index() != video_index {
                continue;
            }

            let packet_index = summary.packets_decoded;
            summary.packets_decoded += 1;

            while !packet.is_consumed() {
                let frames = self.decoder.decode(&mut packet)?;
                if self.deliver(frames, packet_index, &mut summary, on_frame)?.is_break() {
                    summary.stopped_early = true;
                    return Ok(summary);
                }
            }
        }

        if flush_at_end {
            let frames = self.decoder.flush()?;
            let packet_index = summary.packets_decoded.saturating_sub(1);
            if self.deliver(frames, packet_index, &mut summary, on_frame)?.is_break() {
                summary.stopped_early = true;
            }
        }

        Ok(summary)
    }

    fn deliver<F>(
        &mut self,
        frames: Vec<RawFrame>,
        packet_index: u64,
        summary: &mut RunSummary,
        on_frame: &mut F,
    ) -> Result<ControlFlow<()>>
    where
        F: FnMut(&FrameView<'_>, &FrameOrigin) -> ControlFlow<()>,
    {
        for frame in frames {
            if frame.is_degenerate() {
                tracing::trace!(packet_index, "skipping zero-sized frame");
                summary.frames_skipped += 1;
                continue;
            }

            let view = self.converter.convert(&frame)?;
            let origin = FrameOrigin {
                index: summary.frames_delivered,
                packet_index,
            };
            summary.frames_delivered += 1;

            if on_frame(&view, &origin).is_break() {
                tracing::debug!(frame = origin.index, "callback requested stop");
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

/**
    Decodes the best video stream of an in-memory container and pushes each
    frame, as 8-bit grayscale, to a callback.

    The buffer is borrowed for the pipeline's whole lifetime and never copied.
    All codec, container and converter resources belong to this instance; they
    are released as soon as a run ends, and otherwise when the pipeline drops.

    ```ignore
    let mut pipeline = DecodePipeline::open(&data, PipelineConfig::default())?;
    let summary = pipeline.process(|frame, _origin| {
        println!("{}x{} mean {:.1}", frame.width, frame.height, frame.mean());
        ControlFlow::Continue(())
    })?;
    ```
*/
pub struct DecodePipeline<'a> {
    session: Option<Session<'a>>,
    data: Option<&'a [u8]>,
    config: PipelineConfig,
    state: PipelineState,
    span: Span,
}

impl<'a> DecodePipeline<'a> {
    /**
        Create an unconfigured pipeline.
    */
    pub fn new(config: PipelineConfig) -> Self {
        let span = tracing::info_span!("pipeline", label = %config.label);
        Self {
            session: None,
            data: None,
            config,
            state: PipelineState::Uninitialized,
            span,
        }
    }

    /**
        Create a pipeline and configure it with `data` in one step.
    */
    pub fn open(data: &'a [u8], config: PipelineConfig) -> Result<Self> {
        let mut pipeline = Self::new(config);
        pipeline.configure(data)?;
        Ok(pipeline)
    }

    /**
        Supply the encoded container and prepare every stage.

        Opens the container, selects the video stream and opens its decoder.
        On failure the pipeline moves to `Failed` with nothing left allocated.
    */
    pub fn configure(&mut self, data: &'a [u8]) -> Result<()> {
        if self.state != PipelineState::Uninitialized {
            return Err(Error::invalid_state("configure", self.state.as_str()));
        }
        self.data = Some(data);
        self.setup(data)
    }

    /**
        Run the pull loop, calling `on_frame` for every decoded frame.

        Frames are delivered in decode order. Returning
        [`ControlFlow::Break`] from the callback ends the run early; the
        pipeline then counts as exhausted, not failed. The frame view is only
        valid during the callback.

        Only allowed in the `Configured` state. Whatever the outcome, the
        session's resources are released before this returns.
    */
    pub fn process<F>(&mut self, mut on_frame: F) -> Result<RunSummary>
    where
        F: FnMut(&FrameView<'_>, &FrameOrigin) -> ControlFlow<()>,
    {
        if self.state != PipelineState::Configured {
            return Err(Error::invalid_state("process", self.state.as_str()));
        }

        let span = self.span.clone();
        let _enter = span.enter();

        let flush_at_end = self.config.flush_at_end;
        let Some(session) = self.session.as_mut() else {
            self.state = PipelineState::Failed;
            return Err(Error::invalid_state("process", "missing its session"));
        };

        self.state = PipelineState::Streaming;
        let result = session.run(&mut on_frame, flush_at_end);
        self.session = None;

        match result {
            Ok(summary) => {
                self.state = PipelineState::Exhausted;
                tracing::info!(
                    packets_read = summary.packets_read,
                    packets_decoded = summary.packets_decoded,
                    frames = summary.frames_delivered,
                    skipped = summary.frames_skipped,
                    stopped_early = summary.stopped_early,
                    "decode finished"
                );
                Ok(summary)
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                tracing::warn!(error = %e, "decode failed");
                Err(e)
            }
        }
    }

    /**
        Tear down any session and repeat the full setup on the same buffer.

        Brings an exhausted or failed pipeline back to `Configured`. Fails if
        no buffer was ever supplied.
    */
    pub fn reset(&mut self) -> Result<()> {
        let Some(data) = self.data else {
            return Err(Error::invalid_state("reset", self.state.as_str()));
        };
        self.session = None;
        self.state = PipelineState::Uninitialized;
        self.setup(data)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /**
        The selected video stream, while a session is open.
    */
    pub fn video_stream(&self) -> Option<&StreamInfo> {
        self.session.as_ref().map(|s| &s.video)
    }

    fn setup(&mut self, data: &'a [u8]) -> Result<()> {
        let span = self.span.clone();
        let _enter = span.enter();

        match Session::open(data, &self.config) {
            Ok(session) => {
                self.session = Some(session);
                self.state = PipelineState::Configured;
                Ok(())
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                tracing::warn!(error = %e, "pipeline setup failed");
                Err(e)
            }
        }
    }
}

impl Drop for DecodePipeline<'_> {
    fn drop(&mut self) {
        let _enter = self.span.enter();
        self.session = None;
        tracing::debug!(from = self.state.as_str(), "pipeline disposed");
        self.state = PipelineState::Disposed;
    }
}

impl std::fmt::Debug for DecodePipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodePipeline")
            .field("label", &self.config.label)
            .field("state", &self.state)
            .field("video_stream", &self.video_stream())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use media_types::ErrorKind;

    use super::*;

    #[test]
    fn process_before_configure_is_rejected() {
        let mut pipeline = DecodePipeline::new(PipelineConfig::default());
        let err = pipeline
            .process(|_, _| ControlFlow::Continue(()))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(pipeline.state(), PipelineState::Uninitialized);
    }

    #[test]
    fn reset_without_a_buffer_is_rejected() {
        let mut pipeline = DecodePipeline::new(PipelineConfig::new("idle"));
        let err = pipeline.reset().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(pipeline.label(), "idle");
        assert!(pipeline.video_stream().is_none());
    }

    #[test]
    fn failed_setup_leaves_nothing_open() {
        let mut pipeline = DecodePipeline::new(PipelineConfig::default());
        let err = pipeline.configure(&[]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Open);
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert!(pipeline.video_stream().is_none());

        let again = pipeline.configure(b"YUV4MPEG2").unwrap_err();
        assert_eq!(again.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn state_names() {
        assert_eq!(PipelineState::Exhausted.to_string(), "exhausted");
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Configured.is_terminal());
    }
}
