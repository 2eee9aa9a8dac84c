/*!
    Conversion of raw frames to 8-bit grayscale.
*/

use ffmpeg_next::{
    format::Pixel,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use media_decode::RawFrame;
use media_types::{Error, FrameView, Result};

/**
    Output layout of every converted frame.
*/
const OUTPUT_FORMAT: Pixel = Pixel::GRAY8;

/**
    Nearest-sample conversion; no interpolation between source samples.
*/
const SCALER_FLAGS: ScalerFlags = ScalerFlags::POINT;

/**
    What to do when a frame's geometry differs from the previous one.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeometryPolicy {
    /// Allocate a new output buffer sized for the new geometry.
    #[default]
    Reallocate,
    /// Fail the conversion with a decode error.
    Reject,
}

/**
    Converts raw frames to single-channel 8-bit frames.

    The output buffer is allocated lazily from the first frame's geometry and
    reused for every following frame of the same size. The scaler context is
    cached as well, keyed by source geometry and pixel format, and rebuilt
    whenever either changes. Any pixel format the scaling library accepts as
    input is supported.
*/
pub struct FrameConverter {
    policy: GeometryPolicy,
    scaler_state: Option<ScalerState>,
    output: Option<VideoFrameFFmpeg>,
    allocations: u64,
}

struct ScalerState {
    context: ScalerContext,
    src_width: u32,
    src_height: u32,
    src_format: Pixel,
}

impl FrameConverter {
    pub fn new(policy: GeometryPolicy) -> Self {
        Self {
            policy,
            scaler_state: None,
            output: None,
            allocations: 0,
        }
    }

    /**
        Number of output buffers allocated so far.
    */
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /**
        Geometry of the current output buffer, if one was allocated.
    */
    pub fn geometry(&self) -> Option<(u32, u32)> {
        self.output.as_ref().map(|o| (o.width(), o.height()))
    }

    /**
        Drop the cached scaler and output buffer.
    */
    pub fn reset(&mut self) {
        self.scaler_state = None;
        self.output = None;
    }

    /**
        Convert `frame` and return a view of the converted pixels.

        The view borrows the converter's output buffer and is valid until the
        next call.
    */
    pub fn convert(&mut self, frame: &RawFrame) -> Result<FrameView<'_>> {
        let (width, height) = (frame.width(), frame.height());
        if frame.is_degenerate() {
            return Err(Error::decode(
                "convert",
                format!("frame has zero dimensions ({width}x{height})"),
            ));
        }

        self.ensure_output(width, height)?;

        let needs_init = match &self.scaler_state {
            None => true,
            Some(state) => {
                state.src_width != width
                    || state.src_height != height
                    || state.src_format != frame.format()
            }
        };
        if needs_init {
            self.init_scaler(width, height, frame.format())?;
        }

        let (Some(state), Some(output)) = (self.scaler_state.as_mut(), self.output.as_mut()) else {
            return Err(Error::allocation("convert", "converter not initialized"));
        };

        state
            .context
            .run(frame.as_ffmpeg(), output)
            .map_err(|e| Error::decode("sws_scale", e.to_string()))?;

        Ok(FrameView {
            data: output.data(0),
            stride: output.stride(0),
            width,
            height,
            pts: frame.pts(),
        })
    }

    /**
        Make sure the output buffer matches `width` x `height`.
    */
    fn ensure_output(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(output) = &self.output {
            if output.width() == width && output.height() == height {
                return Ok(());
            }

            let (old_width, old_height) = (output.width(), output.height());
            match self.policy {
                GeometryPolicy::Reject => {
                    return Err(Error::decode(
                        "convert",
                        format!(
                            "frame geometry changed from {old_width}x{old_height} to {width}x{height}"
                        ),
                    ));
                }
                GeometryPolicy::Reallocate => {
                    tracing::debug!(
                        old_width,
                        old_height,
                        width,
                        height,
                        "frame geometry changed, reallocating output"
                    );
                }
            }
        }

        let output = VideoFrameFFmpeg::new(OUTPUT_FORMAT, width, height);
        if output.is_empty() || output.stride(0) < width as usize {
            return Err(Error::allocation(
                "av_frame_get_buffer",
                format!("could not allocate {width}x{height} output frame"),
            ));
        }
        self.output = Some(output);
        self.allocations += 1;
        Ok(())
    }

    /**
        Initialize or reinitialize the scaler for the given input format.
    */
    fn init_scaler(&mut self, src_width: u32, src_height: u32, src_format: Pixel) -> Result<()> {
        let context = ScalerContext::get(
            src_format,
            src_width,
            src_height,
            OUTPUT_FORMAT,
            src_width,
            src_height,
            SCALER_FLAGS,
        )
        .map_err(|e| {
            Error::allocation(
                "sws_getContext",
                format!("cannot convert {src_format:?} {src_width}x{src_height}: {e}"),
            )
        })?;

        self.scaler_state = Some(ScalerState {
            context,
            src_width,
            src_height,
            src_format,
        });

        Ok(())
    }
}

impl Default for FrameConverter {
    fn default() -> Self {
        Self::new(GeometryPolicy::default())
    }
}

impl std::fmt::Debug for FrameConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameConverter")
            .field("policy", &self.policy)
            .field("geometry", &self.geometry())
            .field("allocations", &self.allocations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use media_types::ErrorKind;

    use super::*;

    /// A gray frame where sample (x, y) is `x + 10 * y + base`.
    fn gray_frame(width: u32, height: u32, base: u8) -> RawFrame {
        let mut frame = VideoFrameFFmpeg::new(Pixel::GRAY8, width, height);
        let stride = frame.stride(0);
        let data = frame.data_mut(0);
        for y in 0..height as usize {
            for x in 0..width as usize {
                data[y * stride + x] = base + x as u8 + 10 * y as u8;
            }
        }
        RawFrame::from(frame)
    }

    /// A planar 4:2:0 frame with a flat luma level.
    fn yuv_frame(width: u32, height: u32, luma: u8) -> RawFrame {
        let mut frame = VideoFrameFFmpeg::new(Pixel::YUV420P, width, height);
        frame.data_mut(0).fill(luma);
        frame.data_mut(1).fill(128);
        frame.data_mut(2).fill(128);
        RawFrame::from(frame)
    }

    #[test]
    fn gray_input_is_copied_exactly() {
        let mut converter = FrameConverter::default();
        let view = converter.convert(&gray_frame(5, 3, 1)).unwrap();

        assert_eq!((view.width, view.height), (5, 3));
        assert!(view.stride >= 5);
        assert_eq!(view.data.len(), view.stride * 3);
        assert_eq!(view.row(0), &[1, 2, 3, 4, 5]);
        assert_eq!(view.row(2), &[21, 22, 23, 24, 25]);
    }

    #[test]
    fn color_input_becomes_single_channel() {
        let mut converter = FrameConverter::default();

        let dark = converter.convert(&yuv_frame(16, 16, 40)).unwrap().mean();
        let bright = converter.convert(&yuv_frame(16, 16, 200)).unwrap().mean();
        assert!(dark < bright);
    }

    #[test]
    fn hard_edges_are_not_blended() {
        let mut frame = VideoFrameFFmpeg::new(Pixel::YUV420P, 16, 4);
        let stride = frame.stride(0);
        for (i, sample) in frame.data_mut(0).iter_mut().enumerate() {
            *sample = if (i % stride) % 2 == 0 { 16 } else { 235 };
        }
        frame.data_mut(1).fill(128);
        frame.data_mut(2).fill(128);

        let mut converter = FrameConverter::default();
        let view = converter.convert(&RawFrame::from(frame)).unwrap();

        let mut levels: Vec<u8> = view.rows().flatten().copied().collect();
        levels.sort_unstable();
        levels.dedup();
        assert_eq!(levels.len(), 2);
        assert!(view.row(0)[0] < view.row(0)[1]);
    }

    #[test]
    fn same_geometry_reuses_the_output_buffer() {
        let mut converter = FrameConverter::default();

        let first = converter.convert(&gray_frame(8, 4, 0)).unwrap().data.as_ptr();
        let second = converter.convert(&yuv_frame(8, 4, 90)).unwrap().data.as_ptr();

        assert_eq!(first, second);
        assert_eq!(converter.allocations(), 1);
        assert_eq!(converter.geometry(), Some((8, 4)));
    }

    #[test]
    fn geometry_change_reallocates_by_default() {
        let mut converter = FrameConverter::default();
        converter.convert(&gray_frame(8, 4, 0)).unwrap();

        let view = converter.convert(&gray_frame(6, 2, 0)).unwrap();
        assert_eq!((view.width, view.height), (6, 2));
        assert_eq!(view.row(1), &[10, 11, 12, 13, 14, 15]);
        assert_eq!(converter.allocations(), 2);
    }

    #[test]
    fn geometry_change_can_be_rejected() {
        let mut converter = FrameConverter::new(GeometryPolicy::Reject);
        converter.convert(&gray_frame(8, 4, 0)).unwrap();

        let err = converter.convert(&gray_frame(6, 2, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(converter.geometry(), Some((8, 4)));
    }

    #[test]
    fn degenerate_frames_are_refused() {
        let mut converter = FrameConverter::default();
        let err = converter
            .convert(&RawFrame::from(VideoFrameFFmpeg::empty()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(converter.allocations(), 0);
    }

    #[test]
    fn reset_forgets_the_output_buffer() {
        let mut converter = FrameConverter::default();
        converter.convert(&gray_frame(4, 4, 0)).unwrap();
        converter.reset();

        assert_eq!(converter.geometry(), None);
        converter.convert(&gray_frame(4, 4, 0)).unwrap();
        assert_eq!(converter.allocations(), 2);
    }
}
