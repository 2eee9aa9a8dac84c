/*!
    Boundary to the object detector that consumes decoded frames.
*/

use std::ops::ControlFlow;

use media_types::{FrameView, Result};

use crate::pipeline::{DecodePipeline, RunSummary};

/**
    What a detector found in one frame.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Detection {
    /// Primary objects found (e.g. faces).
    pub primary: u32,
    /// Sub-objects found across all primary objects (e.g. eyes).
    pub secondary: u32,
}

/**
    Anything that inspects grayscale frames and counts what it sees.

    Implemented for closures taking a frame view, so ad hoc detectors need no
    named type.
*/
pub trait Detector {
    fn detect(&mut self, frame: &FrameView<'_>) -> Detection;
}

impl<F> Detector for F
where
    F: FnMut(&FrameView<'_>) -> Detection,
{
    fn detect(&mut self, frame: &FrameView<'_>) -> Detection {
        self(frame)
    }
}

/**
    Totals accumulated by [`scan`].
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Frames handed to the detector.
    pub frames: u64,
    pub primary_total: u64,
    pub secondary_total: u64,
    /// Counters from the underlying pipeline run.
    pub run: RunSummary,
}

/**
    Run `pipeline` and feed every frame to `detector`.

    With `max_frames` set, the run stops once that many frames have been
    inspected. A limit of zero returns an empty report without running the
    pipeline, which stays `Configured`. Otherwise the pipeline must be in the
    `Configured` state.
*/
pub fn scan<D>(
    pipeline: &mut DecodePipeline<'_>,
    detector: &mut D,
    max_frames: Option<u64>,
) -> Result<ScanReport>
where
    D: Detector + ?Sized,
{
    let mut report = ScanReport::default();
    if max_frames == Some(0) {
        tracing::debug!("frame limit is zero, nothing to scan");
        return Ok(report);
    }
    let limit_reached = |frames: u64| max_frames.is_some_and(|max| frames >= max);

    report.run = pipeline.process(|frame, origin| {
        let found = detector.detect(frame);
        report.frames += 1;
        report.primary_total += u64::from(found.primary);
        report.secondary_total += u64::from(found.secondary);

        tracing::trace!(
            frame = origin.index,
            primary = found.primary,
            secondary = found.secondary,
            "frame scanned"
        );

        if limit_reached(report.frames) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    Ok(report)
}

/**
    Stand-in detector built on frame brightness.

    Counts a frame as one primary hit when its mean luminance reaches the
    threshold, and one secondary hit per row brighter than that threshold
    within such a frame. Keeps the running mean brightness of everything it
    has seen.
*/
#[derive(Clone, Debug)]
pub struct LumaStats {
    threshold: f64,
    frames: u64,
    brightness_sum: f64,
}

impl LumaStats {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: f64::from(threshold),
            frames: 0,
            brightness_sum: 0.0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /**
        Mean brightness over all frames seen, or `None` before the first one.
    */
    pub fn mean_brightness(&self) -> Option<f64> {
        (self.frames > 0).then(|| self.brightness_sum / self.frames as f64)
    }
}

impl Default for LumaStats {
    fn default() -> Self {
        Self::new(128)
    }
}

impl Detector for LumaStats {
    fn detect(&mut self, frame: &FrameView<'_>) -> Detection {
        let mean = frame.mean();
        self.frames += 1;
        self.brightness_sum += mean;

        if mean < self.threshold {
            return Detection::default();
        }

        let width = frame.width as f64;
        let bright_rows = frame
            .rows()
            .filter(|row| row.iter().map(|&p| f64::from(p)).sum::<f64>() / width >= self.threshold)
            .count();

        Detection {
            primary: 1,
            secondary: u32::try_from(bright_rows).unwrap_or(u32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(data: &[u8], width: u32, height: u32) -> FrameView<'_> {
        FrameView {
            data,
            stride: width as usize,
            width,
            height,
            pts: None,
        }
    }

    #[test]
    fn closures_are_detectors() {
        let mut calls = 0;
        let mut detector = |frame: &FrameView<'_>| {
            calls += 1;
            Detection {
                primary: frame.width,
                secondary: 0,
            }
        };

        let data = [0u8; 6];
        let found = detector.detect(&view(&data, 3, 2));
        assert_eq!(found.primary, 3);
        assert_eq!(calls, 1);
    }

    #[test]
    fn dark_frames_yield_nothing() {
        let mut stats = LumaStats::default();
        let data = [10u8; 16];

        assert_eq!(stats.detect(&view(&data, 4, 4)), Detection::default());
        assert_eq!(stats.frames(), 1);
        assert_eq!(stats.mean_brightness(), Some(10.0));
    }

    #[test]
    fn bright_rows_are_counted() {
        let mut stats = LumaStats::new(100);
        #[rustfmt::skip]
        let data = [
            200, 200, 200, 200,
            200, 200, 200, 200,
            200, 200, 200, 200,
              0,   0,   0,   0,
        ];

        let found = stats.detect(&view(&data, 4, 4));
        assert_eq!(
            found,
            Detection {
                primary: 1,
                secondary: 3
            }
        );
    }

    #[test]
    fn mean_brightness_needs_a_frame() {
        assert_eq!(LumaStats::default().mean_brightness(), None);
    }
}
