/*!
    Decode a media container held entirely in memory and push every video
    frame, converted to 8-bit grayscale, to a caller-supplied callback.

    ```text
    bytes -> MemoryReader -> ContainerDemuxer -> StreamDecoder -> FrameConverter -> callback
    ```

    [`DecodePipeline`] owns every stage and drives a single synchronous pull
    loop. [`scan`] runs a pipeline against a [`Detector`] and totals its
    findings.
*/

mod config;
mod detect;
mod pipeline;

pub use config::PipelineConfig;
pub use detect::{Detection, Detector, LumaStats, ScanReport, scan};
pub use pipeline::{DecodePipeline, FrameOrigin, PipelineState, RunSummary};

pub use media_source::DEFAULT_IO_BUFFER_SIZE;
pub use media_transform::GeometryPolicy;
pub use media_types::{Error, ErrorKind, FrameView, Result, StreamInfo};
