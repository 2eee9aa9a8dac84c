/*!
    Frame format conversion for the media decode pipeline.

    This crate normalizes decoded frames of any source layout into a single
    fixed format: one channel, 8 bits per sample.
*/

mod gray;

pub use gray::{FrameConverter, GeometryPolicy};
