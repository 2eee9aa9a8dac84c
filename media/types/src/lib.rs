/*!
    Shared types for the in-memory media decode pipeline.

    This crate defines the vocabulary that crosses crate boundaries: the error
    taxonomy, stream descriptions and the converted frame view. It has no
    dependency on FFmpeg, so consumers of decoded frames can depend on it
    without pulling in FFmpeg bindings.
*/

mod error;
mod frame;
mod stream;

pub use error::{Error, ErrorKind, Result};
pub use frame::FrameView;
pub use stream::{Rational, StreamInfo, StreamKind};
