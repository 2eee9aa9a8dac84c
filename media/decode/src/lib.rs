/*!
    Video decoding for the media decode pipeline.

    This crate turns encoded packets into raw frames. A packet may produce
    zero, one or several frames, and frames may surface several packets after
    the data that encoded them; the decoder hides how the underlying codec
    library schedules that behind a single `decode` call.
*/

mod video;

pub use video::{RawFrame, StreamDecoder};
