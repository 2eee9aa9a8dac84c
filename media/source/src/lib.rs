/*!
    In-memory input and container demuxing.

    This crate handles the input side of the pipeline. It exposes a
    caller-owned byte buffer to FFmpeg as a seekable stream, parses the
    container held in it, picks the video stream to decode and produces the
    encoded packets that the decoder consumes.
*/

mod avio;
mod codec_config;
mod convert;
mod demux;
mod packet;
mod reader;
mod select;

pub use avio::AvioContext;
pub use codec_config::CodecConfig;
pub use convert::is_again;
pub use demux::{ContainerDemuxer, DEFAULT_IO_BUFFER_SIZE};
pub use packet::Packet;
pub use reader::{MemoryReader, ReadChunk, Whence};
pub use select::select_best_video;
