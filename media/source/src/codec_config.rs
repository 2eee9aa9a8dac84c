/*!
    Opaque codec configuration for passing to decoders.
*/

use ffmpeg_next::codec;

/**
    Codec configuration copied out of a container stream.

    Holds a detached copy of the stream's codec parameters, so a decoder built
    from it keeps no reference into the demuxer's format context. Pass this to
    `media-decode` to open a decoder for the stream.
*/
pub struct CodecConfig {
    parameters: codec::Parameters,
    stream_index: usize,
}

impl CodecConfig {
    /**
        Copy `parameters`, detaching them from the format context that owns them.
    */
    pub(crate) fn new(parameters: &codec::Parameters, stream_index: usize) -> Self {
        Self {
            parameters: parameters.clone(),
            stream_index,
        }
    }

    /**
        Index of the container stream these parameters describe.
    */
    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /**
        Codec identifier of the stream.
    */
    pub fn codec_id(&self) -> codec::Id {
        self.parameters.id()
    }

    /**
        Consume the config, returning the owned codec parameters.
    */
    pub fn into_parameters(self) -> codec::Parameters {
        self.parameters
    }
}

impl Clone for CodecConfig {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            stream_index: self.stream_index,
        }
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("stream_index", &self.stream_index)
            .field("codec_id", &self.parameters.id())
            .finish_non_exhaustive()
    }
}
