use media_source::DEFAULT_IO_BUFFER_SIZE;
use media_transform::GeometryPolicy;

/**
    Settings for one [`DecodePipeline`](crate::DecodePipeline) instance.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Label attached to every diagnostic the pipeline emits.
    pub label: String,
    /// Size of the staging window the demuxer reads through, in bytes.
    pub io_buffer_size: usize,
    /// How the converter reacts when frame geometry changes mid-stream.
    pub geometry_policy: GeometryPolicy,
    /// Drain frames still buffered in the decoder once the container ends.
    pub flush_at_end: bool,
}

impl PipelineConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /**
        Set the staging window size. Zero is rejected when the pipeline is
        configured.
    */
    pub fn with_io_buffer_size(mut self, size: usize) -> Self {
        self.io_buffer_size = size;
        self
    }

    pub fn with_geometry_policy(mut self, policy: GeometryPolicy) -> Self {
        self.geometry_policy = policy;
        self
    }

    pub fn with_flush_at_end(mut self, flush: bool) -> Self {
        self.flush_at_end = flush;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "framescan".to_string(),
            io_buffer_size: DEFAULT_IO_BUFFER_SIZE,
            geometry_policy: GeometryPolicy::default(),
            flush_at_end: true,
        }
    }
}
