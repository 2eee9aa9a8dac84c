/*!
    Stream description types.
*/

/**
    A rational number, used for frame rates.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /**
        Returns the value as a float, or `None` when it is zero or undefined.
    */
    pub fn to_positive_f64(self) -> Option<f64> {
        if self.num <= 0 || self.den <= 0 {
            return None;
        }
        Some(self.num as f64 / self.den as f64)
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/**
    Media kind of an elementary stream inside a container.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    Unknown,
}

impl StreamKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::Data => "data",
            Self::Attachment => "attachment",
            Self::Unknown => "unknown",
        }
    }
}

/**
    Metadata for one stream discovered while probing a container.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    /// Index of the stream inside the container.
    pub index: usize,
    /// Media kind.
    pub kind: StreamKind,
    /// Short codec name as reported by the codec library (e.g. `"h264"`).
    pub codec: String,
    /// Coded width in pixels (0 for non-video streams or when unknown).
    pub width: u32,
    /// Coded height in pixels (0 for non-video streams or when unknown).
    pub height: u32,
    /// Average frame rate, if the container declares one.
    pub frame_rate: Option<Rational>,
    /// Set for still images embedded as cover art.
    pub attached_picture: bool,
}

impl StreamInfo {
    /**
        Returns true if this stream can be selected as the video stream.
    */
    pub fn is_decodable_video(&self) -> bool {
        self.kind == StreamKind::Video && !self.attached_picture
    }

    /**
        Selection score: pixel count times frames per second.

        Streams without a usable frame rate count as one frame per second.
    */
    pub fn score(&self) -> f64 {
        let pixels = self.width as f64 * self.height as f64;
        let fps = self
            .frame_rate
            .and_then(Rational::to_positive_f64)
            .unwrap_or(1.0);
        pixels * fps
    }
}
