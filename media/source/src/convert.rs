/*!
    Conversion utilities between ffmpeg-next types and media-types.
*/

use ffmpeg_next::{ffi, media};

use media_types::{Rational, StreamKind};

pub(crate) fn rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Rational {
    Rational::new(r.numerator(), r.denominator())
}

pub(crate) fn kind_from_ffmpeg(kind: media::Type) -> StreamKind {
    match kind {
        media::Type::Video => StreamKind::Video,
        media::Type::Audio => StreamKind::Audio,
        media::Type::Subtitle => StreamKind::Subtitle,
        media::Type::Data => StreamKind::Data,
        media::Type::Attachment => StreamKind::Attachment,
        media::Type::Unknown => StreamKind::Unknown,
    }
}

/**
    Returns true for FFmpeg's "try again" signal.

    Both the demuxer and the decoder use it for flow control ("need more
    input" / "drain output first"); it is never a failure.
*/
pub fn is_again(err: &ffmpeg_next::Error) -> bool {
    matches!(err, ffmpeg_next::Error::Other { errno } if *errno == ffi::EAGAIN)
}
