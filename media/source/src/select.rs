/*!
    Deterministic choice of the video stream to decode.
*/

use media_types::StreamInfo;

/**
    Pick the best video stream out of `streams`.

    Only video streams that are not cover art qualify. The stream with the
    highest [`StreamInfo::score`] (pixels times frame rate) wins; ties go to
    the lowest stream index. Returns `None` when nothing qualifies.
*/
pub fn select_best_video(streams: &[StreamInfo]) -> Option<&StreamInfo> {
    streams
        .iter()
        .filter(|stream| stream.is_decodable_video())
        .fold(None, |best: Option<&StreamInfo>, candidate| match best {
            Some(current) if !beats(candidate, current) => Some(current),
            _ => Some(candidate),
        })
}

fn beats(candidate: &StreamInfo, current: &StreamInfo) -> bool {
    let (a, b) = (candidate.score(), current.score());
    a > b || (a == b && candidate.index < current.index)
}
