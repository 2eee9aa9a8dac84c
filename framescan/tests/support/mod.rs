//! In-memory container fixtures.

#![allow(dead_code)]

/// A YUV4MPEG2 stream of `width` x `height` 4:2:0 frames, one per entry of
/// `levels`, each frame's luma plane filled with that level.
pub fn y4m(width: usize, height: usize, levels: &[u8]) -> Vec<u8> {
    let mut data = format!("YUV4MPEG2 W{width} H{height} F25:1 Ip A1:1 C420jpeg\n").into_bytes();
    let chroma = width.div_ceil(2) * height.div_ceil(2);
    for &level in levels {
        data.extend_from_slice(b"FRAME\n");
        data.extend(std::iter::repeat_n(level, width * height));
        data.extend(std::iter::repeat_n(128u8, chroma * 2));
    }
    data
}

/// `frames` frames of a mid-gray `width` x `height` YUV4MPEG2 stream.
pub fn gray_y4m(width: usize, height: usize, frames: usize) -> Vec<u8> {
    y4m(width, height, &vec![128; frames])
}

/// A mono 16-bit PCM WAVE file: valid container, no video.
pub fn wav(samples: usize) -> Vec<u8> {
    let sample_rate: u32 = 8000;
    let data_len = (samples * 2) as u32;

    let mut data = Vec::with_capacity(44 + samples * 2);
    data.extend_from_slice(b"RIFF");
    data.extend_from_slice(&(36 + data_len).to_le_bytes());
    data.extend_from_slice(b"WAVE");

    data.extend_from_slice(b"fmt ");
    data.extend_from_slice(&16u32.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes()); // PCM
    data.extend_from_slice(&1u16.to_le_bytes()); // mono
    data.extend_from_slice(&sample_rate.to_le_bytes());
    data.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    data.extend_from_slice(&2u16.to_le_bytes());
    data.extend_from_slice(&16u16.to_le_bytes());

    data.extend_from_slice(b"data");
    data.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..samples {
        let sample = ((i % 64) as i16 - 32) * 512;
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Append a RIFF chunk, padded to an even length.
fn chunk(out: &mut Vec<u8>, id: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
}

/// A RIFF `LIST` chunk of type `kind` wrapping `body`.
fn list(out: &mut Vec<u8>, kind: &[u8; 4], body: &[u8]) {
    let mut payload = kind.to_vec();
    payload.extend_from_slice(body);
    chunk(out, b"LIST", &payload);
}

fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Stream header (`strh`) body.
fn strh(
    kind: &[u8; 4],
    handler: &[u8; 4],
    scale: u32,
    rate: u32,
    length: u32,
    sample_size: u32,
) -> Vec<u8> {
    let mut h = kind.to_vec();
    h.extend_from_slice(handler);
    h.extend(u32s(&[0])); // flags
    h.extend_from_slice(&[0; 4]); // priority, language
    h.extend(u32s(&[0, scale, rate, 0, length, 0, u32::MAX, sample_size]));
    h.extend_from_slice(&[0; 8]); // frame rectangle
    h
}

/// An AVI file holding a `width` x `height` 8-bit gray (`Y800`) video stream,
/// one chunk per entry of `frames`, written as given. Chunks shorter than
/// `width * height` are invalid frames for the decoder.
///
/// With `audio` set, a 16-bit mono PCM stream is added and one audio chunk is
/// interleaved after every video chunk.
pub fn avi(width: u32, height: u32, frames: &[Vec<u8>], audio: bool) -> Vec<u8> {
    let frame_size = width * height;
    let streams = if audio { 2 } else { 1 };
    let audio_chunk = 320usize;

    let mut hdrl = Vec::new();
    chunk(
        &mut hdrl,
        b"avih",
        &u32s(&[
            40_000, // microseconds per frame
            0,
            0,
            0, // flags: no index
            frames.len() as u32,
            0,
            streams,
            frame_size,
            width,
            height,
            0,
            0,
            0,
            0,
        ]),
    );

    let mut vstrl = Vec::new();
    chunk(&mut vstrl, b"strh", &strh(b"vids", b"Y800", 1, 25, frames.len() as u32, 0));
    let mut bih = u32s(&[40, width, height]);
    bih.extend_from_slice(&1u16.to_le_bytes()); // planes
    bih.extend_from_slice(&8u16.to_le_bytes()); // bits per pixel
    bih.extend_from_slice(b"Y800");
    bih.extend(u32s(&[frame_size, 0, 0, 0, 0]));
    chunk(&mut vstrl, b"strf", &bih);
    list(&mut hdrl, b"strl", &vstrl);

    if audio {
        let mut astrl = Vec::new();
        chunk(
            &mut astrl,
            b"strh",
            &strh(b"auds", &[0; 4], 2, 16_000, (frames.len() * audio_chunk / 2) as u32, 2),
        );
        let mut wfx = Vec::new();
        wfx.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wfx.extend_from_slice(&1u16.to_le_bytes()); // mono
        wfx.extend(u32s(&[8000, 16_000]));
        wfx.extend_from_slice(&2u16.to_le_bytes()); // block align
        wfx.extend_from_slice(&16u16.to_le_bytes());
        chunk(&mut astrl, b"strf", &wfx);
        list(&mut hdrl, b"strl", &astrl);
    }

    let mut movi = Vec::new();
    for frame in frames {
        chunk(&mut movi, b"00db", frame);
        if audio {
            chunk(&mut movi, b"01wb", &vec![0u8; audio_chunk]);
        }
    }

    let mut body = b"AVI ".to_vec();
    list(&mut body, b"hdrl", &hdrl);
    list(&mut body, b"movi", &movi);

    let mut data = Vec::new();
    chunk(&mut data, b"RIFF", &body);
    data
}

/// `count` flat gray frame payloads for [`avi`].
pub fn avi_frames(width: u32, height: u32, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| vec![40 + 50 * i as u8; (width * height) as usize])
        .collect()
}
