/*!
    Encoded packet read from the container.
*/

/**
    One container-level chunk of compressed data.

    Tagged with the index of the stream it belongs to, and with a count of
    bytes the decoder has not consumed yet. Decoders that take a whole packet
    per call zero the count in one step; incremental decoders reduce it as
    they go. The underlying FFmpeg buffer is released when the packet drops.
*/
pub struct Packet {
    inner: ffmpeg_next::Packet,
    remaining: usize,
}

impl Packet {
    pub fn new(inner: ffmpeg_next::Packet) -> Self {
        let remaining = inner.size();
        Self { inner, remaining }
    }

    /**
        Index of the container stream this packet belongs to.
    */
    pub fn stream_index(&self) -> usize {
        self.inner.stream()
    }

    /**
        Total payload size in bytes.
    */
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /**
        Bytes not yet consumed by a decoder.
    */
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /**
        Returns true once a decoder has consumed the whole payload.
    */
    pub fn is_consumed(&self) -> bool {
        self.remaining == 0
    }

    /**
        Record that a decoder consumed `bytes` of the payload.
    */
    pub fn consume(&mut self, bytes: usize) {
        self.remaining = self.remaining.saturating_sub(bytes);
    }

    pub fn pts(&self) -> Option<i64> {
        self.inner.pts()
    }

    /**
        The FFmpeg packet, for handing to a decoder.
    */
    pub fn as_ffmpeg(&self) -> &ffmpeg_next::Packet {
        &self.inner
    }
}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("stream_index", &self.stream_index())
            .field("size", &self.size())
            .field("remaining", &self.remaining)
            .field("pts", &self.pts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumption_is_tracked_and_saturates() {
        let mut packet = Packet::new(ffmpeg_next::Packet::copy(&[0u8; 10]));
        assert_eq!(packet.size(), 10);
        assert_eq!(packet.remaining(), 10);

        packet.consume(4);
        assert_eq!(packet.remaining(), 6);
        assert!(!packet.is_consumed());

        packet.consume(100);
        assert!(packet.is_consumed());
        assert_eq!(packet.size(), 10);
    }

    #[test]
    fn empty_packet_is_already_consumed() {
        let packet = Packet::new(ffmpeg_next::Packet::empty());
        assert!(packet.is_consumed());
    }
}
