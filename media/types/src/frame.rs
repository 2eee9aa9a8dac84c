/*!
    Converted frame view handed to frame consumers.
*/

/**
    A borrowed, single-channel 8-bit frame.

    `data` covers `stride * height` bytes. Each row starts `stride` bytes after
    the previous one; only the first `width` bytes of a row are pixels, the rest
    is alignment padding. The view borrows the converter's output buffer and
    must not outlive the callback it was passed to.
*/
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    /// Pixel rows, `stride * height` bytes.
    pub data: &'a [u8],
    /// Bytes between the start of consecutive rows (always `>= width`).
    pub stride: usize,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Presentation timestamp in stream time base, if the decoder reported one.
    pub pts: Option<i64>,
}

impl<'a> FrameView<'a> {
    /**
        Returns the pixels of row `y`, without padding.

        # Panics

        Panics if `y >= height`.
    */
    pub fn row(&self, y: u32) -> &'a [u8] {
        assert!(y < self.height, "row {y} out of bounds ({})", self.height);
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize]
    }

    /**
        Returns the sample at column `x` of row `y`.
    */
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.row(y)[x as usize]
    }

    /**
        Iterates over every row, without padding.
    */
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + use<'a> {
        let view = *self;
        (0..view.height).map(move |y| view.row(y))
    }

    /**
        Mean sample value over the visible pixels.
    */
    pub fn mean(&self) -> f64 {
        let count = self.width as u64 * self.height as u64;
        if count == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .rows()
            .flat_map(|row| row.iter())
            .map(|&v| v as u64)
            .sum();
        sum as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded() -> Vec<u8> {
        // 3x2 pixels with a stride of 4; padding bytes are 0xFF.
        vec![1, 2, 3, 0xFF, 4, 5, 6, 0xFF]
    }

    #[test]
    fn rows_skip_padding() {
        let data = padded();
        let view = FrameView {
            data: &data,
            stride: 4,
            width: 3,
            height: 2,
            pts: None,
        };

        assert_eq!(view.row(0), &[1, 2, 3]);
        assert_eq!(view.row(1), &[4, 5, 6]);
        assert_eq!(view.pixel(2, 1), 6);
        assert_eq!(view.rows().count(), 2);
    }

    #[test]
    fn mean_ignores_padding() {
        let data = padded();
        let view = FrameView {
            data: &data,
            stride: 4,
            width: 3,
            height: 2,
            pts: Some(0),
        };

        assert_eq!(view.mean(), 3.5);
    }

    #[test]
    #[should_panic]
    fn row_out_of_bounds_panics() {
        let data = padded();
        let view = FrameView {
            data: &data,
            stride: 4,
            width: 3,
            height: 2,
            pts: None,
        };
        view.row(2);
    }
}
