//! Background classification by near-white / near-black pixel counting.
//!
//! A pixel is near-white when all of R, G, B exceed 240, near-black when all
//! are below 15. An image counts as having a white (or black) background when
//! more than 40% of its pixels are near-white (or near-black).

use tracing::debug;

use crate::buffer::PixelBuffer;

/// Channel values above this count as near-white.
const WHITE_THRESHOLD: u8 = 240;
/// Channel values below this count as near-black.
const BLACK_THRESHOLD: u8 = 15;
/// Fraction of pixels that must match for a background to be detected.
const BACKGROUND_RATIO: f64 = 0.4;

/// Derived background label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundClass {
    White,
    Black,
    Mixed,
}

/// Raw counts gathered by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundStats {
    pub white_count: usize,
    pub black_count: usize,
    pub total: usize,
}

impl BackgroundStats {
    pub fn is_white(&self) -> bool {
        exceeds_ratio(self.white_count, self.total)
    }

    pub fn is_black(&self) -> bool {
        exceeds_ratio(self.black_count, self.total)
    }

    /// Collapse the two flags into one label. White wins when both are set.
    pub fn class(&self) -> BackgroundClass {
        if self.is_white() {
            BackgroundClass::White
        } else if self.is_black() {
            BackgroundClass::Black
        } else {
            BackgroundClass::Mixed
        }
    }
}

/// Count near-white and near-black pixels of `buf`.
pub fn classify(buf: &PixelBuffer) -> BackgroundStats {
    let mut white_count = 0;
    let mut black_count = 0;

    for px in buf.pixels() {
        let (r, g, b) = (px[0], px[1], px[2]);
        if r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD {
            white_count += 1;
        } else if r < BLACK_THRESHOLD && g < BLACK_THRESHOLD && b < BLACK_THRESHOLD {
            black_count += 1;
        }
    }

    let stats = BackgroundStats {
        white_count,
        black_count,
        total: buf.pixel_count(),
    };
    debug!(
        white_count,
        black_count,
        total = stats.total,
        class = ?stats.class(),
        "Classified background"
    );
    stats
}

// An empty image has no background of either kind.
fn exceeds_ratio(count: usize, total: usize) -> bool {
    total > 0 && count as f64 / total as f64 > BACKGROUND_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a 10x10 image whose first `n` pixels are `a` and the rest `b`.
    fn create_split_image(n: usize, a: [u8; 4], b: [u8; 4]) -> PixelBuffer {
        let mut buf = PixelBuffer::from_pixel(10, 10, b);
        for i in 0..n as u32 {
            buf.put_pixel(i % 10, i / 10, a);
        }
        buf
    }

    #[test]
    fn test_all_white_is_white() {
        let buf = PixelBuffer::from_pixel(10, 10, [255, 255, 255, 255]);
        let stats = classify(&buf);
        assert!(stats.is_white());
        assert!(!stats.is_black());
        assert_eq!(stats.class(), BackgroundClass::White);
    }

    #[test]
    fn test_all_black_is_black() {
        let buf = PixelBuffer::from_pixel(10, 10, [0, 0, 0, 255]);
        let stats = classify(&buf);
        assert!(!stats.is_white());
        assert!(stats.is_black());
        assert_eq!(stats.class(), BackgroundClass::Black);
    }

    #[test]
    fn test_thirty_percent_white_is_mixed() {
        let buf = create_split_image(30, [255, 255, 255, 255], [128, 128, 128, 255]);
        let stats = classify(&buf);
        assert_eq!(stats.white_count, 30);
        assert_eq!(stats.black_count, 0);
        assert_eq!(stats.class(), BackgroundClass::Mixed);
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        // Exactly 40% white is not enough
        let at = create_split_image(40, [255, 255, 255, 255], [128, 128, 128, 255]);
        assert!(!classify(&at).is_white());

        let above = create_split_image(41, [255, 255, 255, 255], [128, 128, 128, 255]);
        assert!(classify(&above).is_white());
    }

    #[test]
    fn test_channel_bounds_are_exclusive() {
        // 240 is not near-white, 15 is not near-black
        let buf = create_split_image(50, [240, 255, 255, 255], [15, 0, 0, 255]);
        let stats = classify(&buf);
        assert_eq!(stats.white_count, 0);
        assert_eq!(stats.black_count, 0);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let buf = PixelBuffer::from_pixel(10, 10, [250, 250, 250, 0]);
        assert!(classify(&buf).is_white());
    }

    #[test]
    fn test_half_and_half_prefers_white() {
        let buf = create_split_image(50, [255, 255, 255, 255], [0, 0, 0, 255]);
        let stats = classify(&buf);
        assert!(stats.is_white());
        assert!(stats.is_black());
        assert_eq!(stats.class(), BackgroundClass::White);
    }

    #[test]
    fn test_empty_image_is_mixed() {
        let stats = classify(&PixelBuffer::new(0, 0));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.class(), BackgroundClass::Mixed);
    }
}
