//! Row-major RGBA pixel buffer, stretch resampling, and channel inversion.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::{EngineError, Result};

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// An owned RGBA8 image: `data.len() == width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer with every byte zero (transparent black).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    /// Wrap raw RGBA bytes, rejecting a length that does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != byte_len(width, height) {
            return Err(EngineError::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer filled with a single RGBA value.
    pub fn from_pixel(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(byte_len(width, height))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Iterate pixels as `[R, G, B, A]` slices in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Write the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&pixel);
    }

    /// Stretch to exactly `width`x`height`, ignoring aspect ratio.
    ///
    /// Uses bilinear (Triangle) filtering. Returns a copy unchanged if the
    /// buffer already has the target dimensions.
    pub fn resize_exact(&self, width: u32, height: u32) -> Self {
        if self.dimensions() == (width, height) {
            debug!(width, height, "Buffer already at target size, skipping resample");
            return self.clone();
        }

        debug!(
            orig_w = self.width,
            orig_h = self.height,
            new_width = width,
            new_height = height,
            "Stretching buffer to canvas size"
        );

        let resized = imageops::resize(&self.to_rgba_image(), width, height, FilterType::Triangle);
        Self::from(resized)
    }

    /// Copy into an [`RgbaImage`] for use with the `image` crate.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("len == width*height*4")
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl From<PixelBuffer> for RgbaImage {
    fn from(buf: PixelBuffer) -> Self {
        let (width, height) = buf.dimensions();
        RgbaImage::from_raw(width, height, buf.data).expect("len == width*height*4")
    }
}

/// Return a copy with R, G, B replaced by `255 - value`; alpha is kept.
///
/// Applying it twice yields the original buffer.
pub fn invert_channels(buf: &PixelBuffer) -> PixelBuffer {
    let mut out = buf.clone();
    invert_in_place(&mut out);
    out
}

/// In-place variant of [`invert_channels`].
pub fn invert_in_place(buf: &mut PixelBuffer) {
    debug!(width = buf.width, height = buf.height, "Inverting color channels");
    for px in buf.data.chunks_exact_mut(CHANNELS) {
        invert_rgb(px);
    }
}

/// Invert the first three channels of one RGBA pixel.
#[inline]
pub(crate) fn invert_rgb(px: &mut [u8]) {
    px[0] = 255 - px[0];
    px[1] = 255 - px[1];
    px[2] = 255 - px[2];
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a buffer where every pixel has a distinct color.
    fn create_pattern_buffer(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 31 + y * 17) % 256) as u8;
                buf.put_pixel(x, y, [v, v.wrapping_add(60), 255 - v, (x * 40 % 256) as u8]);
            }
        }
        buf
    }

    #[test]
    fn test_new_is_zeroed() {
        let buf = PixelBuffer::new(3, 2);
        assert_eq!(buf.as_raw().len(), 24);
        assert!(buf.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidDimensions {
                width: 2,
                height: 2,
                len: 15
            }
        ));
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_from_pixel_fills_every_pixel() {
        let buf = PixelBuffer::from_pixel(4, 3, [1, 2, 3, 4]);
        assert_eq!(buf.pixel_count(), 12);
        assert!(buf.pixels().all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn test_put_and_get_pixel() {
        let mut buf = PixelBuffer::new(5, 5);
        buf.put_pixel(4, 2, [9, 8, 7, 6]);
        assert_eq!(buf.pixel(4, 2), [9, 8, 7, 6]);
        assert_eq!(buf.pixel(3, 2), [0, 0, 0, 0]);
        // Row-major layout
        assert_eq!(&buf.as_raw()[(2 * 5 + 4) * 4..(2 * 5 + 4) * 4 + 4], &[9, 8, 7, 6]);
    }

    #[test]
    fn test_invert_channels_keeps_alpha() {
        let buf = PixelBuffer::from_pixel(2, 2, [10, 200, 0, 77]);
        let inv = invert_channels(&buf);
        assert!(inv.pixels().all(|p| p == [245, 55, 255, 77]));
        // Source untouched
        assert_eq!(buf.pixel(0, 0), [10, 200, 0, 77]);
    }

    #[test]
    fn test_invert_channels_is_involution() {
        let buf = create_pattern_buffer(7, 5);
        assert_eq!(invert_channels(&invert_channels(&buf)), buf);
    }

    #[test]
    fn test_resize_exact_stretches() {
        let buf = PixelBuffer::from_pixel(4, 2, [128, 128, 128, 255]);
        let out = buf.resize_exact(3, 9);
        assert_eq!(out.dimensions(), (3, 9));
        assert_eq!(out.as_raw().len(), 3 * 9 * 4);
        // Uniform input stays uniform under filtering
        assert!(out.pixels().all(|p| p == [128, 128, 128, 255]));
    }

    #[test]
    fn test_resize_exact_same_size_is_identity() {
        let buf = create_pattern_buffer(6, 4);
        assert_eq!(buf.resize_exact(6, 4), buf);
    }

    #[test]
    fn test_rgba_image_conversion_preserves_bytes() {
        let buf = create_pattern_buffer(3, 3);
        let img: RgbaImage = buf.clone().into();
        assert_eq!(img.dimensions(), (3, 3));
        assert_eq!(PixelBuffer::from(img), buf);
    }

    #[test]
    fn test_rgba_image_conversion_of_zero_sized_buffer() {
        let buf = PixelBuffer::new(0, 5);
        assert_eq!(buf.to_rgba_image().dimensions(), (0, 5));
        let img: RgbaImage = buf.into();
        assert_eq!(img.dimensions(), (0, 5));
    }
}
