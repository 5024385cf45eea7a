//! Conversion between encoded image bytes and [`PixelBuffer`].

use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::{EngineError, Result};

/// Decode any format the `image` crate understands into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    let img = image::load_from_memory(bytes).map_err(|e| EngineError::Decode(e.to_string()))?;
    debug!(
        width = img.width(),
        height = img.height(),
        color = ?img.color(),
        "Decoded image"
    );
    Ok(PixelBuffer::from(img.to_rgba8()))
}

/// Encode a buffer as PNG.
pub fn encode_png(buf: &PixelBuffer) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    buf.to_rgba_image()
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| EngineError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Read and decode an image file.
pub fn load(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading image");
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode a buffer as PNG and write it to `path`.
pub fn save_png(path: impl AsRef<Path>, buf: &PixelBuffer) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_png(buf)?;
    std::fs::write(path, bytes)?;
    debug!(path = %path.display(), "Saved PNG");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_preserves_pixels() {
        let mut buf = PixelBuffer::from_pixel(5, 3, [12, 34, 56, 78]);
        buf.put_pixel(4, 2, [255, 0, 128, 0]);
        let bytes = encode_png(&buf).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(decode(&bytes).unwrap(), buf);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load("/nonexistent/dir/image.png").unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("layer-engine-codec-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.png");

        let buf = PixelBuffer::from_pixel(4, 4, [1, 2, 3, 255]);
        save_png(&path, &buf).unwrap();
        assert_eq!(load(&path).unwrap(), buf);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
