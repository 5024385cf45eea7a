//! Sequential composite merging of several images into one.

use tracing::debug;

use crate::blend::{BlendMode, BlendOp, resolve_mode};
use crate::buffer::{CHANNELS, PixelBuffer, invert_channels};
use crate::{EngineError, Result};

/// Result of [`merge`].
///
/// `committed` is the blended image before inversion. `display` is what the
/// caller shows: `committed` itself, or its inverse when `invert` is set.
/// Toggling inversion only ever recomputes `display` from `committed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    committed: PixelBuffer,
    display: PixelBuffer,
    invert: bool,
    ops: Vec<BlendOp>,
}

impl Composite {
    fn new(committed: PixelBuffer, invert: bool, ops: Vec<BlendOp>) -> Self {
        let display = if invert {
            invert_channels(&committed)
        } else {
            committed.clone()
        };
        Self {
            committed,
            display,
            invert,
            ops,
        }
    }

    /// The pre-inversion blend result.
    pub fn committed(&self) -> &PixelBuffer {
        &self.committed
    }

    /// The result as it should be shown.
    pub fn display(&self) -> &PixelBuffer {
        &self.display
    }

    pub fn into_display(self) -> PixelBuffer {
        self.display
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    /// Blend op applied to each image after the first, in input order.
    pub fn ops(&self) -> &[BlendOp] {
        &self.ops
    }

    /// Switch inversion on or off without re-running the blend.
    pub fn set_invert(&mut self, invert: bool) {
        if invert == self.invert {
            return;
        }
        self.display = if invert {
            invert_channels(&self.committed)
        } else {
            self.committed.clone()
        };
        self.invert = invert;
    }
}

/// Blend `images` in order onto a canvas the size of the first image.
///
/// Each later image is stretched to the canvas size and blended over R, G, B
/// with the op picked by [`resolve_mode`]. The canvas keeps the first image's
/// alpha. Fails with [`EngineError::InsufficientInputs`] for fewer than two
/// images and [`EngineError::EmptyImage`] for a zero-sized one, before any
/// blending happens.
pub fn merge(images: &[PixelBuffer], mode: BlendMode, invert: bool) -> Result<Composite> {
    if images.len() < 2 {
        return Err(EngineError::InsufficientInputs { got: images.len() });
    }
    if let Some(index) = images.iter().position(PixelBuffer::is_empty) {
        return Err(EngineError::EmptyImage { index });
    }

    let (width, height) = images[0].dimensions();
    debug!(width, height, count = images.len(), %mode, invert, "Merging images");

    let mut acc = images[0].clone();
    let mut ops = Vec::with_capacity(images.len() - 1);

    for (index, img) in images.iter().enumerate().skip(1) {
        let op = resolve_mode(mode, img);
        let resampled = img.resize_exact(width, height);
        debug!(index, ?op, "Blending image onto canvas");

        for (dst, src) in acc
            .as_raw_mut()
            .chunks_exact_mut(CHANNELS)
            .zip(resampled.as_raw().chunks_exact(CHANNELS))
        {
            op.apply_rgb(dst, src);
        }
        ops.push(op);
    }

    debug!("Merge complete");
    Ok(Composite::new(acc, invert, ops))
}
