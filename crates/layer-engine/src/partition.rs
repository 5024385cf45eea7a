//! Block-randomized partitioning of one image into sparse layers.
//!
//! Every pixel of the source lands in exactly one layer (the one owning its
//! block); all other layers hold transparent black at that position, so the
//! union of the layers recovers the source.

use tracing::debug;

use crate::buffer::{CHANNELS, PixelBuffer, invert_rgb};
use crate::seed::Seed;
use crate::shuffle::{Assignment, assign};
use crate::{BLOCK_SIZE_RANGE, EngineError, LAYER_COUNT_RANGE, Result};

/// Parameters for [`split`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOptions {
    pub layer_count: u32,
    pub block_size: u32,
    pub invert: bool,
    pub seed: Seed,
}

impl SplitOptions {
    /// Build options, clamping layer count and block size into their ranges.
    pub fn clamped(layer_count: u32, block_size: u32, invert: bool, seed: Seed) -> Self {
        Self {
            layer_count: layer_count.clamp(LAYER_COUNT_RANGE.0, LAYER_COUNT_RANGE.1),
            block_size: block_size.clamp(BLOCK_SIZE_RANGE.0, BLOCK_SIZE_RANGE.1),
            invert,
            seed,
        }
    }

    /// Check layer count and block size against their ranges.
    pub fn validate(&self) -> Result<()> {
        let (min_layers, max_layers) = LAYER_COUNT_RANGE;
        if !(min_layers..=max_layers).contains(&self.layer_count) {
            return Err(EngineError::InvalidParameters(format!(
                "layer count must be between {min_layers} and {max_layers}, got {}",
                self.layer_count
            )));
        }
        let (min_block, max_block) = BLOCK_SIZE_RANGE;
        if !(min_block..=max_block).contains(&self.block_size) {
            return Err(EngineError::InvalidParameters(format!(
                "block size must be between {min_block} and {max_block}, got {}",
                self.block_size
            )));
        }
        Ok(())
    }

    /// Same options with a different seed.
    pub fn with_seed(self, seed: Seed) -> Self {
        Self { seed, ..self }
    }
}

/// Split `source` into `options.layer_count` layers of the same size.
///
/// Layers come back in index order. Parameters are validated before any
/// layer is allocated.
pub fn split(source: &PixelBuffer, options: &SplitOptions) -> Result<Vec<PixelBuffer>> {
    split_with_assignment(source, options).map(|(layers, _)| layers)
}

/// Like [`split`], also returning the block assignment the layers follow.
pub fn split_with_assignment(
    source: &PixelBuffer,
    options: &SplitOptions,
) -> Result<(Vec<PixelBuffer>, Assignment)> {
    options.validate()?;

    let (width, height) = source.dimensions();
    let assignment = assign(
        width,
        height,
        options.block_size,
        options.layer_count,
        options.seed,
    )?;
    debug!(
        width,
        height,
        layer_count = options.layer_count,
        block_size = options.block_size,
        invert = options.invert,
        blocks_per_layer = ?assignment.blocks_per_layer(),
        "Splitting image into layers"
    );

    let mut layers: Vec<PixelBuffer> = (0..options.layer_count)
        .map(|_| PixelBuffer::new(width, height))
        .collect();
    if source.is_empty() {
        return Ok((layers, assignment));
    }

    let row_len = width as usize * CHANNELS;
    let block_size = options.block_size as usize;

    // Each source row writes only the matching row of each layer.
    for (y, src_row) in source.as_raw().chunks_exact(row_len).enumerate() {
        let block_row = assignment.block_row((y / block_size) as u32);
        let start = y * row_len;

        for (x, px) in src_row.chunks_exact(CHANNELS).enumerate() {
            let layer = block_row[x / block_size] as usize;
            let offset = start + x * CHANNELS;
            let dst = &mut layers[layer].as_raw_mut()[offset..offset + CHANNELS];
            dst.copy_from_slice(px);
            if options.invert {
                invert_rgb(dst);
            }
        }
    }

    debug!("Split complete");
    Ok((layers, assignment))
}
