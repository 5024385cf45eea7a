//! Block grid construction and seeded block-to-layer assignment.

use tracing::debug;

use crate::seed::Seed;
use crate::{EngineError, Result};

/// Multiplier applied to the seed at every shuffle step.
const SEED_MULTIPLIER: f64 = 7919.0;

/// Tiling of a `width`x`height` image into `block_size` square cells.
///
/// Edge cells are clipped to the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    width: u32,
    height: u32,
    block_size: u32,
    blocks_wide: u32,
    blocks_high: u32,
}

impl BlockGrid {
    pub fn new(width: u32, height: u32, block_size: u32) -> Result<Self> {
        if block_size < 1 {
            return Err(EngineError::InvalidParameters(
                "block size must be at least 1".into(),
            ));
        }
        Ok(Self {
            width,
            height,
            block_size,
            blocks_wide: width.div_ceil(block_size),
            blocks_high: height.div_ceil(block_size),
        })
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Number of block columns (`ceil(width / block_size)`).
    pub fn blocks_wide(&self) -> u32 {
        self.blocks_wide
    }

    /// Number of block rows (`ceil(height / block_size)`).
    pub fn blocks_high(&self) -> u32 {
        self.blocks_high
    }

    pub fn block_count(&self) -> usize {
        self.blocks_wide as usize * self.blocks_high as usize
    }

    /// Block coordinate containing pixel `(x, y)`.
    pub fn block_of(&self, x: u32, y: u32) -> (u32, u32) {
        (x / self.block_size, y / self.block_size)
    }

    /// Pixel rectangle `(x, y, w, h)` covered by block `(bx, by)`, clipped to the image.
    pub fn block_rect(&self, bx: u32, by: u32) -> (u32, u32, u32, u32) {
        let x = bx * self.block_size;
        let y = by * self.block_size;
        let w = self.block_size.min(self.width.saturating_sub(x));
        let h = self.block_size.min(self.height.saturating_sub(y));
        (x, y, w, h)
    }

    /// All block coordinates in row-major order.
    pub fn blocks(&self) -> Vec<(u32, u32)> {
        let mut blocks = Vec::with_capacity(self.block_count());
        for by in 0..self.blocks_high {
            for bx in 0..self.blocks_wide {
                blocks.push((bx, by));
            }
        }
        blocks
    }

    fn index(&self, bx: u32, by: u32) -> usize {
        by as usize * self.blocks_wide as usize + bx as usize
    }
}

/// Immutable map from block coordinate to layer index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    grid: BlockGrid,
    layer_count: u32,
    // Row-major over the grid.
    layers: Vec<u32>,
}

impl Assignment {
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    /// Layer owning block `(bx, by)`.
    ///
    /// # Panics
    ///
    /// Panics if the block is outside the grid.
    pub fn layer_of(&self, bx: u32, by: u32) -> u32 {
        assert!(
            bx < self.grid.blocks_wide && by < self.grid.blocks_high,
            "block ({bx}, {by}) outside {}x{} grid",
            self.grid.blocks_wide,
            self.grid.blocks_high
        );
        self.layers[self.grid.index(bx, by)]
    }

    /// Layer owning pixel `(x, y)`.
    pub fn layer_for_pixel(&self, x: u32, y: u32) -> u32 {
        let (bx, by) = self.grid.block_of(x, y);
        self.layer_of(bx, by)
    }

    /// Layer indices for one row of blocks, left to right.
    pub fn block_row(&self, by: u32) -> &[u32] {
        let start = self.grid.index(0, by);
        &self.layers[start..start + self.grid.blocks_wide as usize]
    }

    /// Number of blocks owned by each layer, indexed by layer.
    pub fn blocks_per_layer(&self) -> Vec<usize> {
        let mut counts = vec![0; self.layer_count as usize];
        for &layer in &self.layers {
            counts[layer as usize] += 1;
        }
        counts
    }
}

/// Build the block-to-layer assignment for a `width`x`height` image.
///
/// Blocks are listed row-major, then permuted from the back: at step `i`
/// the block is swapped with index `floor((seed * 7919 + i) mod (i + 1))`.
/// Every step reuses the same seed, so the permutation is a fixed function of
/// it. Block `k` of the permuted list goes to layer `k mod layer_count`,
/// which keeps per-layer block counts within one of each other.
pub fn assign(
    width: u32,
    height: u32,
    block_size: u32,
    layer_count: u32,
    seed: Seed,
) -> Result<Assignment> {
    if layer_count < 2 {
        return Err(EngineError::InvalidParameters(format!(
            "layer count must be at least 2, got {layer_count}"
        )));
    }
    let grid = BlockGrid::new(width, height, block_size)?;

    let mut blocks = grid.blocks();
    let scaled = seed.value() * SEED_MULTIPLIER;
    for i in (1..blocks.len()).rev() {
        let j = ((scaled + i as f64) % (i + 1) as f64).floor() as usize;
        blocks.swap(i, j);
    }

    let mut layers = vec![0; grid.block_count()];
    for (k, &(bx, by)) in blocks.iter().enumerate() {
        layers[grid.index(bx, by)] = (k % layer_count as usize) as u32;
    }

    debug!(
        blocks_wide = grid.blocks_wide,
        blocks_high = grid.blocks_high,
        layer_count,
        %seed,
        "Built block assignment"
    );

    Ok(Assignment {
        grid,
        layer_count,
        layers,
    })
}

#[cfg(test)]
#[path = "shuffle_tests.rs"]
mod tests;
