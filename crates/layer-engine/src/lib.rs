//! Pixel engine for composite merging and block-randomized layer splitting.
//!
//! Two independent pipelines share the [`PixelBuffer`] type and the
//! [`invert_channels`] primitive:
//!
//! - [`merge`] blends two or more images into one with Multiply/Screen
//!   arithmetic, picking the op per image from its background when asked to.
//! - [`split`] scatters one image into N sparse layers, block by block,
//!   following a seeded permutation of the block grid.

pub mod blend;
pub mod buffer;
pub mod classify;
pub mod codec;
pub mod compose;
pub mod partition;
pub mod seed;
pub mod shuffle;

// Re-exports for convenience
pub use blend::{BlendMode, BlendOp, multiply, resolve_mode, screen};
pub use buffer::{PixelBuffer, invert_channels};
pub use classify::{BackgroundClass, BackgroundStats, classify};
pub use compose::{Composite, merge};
pub use partition::{SplitOptions, split, split_with_assignment};
pub use seed::Seed;
pub use shuffle::{Assignment, BlockGrid, assign};

/// Inclusive bounds a caller clamps the layer count into before splitting.
pub const LAYER_COUNT_RANGE: (u32, u32) = (2, 10);

/// Inclusive bounds a caller clamps the block size into before splitting.
pub const BLOCK_SIZE_RANGE: (u32, u32) = (8, 128);

/// Errors raised by the engine and its codec boundary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("At least 2 images are required to merge, got {got}")]
    InsufficientInputs { got: usize },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid buffer length {len} for a {width}x{height} RGBA image")]
    InvalidDimensions { width: u32, height: u32, len: usize },

    #[error("Image {index} has zero width or height")]
    EmptyImage { index: usize },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
