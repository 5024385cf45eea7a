//! Per-channel Multiply/Screen arithmetic and blend mode resolution.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::EngineError;
use crate::buffer::PixelBuffer;
use crate::classify::{BackgroundClass, classify};

/// Blend mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    Multiply,
    Screen,
    /// Pick Multiply or Screen per incoming image from its background.
    #[default]
    Auto,
}

/// A concrete blend operation, as applied to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOp {
    Multiply,
    Screen,
}

impl BlendOp {
    /// Blend one channel value of the accumulated image with the incoming one.
    #[inline]
    pub fn apply(self, acc: u8, src: u8) -> u8 {
        match self {
            Self::Multiply => multiply(acc, src),
            Self::Screen => screen(acc, src),
        }
    }

    /// Blend `src` into `acc` over R, G, B. Alpha of `acc` is left alone.
    #[inline]
    pub fn apply_rgb(self, acc: &mut [u8], src: &[u8]) {
        for c in 0..3 {
            acc[c] = self.apply(acc[c], src[c]);
        }
    }
}

/// `round(a * b / 255)`.
///
/// `a * b / 255` never lands on a half (255 is odd), so adding 127 before the
/// integer division rounds correctly. The result is at most 255.
#[inline]
pub fn multiply(a: u8, b: u8) -> u8 {
    ((u16::from(a) * u16::from(b) + 127) / 255) as u8
}

/// `255 - round((255 - a) * (255 - b) / 255)`.
#[inline]
pub fn screen(a: u8, b: u8) -> u8 {
    255 - multiply(255 - a, 255 - b)
}

/// Turn a requested mode into the op used for `incoming`.
///
/// Explicit modes pass through. `Auto` classifies `incoming`: a white
/// background picks Multiply, a black one Screen, anything else Multiply.
pub fn resolve_mode(mode: BlendMode, incoming: &PixelBuffer) -> BlendOp {
    match mode {
        BlendMode::Multiply => BlendOp::Multiply,
        BlendMode::Screen => BlendOp::Screen,
        BlendMode::Auto => {
            let op = match classify(incoming).class() {
                BackgroundClass::Black => BlendOp::Screen,
                BackgroundClass::White | BackgroundClass::Mixed => BlendOp::Multiply,
            };
            debug!(?op, "Auto blend mode resolved");
            op
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Auto => "auto",
        };
        f.write_str(s)
    }
}

impl FromStr for BlendMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiply" => Ok(Self::Multiply),
            "screen" => Ok(Self::Screen),
            "auto" => Ok(Self::Auto),
            other => Err(EngineError::InvalidParameters(format!(
                "unknown blend mode '{other}' (expected multiply, screen or auto)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_multiply(a: u8, b: u8) -> u8 {
        (f64::from(a) * f64::from(b) / 255.0).round() as u8
    }

    #[test]
    fn test_multiply_matches_float_rounding() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                assert_eq!(multiply(a, b), reference_multiply(a, b), "multiply({a}, {b})");
            }
        }
    }

    #[test]
    fn test_multiply_and_screen_are_monotonic() {
        for a in 0..=255u8 {
            for b in 0..255u8 {
                assert!(multiply(a, b) <= multiply(a, b + 1));
                assert!(screen(a, b) <= screen(a, b + 1));
            }
        }
    }

    #[test]
    fn test_identity_and_absorbing_values() {
        for v in [0u8, 1, 77, 128, 254, 255] {
            assert_eq!(multiply(v, 255), v);
            assert_eq!(multiply(v, 0), 0);
            assert_eq!(screen(v, 0), v);
            assert_eq!(screen(v, 255), 255);
        }
    }

    #[test]
    fn test_apply_rgb_keeps_alpha() {
        let mut acc = [255, 255, 255, 200];
        BlendOp::Multiply.apply_rgb(&mut acc, &[0, 0, 0, 10]);
        assert_eq!(acc, [0, 0, 0, 200]);

        let mut acc = [0, 0, 0, 90];
        BlendOp::Screen.apply_rgb(&mut acc, &[255, 255, 255, 255]);
        assert_eq!(acc, [255, 255, 255, 90]);
    }

    #[test]
    fn test_resolve_explicit_mode_ignores_image() {
        let black = PixelBuffer::from_pixel(10, 10, [0, 0, 0, 255]);
        assert_eq!(resolve_mode(BlendMode::Multiply, &black), BlendOp::Multiply);
        let white = PixelBuffer::from_pixel(10, 10, [255, 255, 255, 255]);
        assert_eq!(resolve_mode(BlendMode::Screen, &white), BlendOp::Screen);
    }

    #[test]
    fn test_resolve_auto_mode() {
        let white = PixelBuffer::from_pixel(10, 10, [255, 255, 255, 255]);
        assert_eq!(resolve_mode(BlendMode::Auto, &white), BlendOp::Multiply);

        let black = PixelBuffer::from_pixel(10, 10, [0, 0, 0, 255]);
        assert_eq!(resolve_mode(BlendMode::Auto, &black), BlendOp::Screen);

        // 30% white, 70% mid-gray
        let mut mixed = PixelBuffer::from_pixel(10, 10, [128, 128, 128, 255]);
        for x in 0..10 {
            for y in 0..3 {
                mixed.put_pixel(x, y, [255, 255, 255, 255]);
            }
        }
        assert_eq!(resolve_mode(BlendMode::Auto, &mixed), BlendOp::Multiply);
    }

    #[test]
    fn test_blend_mode_from_str() {
        assert_eq!("multiply".parse::<BlendMode>().unwrap(), BlendMode::Multiply);
        assert_eq!(" Screen ".parse::<BlendMode>().unwrap(), BlendMode::Screen);
        assert_eq!("AUTO".parse::<BlendMode>().unwrap(), BlendMode::Auto);
        assert!("overlay".parse::<BlendMode>().is_err());
    }

    #[test]
    fn test_blend_mode_display_round_trips() {
        for mode in [BlendMode::Multiply, BlendMode::Screen, BlendMode::Auto] {
            assert_eq!(mode.to_string().parse::<BlendMode>().unwrap(), mode);
        }
    }
}
