//! Runtime application configuration loaded from the environment plus flag overrides.

use std::path::PathBuf;

use layer_engine::{BLOCK_SIZE_RANGE, BlendMode, LAYER_COUNT_RANGE, Seed, SplitOptions};

use super::defaults::{BLOCK_SIZE_FALLBACK, LAYER_COUNT_FALLBACK, get_default};
use super::validation::validate_setting;

/// Runtime configuration. Numeric values are already clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub layer_count: u32,
    pub block_size: u32,
    pub blend_mode: BlendMode,
    pub invert: bool,
    pub seed: Option<Seed>,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            layer_count: 3,
            block_size: 32,
            blend_mode: BlendMode::Auto,
            invert: false,
            seed: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults.
    ///
    /// Invalid values are logged and replaced by the default for that key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let g = |key: &str| -> String {
            lookup(key)
                .or_else(|| get_default(key).map(str::to_string))
                .unwrap_or_default()
        };

        config.layer_count = parse_clamped(
            "LAYER_COUNT",
            &g("LAYER_COUNT"),
            LAYER_COUNT_FALLBACK,
            LAYER_COUNT_RANGE,
        );
        config.block_size = parse_clamped(
            "BLOCK_SIZE",
            &g("BLOCK_SIZE"),
            BLOCK_SIZE_FALLBACK,
            BLOCK_SIZE_RANGE,
        );

        for key in ["BLEND_MODE", "INVERT", "SEED", "OUTPUT_DIR"] {
            let value = g(key);
            if let Err(e) = config.set(key, &value) {
                tracing::warn!("Ignoring {key}={value:?}: {e}");
            }
        }

        config
    }

    /// Validate and apply a single setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        validate_setting(key, value)
            .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;

        match key {
            "LAYER_COUNT" => {
                self.layer_count =
                    parse_clamped(key, value, LAYER_COUNT_FALLBACK, LAYER_COUNT_RANGE);
            }
            "BLOCK_SIZE" => {
                self.block_size = parse_clamped(key, value, BLOCK_SIZE_FALLBACK, BLOCK_SIZE_RANGE);
            }
            "BLEND_MODE" => self.blend_mode = value.parse()?,
            "INVERT" => self.invert = value == "true",
            "SEED" => {
                self.seed = if value.is_empty() {
                    None
                } else {
                    Some(Seed::new(value.trim().parse()?)?)
                };
            }
            "OUTPUT_DIR" => self.output_dir = PathBuf::from(value),
            _ => anyhow::bail!("unknown setting key: {key}"),
        }
        Ok(())
    }

    /// Split options for this configuration with the given seed.
    pub fn split_options(&self, seed: Seed) -> SplitOptions {
        SplitOptions::clamped(self.layer_count, self.block_size, self.invert, seed)
    }
}

/// Parse an integer, substituting `fallback` when it does not parse, then clamp.
///
/// A value moved by the clamp is logged, since the run uses a different
/// setting than the one asked for.
fn parse_clamped(key: &str, s: &str, fallback: u32, (min, max): (u32, u32)) -> u32 {
    let v = s.trim().parse::<i64>().unwrap_or(i64::from(fallback));
    let clamped = v.clamp(i64::from(min), i64::from(max));
    if clamped != v {
        tracing::warn!(key, requested = v, used = clamped, "Setting clamped into {min}-{max}");
    }
    clamped as u32
}
