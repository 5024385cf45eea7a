//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("LAYER_COUNT", "3", "Number of layers to split into (clamped to 2-10)"),
    ("BLOCK_SIZE", "32", "Block edge length in pixels (clamped to 8-128)"),
    ("BLEND_MODE", "auto", "Merge blend mode: multiply, screen or auto"),
    ("INVERT", "false", "Invert RGB channels of the output"),
    ("SEED", "", "Shuffle seed in [0, 1); empty draws a random one"),
    ("OUTPUT_DIR", ".", "Directory output files are written to"),
];

/// Fallback when `LAYER_COUNT` is not a number.
pub const LAYER_COUNT_FALLBACK: u32 = 2;
/// Fallback when `BLOCK_SIZE` is not a number.
pub const BLOCK_SIZE_FALLBACK: u32 = 32;

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}

/// Setting definitions in declaration order.
pub fn ordered_settings() -> impl Iterator<Item = &'static SettingDef> {
    DEFS.iter().filter_map(|&(key, _, _)| DEFAULT_SETTINGS.get(key))
}
