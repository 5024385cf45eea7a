//! Setting value validation.

use layer_engine::{BlendMode, Seed};

use super::defaults::DEFAULT_SETTINGS;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
///
/// Numeric layer count and block size only need to parse; range is handled by
/// clamping, not rejection.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    if !DEFAULT_SETTINGS.contains_key(key) {
        return Err(format!("unknown setting '{key}'"));
    }

    match key {
        "LAYER_COUNT" | "BLOCK_SIZE" => {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| "must be an integer")?;
        }
        "BLEND_MODE" => {
            value.parse::<BlendMode>().map_err(|e| e.to_string())?;
        }
        "INVERT" => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        "SEED" => {
            if !value.is_empty() {
                let v: f64 = value.trim().parse().map_err(|_| "must be a float")?;
                Seed::new(v).map_err(|_| "must be in [0, 1)")?;
            }
        }
        "OUTPUT_DIR" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}
