//! Command-line parsing.
//!
//! Flags map onto setting keys and are applied over the environment config.

use std::path::PathBuf;

use anyhow::{Context, bail};

use crate::config::defaults::ordered_settings;

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Merge two or more images into one.
    Merge { inputs: Vec<PathBuf> },
    /// Split one image into layers using the configured or a random seed.
    Split { input: PathBuf },
    /// Split one image into layers with a freshly drawn seed.
    Regenerate { input: PathBuf },
    Help,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    /// `(setting key, value)` pairs from flags, in command-line order.
    pub overrides: Vec<(&'static str, String)>,
}

/// Map a flag name to the setting it overrides.
fn flag_key(flag: &str) -> Option<&'static str> {
    match flag {
        "--layers" => Some("LAYER_COUNT"),
        "--block-size" => Some("BLOCK_SIZE"),
        "--mode" => Some("BLEND_MODE"),
        "--invert" => Some("INVERT"),
        "--seed" => Some("SEED"),
        "--out" => Some("OUTPUT_DIR"),
        _ => None,
    }
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> anyhow::Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let Some(name) = args.next() else {
        return Ok(Invocation {
            command: Command::Help,
            overrides: Vec::new(),
        });
    };

    let mut positional = Vec::new();
    let mut overrides = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "-h" || arg == "--help" {
            return Ok(Invocation {
                command: Command::Help,
                overrides,
            });
        }
        if !arg.starts_with("--") {
            positional.push(PathBuf::from(arg));
            continue;
        }

        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) => (f.to_string(), Some(v.to_string())),
            None => (arg.clone(), None),
        };
        let key = flag_key(&flag).with_context(|| format!("unknown flag '{flag}'"))?;

        let value = match (key, inline) {
            (_, Some(v)) => v,
            // A bare `--invert` means true; a following `true`/`false` is its value
            ("INVERT", None) => args
                .next_if(|next| next == "true" || next == "false")
                .unwrap_or_else(|| "true".to_string()),
            (_, None) => args
                .next()
                .with_context(|| format!("flag '{flag}' needs a value"))?,
        };
        overrides.push((key, value));
    }

    let command = match name.as_str() {
        "merge" => {
            if positional.len() < 2 {
                bail!(
                    "merge needs at least 2 images, got {}",
                    positional.len()
                );
            }
            Command::Merge { inputs: positional }
        }
        "split" | "regenerate" => {
            let input = match positional.as_slice() {
                [one] => one.clone(),
                _ => bail!("{name} takes exactly one image, got {}", positional.len()),
            };
            if name == "split" {
                Command::Split { input }
            } else {
                if overrides.iter().any(|(key, _)| *key == "SEED") {
                    bail!("regenerate always draws a new seed; use split --seed to fix one");
                }
                Command::Regenerate { input }
            }
        }
        "help" | "-h" | "--help" => Command::Help,
        other => bail!("unknown command '{other}'"),
    };

    Ok(Invocation { command, overrides })
}

/// Usage text, including the environment settings.
pub fn usage() -> String {
    let mut text = String::from(
        "Usage:\n  \
         image-layers merge <image> <image> [image...] [--mode M] [--invert [BOOL]] [--out DIR]\n  \
         image-layers split <image> [--layers N] [--block-size N] [--invert [BOOL]] \
         [--seed S] [--out DIR]\n  \
         image-layers regenerate <image> [--layers N] [--block-size N] [--invert [BOOL]] \
         [--out DIR]\n\n\
         Environment:\n",
    );
    for def in ordered_settings() {
        let default = if def.default.is_empty() {
            "(empty)"
        } else {
            def.default
        };
        text.push_str(&format!("  {:<12} {} [default: {}]\n", def.key, def.description, default));
    }
    text
}
