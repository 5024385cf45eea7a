//! Merge and split commands: decode inputs, run the engine, write outputs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use layer_engine::{BlendOp, PixelBuffer, Seed, codec, merge, split_with_assignment};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// File name of the merged result.
pub const MERGED_FILE: &str = "merged.png";
/// File name of the pre-inversion merge result, written when inverting.
pub const MERGED_ORIGINAL_FILE: &str = "merged_original.png";
/// File name of the split manifest.
pub const MANIFEST_FILE: &str = "split.json";

/// Summary of a merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<BlendOp>,
    pub written: Vec<PathBuf>,
}

/// Record of a split run, written next to the layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitManifest {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub layer_count: u32,
    pub block_size: u32,
    pub invert: bool,
    pub seed: f64,
    pub blocks_per_layer: Vec<usize>,
    pub layers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Decode all `paths` concurrently, keeping input order.
pub async fn load_images(paths: &[PathBuf]) -> anyhow::Result<Vec<PixelBuffer>> {
    let tasks = paths.iter().cloned().map(|path| async move {
        let loaded = tokio::task::spawn_blocking({
            let path = path.clone();
            move || codec::load(&path)
        })
        .await?;
        let buf = loaded.with_context(|| format!("failed to load {}", path.display()))?;
        Ok::<_, anyhow::Error>(buf)
    });
    try_join_all(tasks).await
}

/// Encode and write each `(path, buffer)` pair concurrently.
async fn save_all(outputs: Vec<(PathBuf, PixelBuffer)>) -> anyhow::Result<Vec<PathBuf>> {
    let tasks = outputs.into_iter().map(|(path, buf)| async move {
        let saved = tokio::task::spawn_blocking({
            let path = path.clone();
            move || codec::save_png(&path, &buf)
        })
        .await?;
        saved.with_context(|| format!("failed to write {}", path.display()))?;
        Ok::<_, anyhow::Error>(path)
    });
    try_join_all(tasks).await
}

async fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create output directory {}", dir.display()))
}

/// Whether `name` is a layer file written by a split, `layer_<N>.png`.
fn is_layer_file(name: &str) -> bool {
    name.strip_prefix("layer_")
        .and_then(|rest| rest.strip_suffix(".png"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn is_merged_original(name: &str) -> bool {
    name == MERGED_ORIGINAL_FILE
}

/// Delete files in `dir` matching `is_output` that are not in `keep`.
///
/// Outputs of an earlier run must not sit next to this run's outputs.
async fn remove_stale_outputs(
    dir: &Path,
    is_output: fn(&str) -> bool,
    keep: &[PathBuf],
) -> anyhow::Result<()> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read output directory {}", dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let stale = entry
            .file_name()
            .to_str()
            .is_some_and(is_output)
            && !keep.contains(&path);
        if stale && entry.file_type().await?.is_file() {
            tokio::fs::remove_file(&path)
                .await
                .with_context(|| format!("failed to remove stale output {}", path.display()))?;
            tracing::debug!("Removed stale output {}", path.display());
        }
    }
    Ok(())
}

/// Merge `inputs` in order and write the result to the output directory.
pub async fn run_merge(inputs: &[PathBuf], config: &AppConfig) -> anyhow::Result<MergeReport> {
    let images = load_images(inputs).await?;
    let composite = merge(&images, config.blend_mode, config.invert)?;
    let (width, height) = composite.display().dimensions();
    tracing::info!(
        width,
        height,
        mode = %config.blend_mode,
        ops = ?composite.ops(),
        invert = config.invert,
        "Merged {} images",
        images.len()
    );

    ensure_dir(&config.output_dir).await?;
    let mut outputs = Vec::with_capacity(2);
    if composite.invert() {
        outputs.push((
            config.output_dir.join(MERGED_ORIGINAL_FILE),
            composite.committed().clone(),
        ));
    }
    let ops = composite.ops().to_vec();
    outputs.push((config.output_dir.join(MERGED_FILE), composite.into_display()));

    let keep: Vec<PathBuf> = outputs.iter().map(|(path, _)| path.clone()).collect();
    remove_stale_outputs(&config.output_dir, is_merged_original, &keep).await?;

    let written = save_all(outputs).await?;
    Ok(MergeReport {
        width,
        height,
        ops,
        written,
    })
}

/// Split `input` into layers with `seed` and write them plus a manifest.
///
/// Layer files left in the output directory by an earlier split are removed.
pub async fn run_split(
    input: &Path,
    config: &AppConfig,
    seed: Seed,
) -> anyhow::Result<SplitManifest> {
    let mut images = load_images(&[input.to_path_buf()]).await?;
    let source = images.pop().context("no image decoded")?;
    let options = config.split_options(seed);
    let (width, height) = source.dimensions();

    let (layers, assignment) = split_with_assignment(&source, &options)?;
    let blocks_per_layer = assignment.blocks_per_layer();

    ensure_dir(&config.output_dir).await?;
    let names: Vec<String> = (1..=layers.len()).map(|i| format!("layer_{i}.png")).collect();
    let outputs = names
        .iter()
        .map(|name| config.output_dir.join(name))
        .zip(layers)
        .collect::<Vec<_>>();
    let keep: Vec<PathBuf> = outputs.iter().map(|(path, _)| path.clone()).collect();
    remove_stale_outputs(&config.output_dir, is_layer_file, &keep).await?;
    save_all(outputs).await?;

    let manifest = SplitManifest {
        source: input.display().to_string(),
        width,
        height,
        layer_count: options.layer_count,
        block_size: options.block_size,
        invert: options.invert,
        seed: seed.value(),
        blocks_per_layer,
        layers: names,
        created_at: Utc::now(),
    };
    let manifest_path = config.output_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest)?;
    tokio::fs::write(&manifest_path, json)
        .await
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    tracing::info!(
        width,
        height,
        layer_count = options.layer_count,
        block_size = options.block_size,
        %seed,
        blocks_per_layer = ?manifest.blocks_per_layer,
        "Split image into layers"
    );
    Ok(manifest)
}
