use anyhow::{Context, Result};
use std::fs;

use crate::core::splitter::{FrameSplitter, SplitReport};
use crate::decoder::{Decoder, FfmpegDecoder};
use crate::shared::config::ExtractConfig;
use crate::shared::constants;
use crate::utils::file_utils;
use crate::utils::logger;

/// Decodes `config.input` with ffmpeg and splits the result into frame files.
pub fn extract_frames(config: &ExtractConfig) -> Result<SplitReport> {
    let decoder = FfmpegDecoder::new(&config.ffmpeg);
    run(config, &decoder)
}

pub fn run<D: Decoder + ?Sized>(config: &ExtractConfig, decoder: &D) -> Result<SplitReport> {
    let descriptor = config.descriptor;

    file_utils::ensure_dir(&config.output_dir)?;

    let existing = file_utils::list_files(
        &config.output_dir,
        constants::FRAME_FILE_PREFIX,
        constants::FRAME_FILE_EXTENSION,
    )?;
    if !existing.is_empty() {
        logger::info(&format!(
            "{} frame files already in {}; matching indices will be overwritten",
            existing.len(),
            config.output_dir.display()
        ));
    }

    let raw_path = config.raw_stream_path();
    logger::info(&format!(
        "decoding {} ({}x{} {}, {} bytes/frame) -> {}",
        config.input.display(),
        descriptor.width(),
        descriptor.height(),
        descriptor.pixel_format(),
        descriptor.frame_size(),
        raw_path.display()
    ));

    // A failed decode must not fall through to splitting a stale raw stream.
    decoder
        .decode(&config.input, &raw_path, descriptor.pixel_format())
        .with_context(|| format!("Failed to decode {}", config.input.display()))?;

    let splitter = FrameSplitter::new(&config.output_dir, descriptor);
    let mut report = splitter.split_file(&raw_path)?;
    if let Some(fps) = config.fps {
        report = report.with_fps(fps);
    }

    if config.remove_raw {
        fs::remove_file(&raw_path)
            .with_context(|| format!("Failed to remove raw stream: {}", raw_path.display()))?;
        logger::debug(&format!("removed {}", raw_path.display()));
    }

    Ok(report)
}
