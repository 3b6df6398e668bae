use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::decoder::StreamDescriptor;
use crate::shared::constants;
use crate::utils::file_utils;
use crate::utils::logger;
use crate::utils::time_utils::Timer;

/// Single-pass iterator over whole frames of a raw stream.
///
/// Stops at end of stream or at the first short chunk. The short chunk is
/// never yielded; its length is available from `discarded_bytes` once the
/// iterator is exhausted.
pub struct FrameChunks<R> {
    reader: R,
    frame_size: usize,
    discarded: usize,
    finished: bool,
}

impl<R: Read> FrameChunks<R> {
    pub fn new(reader: R, frame_size: usize) -> Self {
        Self {
            reader,
            frame_size,
            discarded: 0,
            finished: frame_size == 0,
        }
    }

    pub fn discarded_bytes(&self) -> usize {
        self.discarded
    }

    // Like `read_exact`, but reports how much was read when the stream ends early.
    fn fill(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buffer.len() {
            match self.reader.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for FrameChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut frame = vec![0u8; self.frame_size];
        match self.fill(&mut frame) {
            Ok(n) if n == self.frame_size => Some(Ok(frame)),
            Ok(n) => {
                self.finished = true;
                self.discarded = n;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for FrameChunks<R> {}

#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub frames: usize,
    pub frame_size: usize,
    /// Length of the trailing partial frame that was dropped.
    pub discarded_bytes: usize,
    pub output_dir: PathBuf,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl SplitReport {
    /// Pretty JSON to `path`, kept apart from the progress lines on stdout.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("Failed to serialize split report")?;
        file_utils::write_file(path, &json)
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        if fps > 0 {
            self.duration_secs = Some(self.frames as f64 / f64::from(fps));
        }
        self
    }
}

pub fn frame_file_name(index: usize) -> String {
    format!(
        "{}{:0width$}.{}",
        constants::FRAME_FILE_PREFIX,
        index,
        constants::FRAME_FILE_EXTENSION,
        width = constants::FRAME_INDEX_WIDTH
    )
}

/// Writes each whole frame of a raw stream to `frame_NNNN.yuv` in the output directory.
pub struct FrameSplitter {
    output_dir: PathBuf,
    frame_size: usize,
}

impl FrameSplitter {
    pub fn new(output_dir: impl Into<PathBuf>, descriptor: StreamDescriptor) -> Self {
        Self {
            output_dir: output_dir.into(),
            frame_size: descriptor.frame_size(),
        }
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(frame_file_name(index))
    }

    pub fn split_file(&self, raw_path: &Path) -> Result<SplitReport> {
        logger::info(&format!(
            "splitting {} into {}-byte frames",
            raw_path.display(),
            self.frame_size
        ));
        let file = File::open(raw_path)
            .with_context(|| format!("Failed to open raw stream: {:?}", raw_path))?;
        self.split_from(BufReader::new(file))
    }

    pub fn split_from<R: Read>(&self, reader: R) -> Result<SplitReport> {
        let timer = Timer::new();
        let mut chunks = FrameChunks::new(reader, self.frame_size);
        let mut frame_idx = 0usize;

        for chunk in chunks.by_ref() {
            let frame = chunk.with_context(|| format!("Failed to read frame {}", frame_idx))?;
            let path = self.frame_path(frame_idx);
            file_utils::write_file(&path, &frame)?;

            println!("Saved frame {}", frame_idx);
            logger::debug(&format!("saved frame {} -> {}", frame_idx, path.display()));
            frame_idx += 1;
        }

        let discarded_bytes = chunks.discarded_bytes();
        if discarded_bytes > 0 {
            logger::debug(&format!(
                "dropped {} trailing bytes (short of a {}-byte frame)",
                discarded_bytes, self.frame_size
            ));
        }

        println!("Extracted {} frames to: {}", frame_idx, self.output_dir.display());
        logger::info(&format!("extracted {} frames", frame_idx));

        Ok(SplitReport {
            frames: frame_idx,
            frame_size: self.frame_size,
            discarded_bytes,
            output_dir: self.output_dir.clone(),
            elapsed_ms: timer.elapsed_ms(),
            duration_secs: None,
        })
    }
}
