use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

use super::frame_data::PixelFormat;
use crate::utils::logger;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to launch decoder '{program}'")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("decoder '{program}' {}", describe_exit(.code))]
    Failed { program: String, code: Option<i32> },
}

impl DecodeError {
    /// Exit code of the decoder, if it ran and exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DecodeError::Launch { .. } => None,
            DecodeError::Failed { code, .. } => *code,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Turns a container file into one headerless raw pixel stream on disk.
pub trait Decoder {
    fn decode(&self, input: &Path, output: &Path, format: PixelFormat) -> Result<(), DecodeError>;
}

/// Runs an external `ffmpeg` (or compatible) binary found on PATH.
pub struct FfmpegDecoder {
    program: PathBuf,
}

impl FfmpegDecoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// `ffmpeg -y -i <input> -f rawvideo -pix_fmt <fmt> <output>`
    pub fn command(&self, input: &Path, output: &Path, format: PixelFormat) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-f", "rawvideo"])
            .args(["-pix_fmt", format.ffmpeg_name()])
            .arg(output);
        command
    }
}

impl Decoder for FfmpegDecoder {
    fn decode(&self, input: &Path, output: &Path, format: PixelFormat) -> Result<(), DecodeError> {
        let mut command = self.command(input, output, format);
        logger::info(&format!("running decoder: {:?}", command));

        // stdout/stderr are inherited so the tool's own log stays visible
        let status = command.status().map_err(|source| DecodeError::Launch {
            program: self.program_name(),
            source,
        })?;

        if !status.success() {
            let err = DecodeError::Failed {
                program: self.program_name(),
                code: status.code(),
            };
            logger::error(&err.to_string());
            return Err(err);
        }

        logger::info(&format!("decoder finished: {}", output.display()));
        Ok(())
    }
}
