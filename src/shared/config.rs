use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::decoder::{PixelFormat, StreamDescriptor};
use crate::shared::constants;

/// Contents of a JSON config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub video_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub pixfmt: Option<String>,
    pub ffmpeg: Option<String>,
    pub remove_raw: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// `<config dir>/yuvsplit/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(constants::APP_NAME).join(constants::CONFIG_FILE_NAME))
    }

    /// An explicit path must exist. The default path is only read if present.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_format: Option<PixelFormat>,
    pub fps: Option<u32>,
    pub ffmpeg: Option<String>,
    pub remove_raw: bool,
}

impl Overrides {
    pub fn descriptor(&self, file: &FileConfig) -> Result<StreamDescriptor> {
        let Some(width) = self.width.or(file.width) else {
            bail!("frame width is required (--width or \"width\" in the config file)");
        };
        let Some(height) = self.height.or(file.height) else {
            bail!("frame height is required (--height or \"height\" in the config file)");
        };
        let pixel_format = match (self.pixel_format, file.pixfmt.as_deref()) {
            (Some(format), _) => format,
            (None, Some(name)) => name.parse::<PixelFormat>()?,
            (None, None) => PixelFormat::default(),
        };

        Ok(StreamDescriptor::new(width, height, pixel_format)?)
    }

    pub fn output_dir(&self, file: &FileConfig) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(|| file.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_OUTPUT_DIR))
    }
}

/// Everything one extraction job needs. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub descriptor: StreamDescriptor,
    pub fps: Option<u32>,
    pub ffmpeg: String,
    pub remove_raw: bool,
}

impl ExtractConfig {
    pub fn resolve(cli: &Overrides, file: &FileConfig) -> Result<Self> {
        let Some(input) = cli.input.clone().or_else(|| file.video_path.clone()) else {
            bail!("input video is required (--input or \"video_path\" in the config file)");
        };

        let fps = cli.fps.or(file.fps);
        if fps == Some(0) {
            bail!("fps must be positive");
        }

        Ok(Self {
            input,
            output_dir: cli.output_dir(file),
            descriptor: cli.descriptor(file)?,
            fps,
            ffmpeg: cli
                .ffmpeg
                .clone()
                .or_else(|| file.ffmpeg.clone())
                .unwrap_or_else(|| constants::DEFAULT_FFMPEG.to_string()),
            remove_raw: cli.remove_raw || file.remove_raw.unwrap_or(false),
        })
    }

    pub fn raw_stream_path(&self) -> PathBuf {
        self.output_dir.join(constants::RAW_STREAM_FILE)
    }
}
