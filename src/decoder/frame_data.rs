use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameSizeError {
    #[error("unsupported pixel format '{0}' (only 4:2:0 planar / yuv420p is supported)")]
    UnknownPixelFormat(String),
    #[error("frame dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("{width}x{height} does not give a whole number of bytes per frame in {format}")]
    FractionalSize {
        width: u32,
        height: u32,
        format: PixelFormat,
    },
    #[error("frame size for {width}x{height} overflows")]
    Overflow { width: u32, height: u32 },
}

/// Raw pixel layouts the splitter knows the frame size of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 4:2:0 planar: full-resolution Y followed by quarter-resolution U and V.
    #[default]
    Yuv420p,
}

impl PixelFormat {
    /// Name handed to the decoder's `-pix_fmt`.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            PixelFormat::Yuv420p => "yuv420p",
        }
    }

    // (numerator, denominator) bytes per pixel
    fn bytes_per_pixel(self) -> (u64, u64) {
        match self {
            PixelFormat::Yuv420p => (3, 2),
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ffmpeg_name())
    }
}

impl FromStr for PixelFormat {
    type Err = FrameSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yuv420p" | "yu12" | "yuv420" | "i420" => Ok(PixelFormat::Yuv420p),
            _ => Err(FrameSizeError::UnknownPixelFormat(s.to_string())),
        }
    }
}

/// Bytes in one raw frame of `width` x `height` pixels.
pub fn frame_size(width: u32, height: u32, format: PixelFormat) -> Result<usize, FrameSizeError> {
    if width == 0 || height == 0 {
        return Err(FrameSizeError::ZeroDimension { width, height });
    }

    let (num, den) = format.bytes_per_pixel();
    let pixels = u64::from(width) * u64::from(height);
    let scaled = pixels
        .checked_mul(num)
        .ok_or(FrameSizeError::Overflow { width, height })?;

    if scaled % den != 0 {
        return Err(FrameSizeError::FractionalSize { width, height, format });
    }

    usize::try_from(scaled / den).map_err(|_| FrameSizeError::Overflow { width, height })
}

/// Geometry and layout of the decoded stream. Fixed for the whole job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    frame_size: usize,
}

impl StreamDescriptor {
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Result<Self, FrameSizeError> {
        let frame_size = frame_size(width, height, pixel_format)?;
        Ok(Self { width, height, pixel_format, frame_size })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }
}
