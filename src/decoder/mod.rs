pub mod ffmpeg;
pub mod frame_data;

pub use ffmpeg::{DecodeError, Decoder, FfmpegDecoder};
pub use frame_data::{PixelFormat, StreamDescriptor};
