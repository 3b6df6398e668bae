pub const APP_NAME: &str = "yuvsplit";

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

pub const DEFAULT_OUTPUT_DIR: &str = "./input_frames/";
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Intermediate decoder output, written next to the frame files.
pub const RAW_STREAM_FILE: &str = "full_output.yuv";

pub const FRAME_FILE_PREFIX: &str = "frame_";
pub const FRAME_FILE_EXTENSION: &str = "yuv";
pub const FRAME_INDEX_WIDTH: usize = 4;
