mod core;
mod decoder;
mod shared;
mod utils;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::core::{extractor, FrameSplitter, SplitReport};
use crate::decoder::{DecodeError, PixelFormat};
use crate::shared::config::{ExtractConfig, FileConfig, Overrides};
use crate::utils::{file_utils, logger};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (defaults to <config dir>/yuvsplit/config.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GeometryArgs {
    /// Frame width in pixels
    #[arg(short = 'W', long)]
    width: Option<u32>,
    /// Frame height in pixels
    #[arg(short = 'H', long)]
    height: Option<u32>,
    /// Raw pixel format (yuv420p, alias YU12/YUV420/I420)
    #[arg(short, long = "pix-fmt")]
    pix_fmt: Option<PixelFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a video with ffmpeg and split it into per-frame raw files
    Extract {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        geometry: GeometryArgs,
        /// Frame rate, only used to report the decoded duration
        #[arg(long)]
        fps: Option<u32>,
        /// Decoder executable
        #[arg(long)]
        ffmpeg: Option<String>,
        /// Delete the intermediate raw stream after splitting
        #[arg(long, default_value_t = false)]
        remove_raw: bool,
        /// Write the split report as JSON to this file
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },
    /// Split an existing raw stream into per-frame files
    Split {
        raw: PathBuf,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        geometry: GeometryArgs,
        /// Write the split report as JSON to this file
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },
    /// Print the byte size of one frame
    FrameSize {
        #[command(flatten)]
        geometry: GeometryArgs,
    },
}

impl GeometryArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            width: self.width,
            height: self.height,
            pixel_format: self.pix_fmt,
            ..Default::default()
        }
    }
}

fn write_report(report: &SplitReport, json: Option<&Path>) -> Result<()> {
    if let Some(path) = json {
        report.write_json(path)?;
    }
    Ok(())
}

/// Exit code to hand back for a failed run, when the decoder supplied one.
/// Everything else falls back to `main` returning the error (status 1).
fn exit_code(err: &anyhow::Error) -> Option<i32> {
    err.downcast_ref::<DecodeError>().and_then(DecodeError::exit_code)
}

fn run(cli: Cli) -> Result<()> {
    let file_config = FileConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { input, output_dir, geometry, fps, ffmpeg, remove_raw, json } => {
            let overrides = Overrides {
                input,
                output_dir,
                fps,
                ffmpeg,
                remove_raw,
                ..geometry.overrides()
            };
            let config = ExtractConfig::resolve(&overrides, &file_config)?;
            let report = extractor::extract_frames(&config)?;
            write_report(&report, json.as_deref())?;
        }
        Commands::Split { raw, output_dir, geometry, json } => {
            let overrides = Overrides { output_dir, ..geometry.overrides() };
            let descriptor = overrides.descriptor(&file_config)?;
            let output_dir = overrides.output_dir(&file_config);
            file_utils::ensure_dir(&output_dir)?;

            let report = FrameSplitter::new(output_dir, descriptor).split_file(&raw)?;
            write_report(&report, json.as_deref())?;
        }
        Commands::FrameSize { geometry } => {
            let descriptor = geometry.overrides().descriptor(&file_config)?;
            println!("{}", descriptor.frame_size());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        logger::error(&format!("{:#}", e));
        // hand the decoder's own exit code back to the caller
        if let Some(code) = exit_code(&e) {
            eprintln!("Error: {:#}", e);
            std::process::exit(code);
        }
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsString;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_code_from_decoder_failure() {
        let err = anyhow::Error::new(DecodeError::Failed {
            program: "ffmpeg".to_string(),
            code: Some(3),
        })
        .context("Failed to decode clip.mp4");
        assert_eq!(exit_code(&err), Some(3));
    }

    #[test]
    fn test_exit_code_falls_back_for_other_errors() {
        let signalled = anyhow::Error::new(DecodeError::Failed {
            program: "ffmpeg".to_string(),
            code: None,
        });
        assert_eq!(exit_code(&signalled), None);

        let launch = anyhow::Error::new(DecodeError::Launch {
            program: "ffmpeg".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        });
        assert_eq!(exit_code(&launch), None);

        assert_eq!(exit_code(&anyhow::anyhow!("frame width is required")), None);
    }

    #[test]
    fn test_parse_split_arguments() {
        let cli = Cli::try_parse_from([
            "yuvsplit", "split", "raw.yuv", "-W", "4", "-H", "2", "-p", "YU12", "-o", "out",
            "--json", "report.json",
        ])
        .unwrap();

        let Commands::Split { raw, output_dir, geometry, json } = cli.command else {
            panic!("expected split");
        };
        assert_eq!(raw, PathBuf::from("raw.yuv"));
        assert_eq!(output_dir, Some(PathBuf::from("out")));
        assert_eq!(geometry.width, Some(4));
        assert_eq!(geometry.height, Some(2));
        assert_eq!(geometry.pix_fmt, Some(PixelFormat::Yuv420p));
        assert_eq!(json, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn test_parse_frame_size_and_extract_arguments() {
        let cli = Cli::try_parse_from(["yuvsplit", "frame-size", "--width", "1280", "--height", "720"]).unwrap();
        let Commands::FrameSize { geometry } = cli.command else {
            panic!("expected frame-size");
        };
        assert_eq!(geometry.overrides().descriptor(&FileConfig::default()).unwrap().frame_size(), 1_382_400);

        let cli = Cli::try_parse_from([
            "yuvsplit", "-c", "cfg.json", "extract", "-i", "clip.mp4", "-W", "4", "-H", "2", "--fps", "25",
            "--ffmpeg", "/opt/ffmpeg", "--remove-raw",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        let Commands::Extract { input, fps, ffmpeg, remove_raw, json, .. } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(input, Some(PathBuf::from("clip.mp4")));
        assert_eq!(fps, Some(25));
        assert_eq!(ffmpeg.as_deref(), Some("/opt/ffmpeg"));
        assert!(remove_raw);
        assert_eq!(json, None);
    }

    #[test]
    fn test_parse_rejects_unsupported_pixel_format() {
        assert!(Cli::try_parse_from(["yuvsplit", "frame-size", "-W", "4", "-H", "2", "-p", "NV12"]).is_err());
    }

    #[test]
    fn test_split_command_writes_frames_and_parseable_report() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("config.json");
        fs::write(&config, "{}").unwrap();
        let raw = tmp.path().join("raw.yuv");
        fs::write(&raw, vec![5u8; 12 * 3 + 7]).unwrap();
        let out = tmp.path().join("out");
        let report = tmp.path().join("report.json");

        let args: Vec<OsString> = vec![
            "yuvsplit".into(),
            "-c".into(),
            config.into(),
            "split".into(),
            raw.into(),
            "-W".into(),
            "4".into(),
            "-H".into(),
            "2".into(),
            "-o".into(),
            out.clone().into(),
            "--json".into(),
            report.clone().into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        run(cli).unwrap();

        assert_eq!(file_utils::list_files(&out, "frame_", "yuv").unwrap().len(), 3);
        let json: serde_json::Value = serde_json::from_slice(&fs::read(&report).unwrap()).unwrap();
        assert_eq!(json["frames"], 3);
        assert_eq!(json["discarded_bytes"], 7);
    }
}
