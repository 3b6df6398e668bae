use crate::shared::constants;
use lazy_static::lazy_static;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

struct LoggerPaths {
    error_path: PathBuf,
    debug_path: PathBuf,
}

lazy_static! {
    static ref LOGGER: Mutex<Option<LoggerPaths>> = Mutex::new(None);
}

fn paths() -> MutexGuard<'static, Option<LoggerPaths>> {
    match LOGGER.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn append_line(path: &Path, line: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{}", line);
    }
}

fn start_file(path: &Path, banner: &str) {
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
    {
        let _ = writeln!(file, "=== {} Started: {} ===", banner, chrono::Local::now());
    }
}

/// Truncates `error.log` / `debug.log` in the working directory. Panics are
/// appended to `error.log` before the default hook prints them.
pub fn init() {
    let mut error_path = std::env::current_dir().unwrap_or_default();
    error_path.push(constants::ERROR_LOG_FILE);

    let mut debug_path = error_path.clone();
    debug_path.set_file_name(constants::DEBUG_LOG_FILE);

    start_file(&error_path, "Error Log");
    start_file(&debug_path, "Debug Log");

    *paths() = Some(LoggerPaths {
        error_path: error_path.clone(),
        debug_path,
    });

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        append_line(&error_path, &format!("[PANIC] {}", info));
        default_hook(info);
    }));
}

fn record(paths: &LoggerPaths, level: &str, msg: &str) {
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}][{}] {}", timestamp, level, msg);
    append_line(&paths.debug_path, &line);

    if level == "ERROR" {
        append_line(&paths.error_path, &line);
    }
}

/// No-op until `init` has run.
pub fn log(level: &str, msg: &str) {
    if let Some(paths) = paths().as_ref() {
        record(paths, level, msg);
    }
}

pub fn info(msg: &str) {
    log("INFO", msg);
}

pub fn error(msg: &str) {
    log("ERROR", msg);
}

pub fn debug(msg: &str) {
    log("DEBUG", msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_errors_reach_both_logs() {
        let tmp = TempDir::new().unwrap();
        let paths = LoggerPaths {
            error_path: tmp.path().join(constants::ERROR_LOG_FILE),
            debug_path: tmp.path().join(constants::DEBUG_LOG_FILE),
        };
        start_file(&paths.error_path, "Error Log");
        start_file(&paths.debug_path, "Debug Log");

        record(&paths, "DEBUG", "saved frame 0");
        record(&paths, "ERROR", "decoder 'ffmpeg' exited with status 1");

        let debug = fs::read_to_string(&paths.debug_path).unwrap();
        let error = fs::read_to_string(&paths.error_path).unwrap();
        assert!(debug.starts_with("=== Debug Log Started:"));
        assert!(debug.contains("[DEBUG] saved frame 0"));
        assert!(debug.contains("[ERROR] decoder"));
        assert!(error.contains("[ERROR] decoder"));
        assert!(!error.contains("saved frame"));
    }
}
