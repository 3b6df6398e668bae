use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Files in `dir` whose name starts with `prefix` and ends in `.extension`, sorted.
pub fn list_files(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().map_or(false, |ext| ext == extension)
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map_or(false, |name| name.starts_with(prefix))
        })
        .collect();

    // zero-padded indices sort correctly as strings
    files.sort();
    Ok(files)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Creates (or truncates) `path` and writes `data` to it. The handle is closed on return.
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    file.write_all(data)
        .with_context(|| format!("Failed to write file: {:?}", path))?;
    Ok(())
}
