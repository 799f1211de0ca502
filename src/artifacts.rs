//! Classifier artifact location and retrieval.
//!
//! The scoring functions are opaque ONNX files produced by training
//! elsewhere; this module only knows where they live on disk and how to
//! fetch a missing one before startup.

use std::env;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::types::ModelMode;

/// Environment override for the artifact directory; defaults to `models/`
/// next to the working directory.
pub const MODEL_DIR_ENV: &str = "SIGN_SCANNER_MODEL_DIR";

const DOWNLOAD_CHUNK: usize = 64 * 1024;

pub fn default_model_dir() -> PathBuf {
    match env::var_os(MODEL_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("models"),
    }
}

pub fn default_model_path(mode: ModelMode) -> PathBuf {
    default_model_dir().join(format!("model_{}.onnx", mode.label()))
}

/// Makes sure the artifact exists at `path`, downloading it from `url`
/// when absent. Meant to run once at startup, before the sessions load.
pub fn ensure_model_available(path: &Path, url: &str) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create model directory {}", parent.display()))?;
    }

    log::info!("downloading classifier artifact from {url}");
    download_model(url, path).with_context(|| format!("failed to download model to {}", path.display()))
}

fn download_model(url: &str, path: &Path) -> Result<()> {
    let mut response = reqwest::blocking::get(url)?.error_for_status()?;
    let total = response.content_length().unwrap_or(0);

    let progress = if total > 0 {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:30}] {bytes}/{total_bytes}")?
                .progress_chars("=> "),
        );
        bar.set_message("model");
        bar
    } else {
        ProgressBar::new_spinner()
    };

    // Download into a sibling temp file so an interrupted transfer never
    // leaves a half-written artifact behind.
    let tmp_path = path.with_extension("onnx.part");
    let mut tmp = fs::File::create(&tmp_path)?;

    let mut buffer = vec![0u8; DOWNLOAD_CHUNK];
    loop {
        let read = response.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        tmp.write_all(&buffer[..read])?;
        progress.inc(read as u64);
    }
    progress.finish_and_clear();
    drop(tmp);

    let size = fs::metadata(&tmp_path)?.len();
    ensure!(size > 0, "downloaded model is empty");

    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_are_per_mode() {
        let sibi = default_model_path(ModelMode::Sibi);
        let bisindo = default_model_path(ModelMode::Bisindo);
        assert_ne!(sibi, bisindo);
        assert!(sibi.to_string_lossy().ends_with("model_sibi.onnx"));
        assert!(bisindo.to_string_lossy().ends_with("model_bisindo.onnx"));
    }

    #[test]
    fn existing_artifact_is_left_alone() {
        let dir = env::temp_dir().join("sign-scanner-artifact-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model_sibi.onnx");
        fs::write(&path, b"stub-artifact").unwrap();

        // URL is bogus; an existing file must short-circuit the download.
        ensure_model_available(&path, "http://invalid.invalid/model.onnx").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"stub-artifact");

        fs::remove_file(&path).unwrap();
    }
}
