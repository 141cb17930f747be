use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::SubtitleError;
use crate::subtitle::SubtitleFormat;

// @module: File and directory utilities

// @const: Largest subtitle file accepted for translation
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

// @const: Extensions accepted as subtitle input
pub const SUBTITLE_EXTENSIONS: [&str; 4] = ["srt", "vtt", "ass", "ssa"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for a translated subtitle
    // @params: input_file, output_dir, target_language, format
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
        format: SubtitleFormat,
    ) -> PathBuf {
        let name = input_file
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        output_dir
            .as_ref()
            .join(generate_translated_filename(&name, target_language, format))
    }

    /// Find subtitle files under a directory, sorted by path
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && has_subtitle_extension(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a subtitle file, decoding by byte order mark
    pub fn read_subtitle<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        decode_text(&bytes).with_context(|| format!("Failed to decode file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Check extension and size before a file is read
    pub fn validate_subtitle_path<P: AsRef<Path>>(path: P) -> Result<SubtitleFormat> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(anyhow!("File does not exist: {:?}", path));
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SUBTITLE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SubtitleError::UnsupportedExtension(format!(".{}", extension)).into());
        }

        let size = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?
            .len();
        if size > MAX_FILE_SIZE {
            return Err(SubtitleError::FileTooLarge {
                size,
                limit: MAX_FILE_SIZE,
            }
            .into());
        }

        extension.parse()
    }
}

fn has_subtitle_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| SUBTITLE_EXTENSIONS.contains(&ext.to_string_lossy().to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode subtitle bytes: UTF-16 by BOM, UTF-8 otherwise with any BOM stripped
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => Ok(String::from_utf8(rest.to_vec())?),
        _ => Ok(String::from_utf8(bytes.to_vec())?),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(anyhow!("UTF-16 content has an odd number of bytes"));
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]])).collect();
    Ok(String::from_utf16(&units)?)
}

/// `<stem>_<target>.<ext>` for the exported file
pub fn generate_translated_filename(name: &str, target_language: &str, format: SubtitleFormat) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "subtitle".to_string());

    format!("{}_{}.{}", stem, target_language, format.extension())
}

/// Human readable size with one decimal place above bytes
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
