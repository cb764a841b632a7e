//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la discovery degli input.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di immagini nelle directory passate da CLI
//! - Riconoscimento del tipo file da estensione e da contenuto
//! - Utilità per dimensioni file e formattazione human-readable
//!
//! ## Formati supportati:
//! - **Raster**: JPG, JPEG, PNG, WebP, GIF
//! - **Vettoriali**: SVG
//!
//! Lo sniffing del contenuto serve solo come avviso: un file `.png` che
//! contiene JPEG viene comunque processato secondo la sua estensione.

use std::path::{Path, PathBuf};

use tokio::fs;
use walkdir::WalkDir;

use crate::encoder::FileType;
use crate::error::OptimizeError;

/// Manages file discovery and size helpers
pub struct FileManager;

impl FileManager {
    /// Expand CLI inputs into a flat list of candidate files.
    ///
    /// Directories are walked recursively keeping only supported extensions;
    /// explicit file paths pass through untouched so that type errors surface
    /// per file during processing.
    pub async fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, OptimizeError> {
        let mut files = Vec::new();
        for input in inputs {
            let metadata = fs::metadata(input).await?;
            if metadata.is_dir() {
                files.extend(Self::find_image_files(input));
            } else {
                files.push(input.clone());
            }
        }
        Ok(files)
    }

    /// Find all supported image files under a directory
    pub fn find_image_files(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if Self::is_supported(path) {
                files.push(path.to_path_buf());
            }
        }

        files
    }

    /// Check if a path carries a supported image extension
    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| FileType::from_extension(&ext.to_string_lossy()))
            .is_some()
    }

    /// Guess the file type from leading bytes.
    ///
    /// SVG e formati sconosciuti restituiscono `None`.
    pub fn sniff_file_type(bytes: &[u8]) -> Option<FileType> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Jpeg => Some(FileType::Jpg),
            image::ImageFormat::Png => Some(FileType::Png),
            image::ImageFormat::WebP => Some(FileType::Webp),
            image::ImageFormat::Gif => Some(FileType::Gif),
            _ => None,
        }
    }

    /// Get the size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64, OptimizeError> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_image_files_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("photo.JPG"), b"x").unwrap();
        std::fs::write(nested.join("icon.svg"), b"<svg/>").unwrap();
        std::fs::write(nested.join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"x").unwrap();

        let mut found = FileManager::find_image_files(dir.path());
        found.sort();

        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["icon.svg", "photo.JPG"]);
    }

    #[tokio::test]
    async fn test_collect_inputs_passes_files_through() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("raw.bin");
        std::fs::write(&file, b"x").unwrap();

        // explicit files are kept even with unsupported extensions
        let files = FileManager::collect_inputs(&[file.clone()]).await.unwrap();
        assert_eq!(files, vec![file]);

        let missing = dir.path().join("ghost.png");
        assert!(matches!(
            FileManager::collect_inputs(&[missing]).await,
            Err(OptimizeError::Io(_))
        ));
    }

    #[test]
    fn test_sniff_file_type_from_magic_bytes() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(FileManager::sniff_file_type(&png), Some(FileType::Png));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(FileManager::sniff_file_type(&jpeg), Some(FileType::Jpg));

        assert_eq!(FileManager::sniff_file_type(b"GIF89a"), Some(FileType::Gif));
        assert_eq!(FileManager::sniff_file_type(b"<svg xmlns="), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(1536), "1.50 KB");
        assert_eq!(FileManager::format_size(2 * 1024 * 1024), "2.00 MB");
    }
}
