//! # Encoder Selection Module
//!
//! Questo modulo definisce i tipi di file supportati e gli encoder disponibili.
//!
//! ## Responsabilità:
//! - Definisce `FileType` per i cinque formati supportati (jpg/png/webp/svg/gif)
//! - Definisce `Encoder` per i sette encoder esterni disponibili
//! - Mappa ogni encoder alla sua estensione di output (tabella fissa)
//! - Mantiene i set di compatibilità tipo-file → encoder ammessi
//! - Risolve la preferenza utente in un encoder concreto per ogni file
//!
//! ## Tabella estensioni:
//! - mozjpeg → jpg, libwebp → webp, pngquant → png, optipng → png
//! - gifsicle → gif, gif2webp → webp, svgo → svg
//!
//! ## Compatibilità:
//! - jpg: mozjpeg, libwebp
//! - png: pngquant, optipng, libwebp
//! - gif: gifsicle, gif2webp
//! - webp: libwebp
//! - svg: svgo

use crate::error::OptimizeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported input file types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Jpg,
    Png,
    Webp,
    Svg,
    Gif,
}

impl FileType {
    /// Determine the file type from an extension string (case-insensitive).
    /// `jpeg` is folded into `jpg`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(FileType::Jpg),
            "png" => Some(FileType::Png),
            "webp" => Some(FileType::Webp),
            "svg" => Some(FileType::Svg),
            "gif" => Some(FileType::Gif),
            _ => None,
        }
    }

    /// Determine the file type from a path, failing with `UnsupportedType`
    /// when the extension is missing or not one of the supported five.
    pub fn from_path(path: &Path) -> Result<Self, OptimizeError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                let shown = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("<none>");
                OptimizeError::UnsupportedType(shown.to_string())
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Jpg => "jpg",
            FileType::Png => "png",
            FileType::Webp => "webp",
            FileType::Svg => "svg",
            FileType::Gif => "gif",
        }
    }

    /// Encoders allowed for this file type. The first entry is the default
    /// preference.
    pub fn compatible_encoders(&self) -> &'static [Encoder] {
        match self {
            FileType::Jpg => &[Encoder::Mozjpeg, Encoder::Libwebp],
            FileType::Png => &[Encoder::Pngquant, Encoder::Optipng, Encoder::Libwebp],
            FileType::Gif => &[Encoder::Gifsicle, Encoder::Gif2webp],
            FileType::Webp => &[Encoder::Libwebp],
            FileType::Svg => &[Encoder::Svgo],
        }
    }

    pub fn default_encoder(&self) -> Encoder {
        self.compatible_encoders()[0]
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External encoder identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoder {
    Mozjpeg,
    Libwebp,
    Pngquant,
    Optipng,
    Gifsicle,
    Gif2webp,
    Svgo,
}

impl Encoder {
    pub const ALL: [Encoder; 7] = [
        Encoder::Mozjpeg,
        Encoder::Libwebp,
        Encoder::Pngquant,
        Encoder::Optipng,
        Encoder::Gifsicle,
        Encoder::Gif2webp,
        Encoder::Svgo,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Encoder::Mozjpeg => "mozjpeg",
            Encoder::Libwebp => "libwebp",
            Encoder::Pngquant => "pngquant",
            Encoder::Optipng => "optipng",
            Encoder::Gifsicle => "gifsicle",
            Encoder::Gif2webp => "gif2webp",
            Encoder::Svgo => "svgo",
        }
    }

    /// Output extension produced by this encoder (fixed table).
    pub fn extension(&self) -> &'static str {
        match self {
            Encoder::Mozjpeg => "jpg",
            Encoder::Libwebp => "webp",
            Encoder::Pngquant => "png",
            Encoder::Optipng => "png",
            Encoder::Gifsicle => "gif",
            Encoder::Gif2webp => "webp",
            Encoder::Svgo => "svg",
        }
    }

    /// Whether this encoder accepts the given input type.
    pub fn supports(&self, file_type: FileType) -> bool {
        file_type.compatible_encoders().contains(self)
    }
}

impl fmt::Display for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Encoder {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mozjpeg" => Ok(Encoder::Mozjpeg),
            "libwebp" => Ok(Encoder::Libwebp),
            "pngquant" => Ok(Encoder::Pngquant),
            "optipng" => Ok(Encoder::Optipng),
            "gifsicle" => Ok(Encoder::Gifsicle),
            "gif2webp" => Ok(Encoder::Gif2webp),
            "svgo" => Ok(Encoder::Svgo),
            other => Err(OptimizeError::Validation(format!(
                "Unknown encoder: {}",
                other
            ))),
        }
    }
}

/// Per-file-type encoder preference.
///
/// Invariant (enforced by `validate`): every chosen encoder belongs to the
/// compatibility set of its file type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderPreference {
    pub jpg: Encoder,
    pub png: Encoder,
    pub gif: Encoder,
    pub webp: Encoder,
    pub svg: Encoder,
}

impl Default for EncoderPreference {
    fn default() -> Self {
        Self {
            jpg: FileType::Jpg.default_encoder(),
            png: FileType::Png.default_encoder(),
            gif: FileType::Gif.default_encoder(),
            webp: FileType::Webp.default_encoder(),
            svg: FileType::Svg.default_encoder(),
        }
    }
}

impl EncoderPreference {
    /// Resolve the configured encoder for a file type, together with the
    /// output extension it produces.
    pub fn select(&self, file_type: FileType) -> (Encoder, &'static str) {
        let encoder = self.for_type(file_type);
        (encoder, encoder.extension())
    }

    pub fn for_type(&self, file_type: FileType) -> Encoder {
        match file_type {
            FileType::Jpg => self.jpg,
            FileType::Png => self.png,
            FileType::Gif => self.gif,
            FileType::Webp => self.webp,
            FileType::Svg => self.svg,
        }
    }

    pub fn set_for_type(&mut self, file_type: FileType, encoder: Encoder) {
        match file_type {
            FileType::Jpg => self.jpg = encoder,
            FileType::Png => self.png = encoder,
            FileType::Gif => self.gif = encoder,
            FileType::Webp => self.webp = encoder,
            FileType::Svg => self.svg = encoder,
        }
    }

    /// Check the compatibility invariant for every file type.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        for file_type in [
            FileType::Jpg,
            FileType::Png,
            FileType::Gif,
            FileType::Webp,
            FileType::Svg,
        ] {
            let encoder = self.for_type(file_type);
            if !encoder.supports(file_type) {
                return Err(OptimizeError::Validation(format!(
                    "Encoder {} can't handle {} files (allowed: {})",
                    encoder,
                    file_type,
                    file_type
                        .compatible_encoders()
                        .iter()
                        .map(|e| e.id())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("jpg"), Some(FileType::Jpg));
        assert_eq!(FileType::from_extension("jpeg"), Some(FileType::Jpg));
        assert_eq!(FileType::from_extension("JPEG"), Some(FileType::Jpg));
        assert_eq!(FileType::from_extension("png"), Some(FileType::Png));
        assert_eq!(FileType::from_extension("webp"), Some(FileType::Webp));
        assert_eq!(FileType::from_extension("svg"), Some(FileType::Svg));
        assert_eq!(FileType::from_extension("gif"), Some(FileType::Gif));
        assert_eq!(FileType::from_extension("tiff"), None);
        assert_eq!(FileType::from_extension(""), None);
    }

    #[test]
    fn test_file_type_from_path_unsupported() {
        let err = FileType::from_path(&PathBuf::from("photo.bmp")).unwrap_err();
        assert!(matches!(err, OptimizeError::UnsupportedType(ref ext) if ext == "bmp"));

        let err = FileType::from_path(&PathBuf::from("no_extension")).unwrap_err();
        assert!(matches!(err, OptimizeError::UnsupportedType(_)));
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(Encoder::Mozjpeg.extension(), "jpg");
        assert_eq!(Encoder::Libwebp.extension(), "webp");
        assert_eq!(Encoder::Pngquant.extension(), "png");
        assert_eq!(Encoder::Optipng.extension(), "png");
        assert_eq!(Encoder::Gifsicle.extension(), "gif");
        assert_eq!(Encoder::Gif2webp.extension(), "webp");
        assert_eq!(Encoder::Svgo.extension(), "svg");
    }

    #[test]
    fn test_gif_selection_round_trip() {
        // gif with gifsicle stays gif, gif with gif2webp becomes webp
        let mut prefs = EncoderPreference::default();
        assert_eq!(prefs.select(FileType::Gif), (Encoder::Gifsicle, "gif"));

        prefs.gif = Encoder::Gif2webp;
        assert_eq!(prefs.select(FileType::Gif), (Encoder::Gif2webp, "webp"));
    }

    #[test]
    fn test_default_preference_is_valid() {
        let prefs = EncoderPreference::default();
        assert!(prefs.validate().is_ok());
        assert_eq!(prefs.jpg, Encoder::Mozjpeg);
        assert_eq!(prefs.png, Encoder::Pngquant);
        assert_eq!(prefs.gif, Encoder::Gifsicle);
        assert_eq!(prefs.webp, Encoder::Libwebp);
        assert_eq!(prefs.svg, Encoder::Svgo);
    }

    #[test]
    fn test_incompatible_preference_rejected() {
        let mut prefs = EncoderPreference::default();
        prefs.png = Encoder::Svgo;
        assert!(prefs.validate().is_err());

        prefs.png = Encoder::Mozjpeg;
        assert!(prefs.validate().is_err());

        prefs.png = Encoder::Libwebp;
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn test_encoder_from_str() {
        assert_eq!("mozjpeg".parse::<Encoder>().unwrap(), Encoder::Mozjpeg);
        assert_eq!("GIF2WEBP".parse::<Encoder>().unwrap(), Encoder::Gif2webp);
        assert!("jpegtran".parse::<Encoder>().is_err());
    }

    #[test]
    fn test_compatibility_sets() {
        assert!(Encoder::Libwebp.supports(FileType::Jpg));
        assert!(Encoder::Libwebp.supports(FileType::Png));
        assert!(Encoder::Libwebp.supports(FileType::Webp));
        assert!(!Encoder::Libwebp.supports(FileType::Gif));
        assert!(!Encoder::Mozjpeg.supports(FileType::Png));
        assert!(!Encoder::Svgo.supports(FileType::Jpg));
        assert!(Encoder::Svgo.supports(FileType::Svg));
    }
}
