//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con una sezione per ogni encoder supportato
//! - Fornisce validazione robusta dei parametri (range numerici e compatibilità)
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Struttura:
//! - `encoder`: Preferenza encoder per tipo di file (jpg/png/gif/webp/svg)
//! - `min_savings`: Soglia minima di risparmio in percento (0 = disabilitata)
//! - `saving`: Template di destinazione e politica di sovrascrittura
//! - `workers`: Numero di file processati in parallelo
//! - `mozjpeg`/`libwebp`/`pngquant`/`optipng`/`gifsicle`/`gif2webp`/`svgo`:
//!   Parametri specifici di ogni encoder, con i default dello schema originale
//!
//! ## Validazione:
//! - Ogni campo numerico è controllato contro il proprio range
//! - La preferenza encoder deve rispettare i set di compatibilità
//! - Il campo `size` di libwebp accetta solo cifre (o stringa vuota)
//! - Il template di destinazione viene verificato in anticipo
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut config = Config::default();
//! config.min_savings = 10.0;
//! config.mozjpeg.quality = 85;
//! config.validate()?;
//! ```

use crate::encoder::EncoderPreference;
use crate::save_path::SavingOptions;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for image optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which encoder handles each file type
    pub encoder: EncoderPreference,
    /// Minimum savings in percent required to keep a result (0 = keep everything)
    pub min_savings: f64,
    /// Destination template and overwrite policy
    pub saving: SavingOptions,
    /// Number of parallel workers
    pub workers: usize,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    pub mozjpeg: MozjpegConfig,
    pub libwebp: LibwebpConfig,
    pub pngquant: PngquantConfig,
    pub optipng: OptipngConfig,
    pub gifsicle: GifsicleConfig,
    pub gif2webp: Gif2webpConfig,
    pub svgo: SvgoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoder: EncoderPreference::default(),
            min_savings: 0.0,
            saving: SavingOptions::default(),
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            json_output: false,
            mozjpeg: MozjpegConfig::default(),
            libwebp: LibwebpConfig::default(),
            pngquant: PngquantConfig::default(),
            optipng: OptipngConfig::default(),
            gifsicle: GifsicleConfig::default(),
            gif2webp: Gif2webpConfig::default(),
            svgo: SvgoConfig::default(),
        }
    }
}

/// mozjpeg (cjpeg) parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MozjpegConfig {
    /// Compression quality (0-100)
    pub quality: u8,
    /// Progressive JPEG output
    pub progressive: bool,
    /// Disable progressive scan optimization
    pub fast_crush: bool,
    /// DC scan optimization mode (0-2)
    pub dc_scan_opt: u8,
    /// Trellis quantization
    pub trellis: bool,
    /// Trellis quantization of DC coefficients
    pub trellis_dc: bool,
    /// Metric the trellis optimizes for
    pub tune: MozjpegTune,
    /// Black-on-white deringing via overshoot
    pub overshoot: bool,
    /// Arithmetic coding instead of Huffman
    pub arithmetic: bool,
    /// DCT algorithm
    pub dct: MozjpegDct,
    /// Use 8-bit quantization table entries
    pub quant_baseline: bool,
    /// Predefined quantization table (0-5); None keeps the encoder default.
    /// 0 is a valid table, distinct from unset.
    pub quant_table: Option<u8>,
    /// Smoothing strength (0-100, 0 = off)
    pub smooth: u8,
}

impl Default for MozjpegConfig {
    fn default() -> Self {
        Self {
            quality: 80,
            progressive: true,
            fast_crush: false,
            dc_scan_opt: 1,
            trellis: true,
            trellis_dc: true,
            tune: MozjpegTune::HvsPsnr,
            overshoot: true,
            arithmetic: false,
            dct: MozjpegDct::Int,
            quant_baseline: false,
            quant_table: None,
            smooth: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MozjpegTune {
    Psnr,
    HvsPsnr,
    Ssim,
    MsSsim,
}

impl MozjpegTune {
    pub fn as_str(&self) -> &'static str {
        match self {
            MozjpegTune::Psnr => "psnr",
            MozjpegTune::HvsPsnr => "hvs-psnr",
            MozjpegTune::Ssim => "ssim",
            MozjpegTune::MsSsim => "ms-ssim",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MozjpegDct {
    Int,
    Fast,
    Float,
}

impl MozjpegDct {
    pub fn as_str(&self) -> &'static str {
        match self {
            MozjpegDct::Int => "int",
            MozjpegDct::Fast => "fast",
            MozjpegDct::Float => "float",
        }
    }
}

/// libwebp (cwebp) parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibwebpConfig {
    /// Source material preset
    pub preset: WebpPreset,
    /// Compression mode; decides which of the fields below apply
    pub mode: WebpMode,
    /// Compression quality (0-100, quality mode only)
    pub quality: u8,
    /// Alpha channel quality (0-100, quality mode only)
    pub alpha_quality: u8,
    /// Compression effort (0-6, quality mode only)
    pub method: u8,
    /// Target size in bytes as free text; digits only, empty = no target
    pub size: String,
    /// Near-lossless level (0-100, near_lossless mode only)
    pub near_lossless: u8,
    /// Metadata blocks to copy over
    pub metadata: Vec<WebpMetadata>,
    /// Spatial noise shaping (0-100)
    pub sns: u8,
    /// Deblocking filter strength (0-100)
    pub filter: u8,
    /// Auto-adjust the filter strength
    pub auto_filter: bool,
    /// Filter sharpness (0-7)
    pub sharpness: u8,
}

impl Default for LibwebpConfig {
    fn default() -> Self {
        Self {
            preset: WebpPreset::Default,
            mode: WebpMode::Quality,
            quality: 75,
            alpha_quality: 100,
            method: 4,
            size: String::new(),
            near_lossless: 60,
            metadata: Vec::new(),
            sns: 80,
            filter: 0,
            auto_filter: false,
            sharpness: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebpPreset {
    Default,
    Photo,
    Picture,
    Drawing,
    Icon,
    Text,
}

impl WebpPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebpPreset::Default => "default",
            WebpPreset::Photo => "photo",
            WebpPreset::Picture => "picture",
            WebpPreset::Drawing => "drawing",
            WebpPreset::Icon => "icon",
            WebpPreset::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebpMode {
    Quality,
    Lossless,
    NearLossless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebpMetadata {
    Exif,
    Icc,
    Xmp,
}

impl WebpMetadata {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebpMetadata::Exif => "exif",
            WebpMetadata::Icc => "icc",
            WebpMetadata::Xmp => "xmp",
        }
    }
}

/// pngquant parameters, passed through as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PngquantConfig {
    /// Speed/quality trade-off (1-11, 11 = fastest)
    pub speed: u8,
    /// Quality ceiling as a fraction (0.1-1.0)
    pub max_quality: f64,
    /// Dithering level (0.0-1.0)
    pub dithering: f64,
    /// Remove optional metadata chunks
    pub strip: bool,
}

impl Default for PngquantConfig {
    fn default() -> Self {
        Self {
            speed: 4,
            max_quality: 0.8,
            dithering: 1.0,
            strip: true,
        }
    }
}

/// optipng parameters, passed through as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptipngConfig {
    /// Optimization level (0-7)
    pub optimization_level: u8,
    pub bit_depth_reduction: bool,
    pub color_type_reduction: bool,
    pub palette_reduction: bool,
    pub interlaced: bool,
}

impl Default for OptipngConfig {
    fn default() -> Self {
        Self {
            optimization_level: 3,
            bit_depth_reduction: true,
            color_type_reduction: true,
            palette_reduction: true,
            interlaced: false,
        }
    }
}

/// gifsicle parameters, passed through as configured
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GifsicleConfig {
    /// Optimization level (1-3)
    pub optimization_level: u8,
    /// Palette size (2-256)
    pub colors: u16,
    pub interlaced: bool,
}

impl Default for GifsicleConfig {
    fn default() -> Self {
        Self {
            optimization_level: 3,
            colors: 256,
            interlaced: false,
        }
    }
}

/// gif2webp parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Gif2webpConfig {
    /// Compression mode for the converted frames
    pub mode: Gif2webpMode,
    /// Lossy quality (0-100)
    pub quality: u8,
    /// Compression effort (0-6)
    pub method: u8,
    /// Minimize output size at the cost of speed
    pub minimize: bool,
    /// Minimum keyframe distance
    pub kmin: u32,
    /// Maximum keyframe distance
    pub kmax: u32,
    /// Deblocking filter strength (0-100)
    pub filter: u8,
    /// Metadata blocks to copy over (icc/xmp only)
    pub metadata: Vec<WebpMetadata>,
    pub multi_threading: bool,
}

impl Default for Gif2webpConfig {
    fn default() -> Self {
        Self {
            mode: Gif2webpMode::Mixed,
            quality: 75,
            method: 4,
            minimize: false,
            kmin: 9,
            kmax: 17,
            filter: 0,
            metadata: Vec::new(),
            multi_threading: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gif2webpMode {
    Lossless,
    Lossy,
    Mixed,
}

/// svgo plugin toggles, in svgo's own declaration order.
///
/// Field names mirror the upstream plugin identifiers, which is also how
/// they appear in the JSON config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SvgoConfig {
    pub cleanup_attrs: bool,
    pub merge_styles: bool,
    pub inline_styles: bool,
    pub remove_doctype: bool,
    #[serde(rename = "removeXMLProcInst")]
    pub remove_xml_proc_inst: bool,
    pub remove_comments: bool,
    pub remove_metadata: bool,
    pub remove_title: bool,
    pub remove_desc: bool,
    pub remove_useless_defs: bool,
    #[serde(rename = "removeXMLNS")]
    pub remove_xmlns: bool,
    #[serde(rename = "removeEditorsNSData")]
    pub remove_editors_ns_data: bool,
    pub remove_empty_attrs: bool,
    pub remove_hidden_elems: bool,
    pub remove_empty_text: bool,
    pub remove_empty_containers: bool,
    pub remove_view_box: bool,
    pub cleanup_enable_background: bool,
    pub minify_styles: bool,
    pub convert_style_to_attrs: bool,
    pub convert_colors: bool,
    pub convert_path_data: bool,
    pub convert_transform: bool,
    pub remove_unknowns_and_defaults: bool,
    pub remove_non_inheritable_group_attrs: bool,
    pub remove_useless_stroke_and_fill: bool,
    #[serde(rename = "removeUnusedNS")]
    pub remove_unused_ns: bool,
    pub prefix_ids: bool,
    #[serde(rename = "cleanupIDs")]
    pub cleanup_ids: bool,
    pub cleanup_numeric_values: bool,
    pub cleanup_list_of_values: bool,
    pub move_elems_attrs_to_group: bool,
    pub move_group_attrs_to_elems: bool,
    pub collapse_groups: bool,
    pub remove_raster_images: bool,
    pub merge_paths: bool,
    pub convert_shape_to_path: bool,
    pub convert_ellipse_to_circle: bool,
    pub sort_attrs: bool,
    pub sort_defs_children: bool,
    pub remove_dimensions: bool,
    pub remove_attrs: bool,
    pub remove_attributes_by_selector: bool,
    pub remove_elements_by_attr: bool,
    #[serde(rename = "addClassesToSVGElement")]
    pub add_classes_to_svg_element: bool,
    #[serde(rename = "addAttributesToSVGElement")]
    pub add_attributes_to_svg_element: bool,
    pub remove_off_canvas_paths: bool,
    pub remove_style_element: bool,
    pub remove_script_element: bool,
    pub reuse_paths: bool,
}

impl Default for SvgoConfig {
    fn default() -> Self {
        Self {
            cleanup_attrs: true,
            merge_styles: true,
            inline_styles: true,
            remove_doctype: true,
            remove_xml_proc_inst: true,
            remove_comments: true,
            remove_metadata: true,
            remove_title: true,
            remove_desc: true,
            remove_useless_defs: true,
            remove_xmlns: false,
            remove_editors_ns_data: true,
            remove_empty_attrs: true,
            remove_hidden_elems: true,
            remove_empty_text: true,
            remove_empty_containers: true,
            remove_view_box: true,
            cleanup_enable_background: true,
            minify_styles: true,
            convert_style_to_attrs: true,
            convert_colors: true,
            convert_path_data: true,
            convert_transform: true,
            remove_unknowns_and_defaults: true,
            remove_non_inheritable_group_attrs: true,
            remove_useless_stroke_and_fill: true,
            remove_unused_ns: true,
            prefix_ids: false,
            cleanup_ids: true,
            cleanup_numeric_values: true,
            cleanup_list_of_values: false,
            move_elems_attrs_to_group: true,
            move_group_attrs_to_elems: true,
            collapse_groups: true,
            remove_raster_images: false,
            merge_paths: true,
            convert_shape_to_path: true,
            convert_ellipse_to_circle: true,
            sort_attrs: false,
            sort_defs_children: true,
            remove_dimensions: false,
            remove_attrs: false,
            remove_attributes_by_selector: false,
            remove_elements_by_attr: false,
            add_classes_to_svg_element: false,
            add_attributes_to_svg_element: false,
            remove_off_canvas_paths: false,
            remove_style_element: false,
            remove_script_element: false,
            reuse_paths: false,
        }
    }
}

impl SvgoConfig {
    /// Every plugin with its toggle, in declaration order.
    pub fn plugins(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("cleanupAttrs", self.cleanup_attrs),
            ("mergeStyles", self.merge_styles),
            ("inlineStyles", self.inline_styles),
            ("removeDoctype", self.remove_doctype),
            ("removeXMLProcInst", self.remove_xml_proc_inst),
            ("removeComments", self.remove_comments),
            ("removeMetadata", self.remove_metadata),
            ("removeTitle", self.remove_title),
            ("removeDesc", self.remove_desc),
            ("removeUselessDefs", self.remove_useless_defs),
            ("removeXMLNS", self.remove_xmlns),
            ("removeEditorsNSData", self.remove_editors_ns_data),
            ("removeEmptyAttrs", self.remove_empty_attrs),
            ("removeHiddenElems", self.remove_hidden_elems),
            ("removeEmptyText", self.remove_empty_text),
            ("removeEmptyContainers", self.remove_empty_containers),
            ("removeViewBox", self.remove_view_box),
            ("cleanupEnableBackground", self.cleanup_enable_background),
            ("minifyStyles", self.minify_styles),
            ("convertStyleToAttrs", self.convert_style_to_attrs),
            ("convertColors", self.convert_colors),
            ("convertPathData", self.convert_path_data),
            ("convertTransform", self.convert_transform),
            ("removeUnknownsAndDefaults", self.remove_unknowns_and_defaults),
            (
                "removeNonInheritableGroupAttrs",
                self.remove_non_inheritable_group_attrs,
            ),
            (
                "removeUselessStrokeAndFill",
                self.remove_useless_stroke_and_fill,
            ),
            ("removeUnusedNS", self.remove_unused_ns),
            ("prefixIds", self.prefix_ids),
            ("cleanupIDs", self.cleanup_ids),
            ("cleanupNumericValues", self.cleanup_numeric_values),
            ("cleanupListOfValues", self.cleanup_list_of_values),
            ("moveElemsAttrsToGroup", self.move_elems_attrs_to_group),
            ("moveGroupAttrsToElems", self.move_group_attrs_to_elems),
            ("collapseGroups", self.collapse_groups),
            ("removeRasterImages", self.remove_raster_images),
            ("mergePaths", self.merge_paths),
            ("convertShapeToPath", self.convert_shape_to_path),
            ("convertEllipseToCircle", self.convert_ellipse_to_circle),
            ("sortAttrs", self.sort_attrs),
            ("sortDefsChildren", self.sort_defs_children),
            ("removeDimensions", self.remove_dimensions),
            ("removeAttrs", self.remove_attrs),
            ("removeAttributesBySelector", self.remove_attributes_by_selector),
            ("removeElementsByAttr", self.remove_elements_by_attr),
            ("addClassesToSVGElement", self.add_classes_to_svg_element),
            ("addAttributesToSVGElement", self.add_attributes_to_svg_element),
            ("removeOffCanvasPaths", self.remove_off_canvas_paths),
            ("removeStyleElement", self.remove_style_element),
            ("removeScriptElement", self.remove_script_element),
            ("reusePaths", self.reuse_paths),
        ]
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.encoder
            .validate()
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        if !(0.0..=100.0).contains(&self.min_savings) {
            return Err(anyhow::anyhow!("min_savings must be between 0 and 100"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        self.saving
            .check_template(&["encoder"])
            .map_err(|e| anyhow::anyhow!("Destination template error: {}", e))?;

        if self.mozjpeg.quality > 100 {
            return Err(anyhow::anyhow!("mozjpeg quality must be between 0 and 100"));
        }
        if self.mozjpeg.dc_scan_opt > 2 {
            return Err(anyhow::anyhow!("mozjpeg dc_scan_opt must be between 0 and 2"));
        }
        if let Some(table) = self.mozjpeg.quant_table {
            if table > 5 {
                return Err(anyhow::anyhow!("mozjpeg quant_table must be between 0 and 5"));
            }
        }
        if self.mozjpeg.smooth > 100 {
            return Err(anyhow::anyhow!("mozjpeg smooth must be between 0 and 100"));
        }

        if self.libwebp.quality > 100 {
            return Err(anyhow::anyhow!("libwebp quality must be between 0 and 100"));
        }
        if self.libwebp.alpha_quality > 100 {
            return Err(anyhow::anyhow!(
                "libwebp alpha_quality must be between 0 and 100"
            ));
        }
        if self.libwebp.method > 6 {
            return Err(anyhow::anyhow!("libwebp method must be between 0 and 6"));
        }
        if self.libwebp.near_lossless > 100 {
            return Err(anyhow::anyhow!(
                "libwebp near_lossless must be between 0 and 100"
            ));
        }
        if self.libwebp.sns > 100 {
            return Err(anyhow::anyhow!("libwebp sns must be between 0 and 100"));
        }
        if self.libwebp.filter > 100 {
            return Err(anyhow::anyhow!("libwebp filter must be between 0 and 100"));
        }
        if self.libwebp.sharpness > 7 {
            return Err(anyhow::anyhow!("libwebp sharpness must be between 0 and 7"));
        }
        if !self.libwebp.size.is_empty() {
            if !self.libwebp.size.chars().all(|c| c.is_ascii_digit()) {
                return Err(anyhow::anyhow!(
                    "libwebp size must be a positive integer (bytes)"
                ));
            }
            if self.libwebp.size.parse::<u64>().is_err() {
                return Err(anyhow::anyhow!("libwebp size is out of range"));
            }
        }

        if self.pngquant.speed == 0 || self.pngquant.speed > 11 {
            return Err(anyhow::anyhow!("pngquant speed must be between 1 and 11"));
        }
        if !(0.1..=1.0).contains(&self.pngquant.max_quality) {
            return Err(anyhow::anyhow!(
                "pngquant max_quality must be between 0.1 and 1.0"
            ));
        }
        if !(0.0..=1.0).contains(&self.pngquant.dithering) {
            return Err(anyhow::anyhow!(
                "pngquant dithering must be between 0.0 and 1.0"
            ));
        }

        if self.optipng.optimization_level > 7 {
            return Err(anyhow::anyhow!(
                "optipng optimization_level must be between 0 and 7"
            ));
        }

        if self.gifsicle.optimization_level == 0 || self.gifsicle.optimization_level > 3 {
            return Err(anyhow::anyhow!(
                "gifsicle optimization_level must be between 1 and 3"
            ));
        }
        if self.gifsicle.colors < 2 || self.gifsicle.colors > 256 {
            return Err(anyhow::anyhow!("gifsicle colors must be between 2 and 256"));
        }

        if self.gif2webp.quality > 100 {
            return Err(anyhow::anyhow!("gif2webp quality must be between 0 and 100"));
        }
        if self.gif2webp.method > 6 {
            return Err(anyhow::anyhow!("gif2webp method must be between 0 and 6"));
        }
        if self.gif2webp.filter > 100 {
            return Err(anyhow::anyhow!("gif2webp filter must be between 0 and 100"));
        }
        if self.gif2webp.metadata.contains(&WebpMetadata::Exif) {
            return Err(anyhow::anyhow!("gif2webp metadata supports only icc and xmp"));
        }

        Ok(())
    }

    /// Default config file location (`<config_dir>/image-optimizer/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("image-optimizer").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.min_savings, 0.0);
        assert!(config.workers >= 1);
        assert_eq!(config.mozjpeg.quality, 80);
        assert_eq!(config.mozjpeg.dc_scan_opt, 1);
        assert_eq!(config.mozjpeg.tune, MozjpegTune::HvsPsnr);
        assert_eq!(config.mozjpeg.quant_table, None);
        assert_eq!(config.libwebp.quality, 75);
        assert_eq!(config.libwebp.mode, WebpMode::Quality);
        assert_eq!(config.libwebp.near_lossless, 60);
        assert_eq!(config.libwebp.size, "");
        assert_eq!(config.pngquant.speed, 4);
        assert_eq!(config.pngquant.max_quality, 0.8);
        assert_eq!(config.optipng.optimization_level, 3);
        assert_eq!(config.gifsicle.colors, 256);
        assert_eq!(config.gif2webp.mode, Gif2webpMode::Mixed);
        assert_eq!(config.gif2webp.kmin, 9);
        assert_eq!(config.gif2webp.kmax, 17);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.mozjpeg.quality = 101;
        assert!(config.validate().is_err());

        config.mozjpeg.quality = 80;
        config.min_savings = 120.0;
        assert!(config.validate().is_err());

        config.min_savings = 10.0;
        config.workers = 0;
        assert!(config.validate().is_err());

        config.workers = 4;
        config.gifsicle.colors = 1;
        assert!(config.validate().is_err());

        config.gifsicle.colors = 256;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validates_quant_table_range() {
        let mut config = Config::default();
        config.mozjpeg.quant_table = Some(0);
        assert!(config.validate().is_ok());

        config.mozjpeg.quant_table = Some(5);
        assert!(config.validate().is_ok());

        config.mozjpeg.quant_table = Some(6);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validates_webp_size_digits() {
        let mut config = Config::default();
        config.libwebp.size = "150000".to_string();
        assert!(config.validate().is_ok());

        config.libwebp.size = "150KB".to_string();
        assert!(config.validate().is_err());

        config.libwebp.size = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validates_encoder_compatibility() {
        let mut config = Config::default();
        config.encoder.gif = Encoder::Mozjpeg;
        assert!(config.validate().is_err());

        config.encoder.gif = Encoder::Gif2webp;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validates_gif2webp_metadata() {
        let mut config = Config::default();
        config.gif2webp.metadata = vec![WebpMetadata::Icc, WebpMetadata::Xmp];
        assert!(config.validate().is_ok());

        config.gif2webp.metadata = vec![WebpMetadata::Exif];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_svgo_plugin_order_and_defaults() {
        let svgo = SvgoConfig::default();
        let plugins = svgo.plugins();
        assert_eq!(plugins.len(), 50);
        assert_eq!(plugins[0], ("cleanupAttrs", true));
        assert_eq!(plugins[10], ("removeXMLNS", false));
        assert_eq!(plugins[49], ("reusePaths", false));

        let enabled: Vec<&str> = plugins
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(enabled.len(), 35);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut original_config = Config::default();
        original_config.min_savings = 12.5;
        original_config.workers = 8;
        original_config.mozjpeg.quality = 85;
        original_config.mozjpeg.quant_table = Some(2);
        original_config.libwebp.mode = WebpMode::NearLossless;
        original_config.encoder.gif = Encoder::Gif2webp;
        original_config.svgo.sort_attrs = true;

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.min_savings, 12.5);
        assert_eq!(loaded_config.workers, 8);
        assert_eq!(loaded_config.mozjpeg.quality, 85);
        assert_eq!(loaded_config.mozjpeg.quant_table, Some(2));
        assert_eq!(loaded_config.libwebp.mode, WebpMode::NearLossless);
        assert_eq!(loaded_config.encoder.gif, Encoder::Gif2webp);
        assert!(loaded_config.svgo.sort_attrs);
    }

    #[tokio::test]
    async fn test_config_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("absent.json");

        let config = Config::from_file(&config_path).await.unwrap();
        assert_eq!(config.min_savings, 0.0);
        assert_eq!(config.mozjpeg.quality, 80);
    }
}
