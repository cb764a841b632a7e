//! # Option Normalization Module
//!
//! Questo modulo trasforma la configurazione grezza nel set di parametri
//! esatto che ogni encoder esterno accetta.
//!
//! ## Responsabilità:
//! - Costruisce un record tipizzato per encoder (niente campi sconosciuti)
//! - Risolve i campi dipendenti dalla modalità con match espliciti
//!   (libwebp quality/lossless/near_lossless, gif2webp lossless/lossy/mixed)
//! - Distingue "non impostato" da zero dove zero è un valore valido
//!   (quant_table di mozjpeg)
//! - Converte la mappa di plugin svgo nella lista ordinata dei soli abilitati
//! - Interpreta il target size di libwebp (stringa di sole cifre → byte)
//!
//! I record vivono solo per la durata di una invocazione encoder e non
//! vengono mai serializzati.

use crate::config::{
    Config, Gif2webpMode, MozjpegDct, MozjpegTune, WebpMetadata, WebpMode, WebpPreset,
};
use crate::encoder::Encoder;
use crate::error::OptimizeError;

/// Normalized parameter record for one encode invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum EncoderOptions {
    Mozjpeg(MozjpegParams),
    Libwebp(LibwebpParams),
    Pngquant(PngquantParams),
    Optipng(OptipngParams),
    Gifsicle(GifsicleParams),
    Gif2webp(Gif2webpParams),
    Svgo(SvgoParams),
}

impl EncoderOptions {
    pub fn encoder(&self) -> Encoder {
        match self {
            EncoderOptions::Mozjpeg(_) => Encoder::Mozjpeg,
            EncoderOptions::Libwebp(_) => Encoder::Libwebp,
            EncoderOptions::Pngquant(_) => Encoder::Pngquant,
            EncoderOptions::Optipng(_) => Encoder::Optipng,
            EncoderOptions::Gifsicle(_) => Encoder::Gifsicle,
            EncoderOptions::Gif2webp(_) => Encoder::Gif2webp,
            EncoderOptions::Svgo(_) => Encoder::Svgo,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MozjpegParams {
    pub quality: u8,
    pub progressive: bool,
    pub fast_crush: bool,
    pub dc_scan_opt: u8,
    pub trellis: bool,
    pub trellis_dc: bool,
    pub tune: MozjpegTune,
    pub overshoot: bool,
    pub arithmetic: bool,
    pub dct: MozjpegDct,
    pub quant_baseline: bool,
    /// None = encoder default; Some(0) explicitly selects table 0
    pub quant_table: Option<u8>,
    /// None when the configured strength is zero
    pub smooth: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibwebpParams {
    pub preset: WebpPreset,
    /// Populated in quality mode only
    pub quality: Option<u8>,
    /// Populated in quality mode only
    pub alpha_quality: Option<u8>,
    /// Populated in quality mode only
    pub method: Option<u8>,
    /// Set by the lossless and near_lossless modes
    pub lossless: bool,
    /// Populated in near_lossless mode only
    pub near_lossless: Option<u8>,
    /// Target size in bytes, parsed from the digits-only config field
    pub target_size: Option<u64>,
    pub metadata: Vec<WebpMetadata>,
    pub sns: u8,
    pub filter: u8,
    pub auto_filter: bool,
    pub sharpness: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PngquantParams {
    pub speed: u8,
    pub max_quality: f64,
    pub dithering: f64,
    pub strip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptipngParams {
    pub optimization_level: u8,
    pub bit_depth_reduction: bool,
    pub color_type_reduction: bool,
    pub palette_reduction: bool,
    pub interlaced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GifsicleParams {
    pub optimization_level: u8,
    pub colors: u16,
    pub interlaced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gif2webpParams {
    /// Set only when the configured mode is exactly `lossy`
    pub lossy: bool,
    /// Set only when the configured mode is exactly `mixed`
    pub mixed: bool,
    pub quality: u8,
    pub method: u8,
    pub minimize: bool,
    pub kmin: u32,
    pub kmax: u32,
    pub filter: u8,
    pub metadata: Vec<WebpMetadata>,
    pub multi_threading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgoParams {
    /// Enabled plugin names in declaration order
    pub plugins: Vec<&'static str>,
}

/// Build the normalized record for `encoder` from the raw configuration.
pub fn normalize(config: &Config, encoder: Encoder) -> Result<EncoderOptions, OptimizeError> {
    let options = match encoder {
        Encoder::Mozjpeg => EncoderOptions::Mozjpeg(normalize_mozjpeg(config)),
        Encoder::Libwebp => EncoderOptions::Libwebp(normalize_libwebp(config)?),
        Encoder::Pngquant => EncoderOptions::Pngquant(PngquantParams {
            speed: config.pngquant.speed,
            max_quality: config.pngquant.max_quality,
            dithering: config.pngquant.dithering,
            strip: config.pngquant.strip,
        }),
        Encoder::Optipng => EncoderOptions::Optipng(OptipngParams {
            optimization_level: config.optipng.optimization_level,
            bit_depth_reduction: config.optipng.bit_depth_reduction,
            color_type_reduction: config.optipng.color_type_reduction,
            palette_reduction: config.optipng.palette_reduction,
            interlaced: config.optipng.interlaced,
        }),
        Encoder::Gifsicle => EncoderOptions::Gifsicle(GifsicleParams {
            optimization_level: config.gifsicle.optimization_level,
            colors: config.gifsicle.colors,
            interlaced: config.gifsicle.interlaced,
        }),
        Encoder::Gif2webp => EncoderOptions::Gif2webp(normalize_gif2webp(config)),
        Encoder::Svgo => EncoderOptions::Svgo(SvgoParams {
            plugins: config
                .svgo
                .plugins()
                .into_iter()
                .filter(|(_, enabled)| *enabled)
                .map(|(name, _)| name)
                .collect(),
        }),
    };
    Ok(options)
}

fn normalize_mozjpeg(config: &Config) -> MozjpegParams {
    let section = &config.mozjpeg;
    MozjpegParams {
        quality: section.quality,
        progressive: section.progressive,
        fast_crush: section.fast_crush,
        dc_scan_opt: section.dc_scan_opt,
        trellis: section.trellis,
        trellis_dc: section.trellis_dc,
        tune: section.tune,
        overshoot: section.overshoot,
        arithmetic: section.arithmetic,
        dct: section.dct,
        quant_baseline: section.quant_baseline,
        quant_table: section.quant_table,
        smooth: if section.smooth > 0 {
            Some(section.smooth)
        } else {
            None
        },
    }
}

fn normalize_libwebp(config: &Config) -> Result<LibwebpParams, OptimizeError> {
    let section = &config.libwebp;

    let target_size = if section.size.is_empty() {
        None
    } else {
        let bytes = section.size.parse::<u64>().map_err(|_| {
            OptimizeError::Validation(format!(
                "libwebp size must be a positive integer (got \"{}\")",
                section.size
            ))
        })?;
        Some(bytes)
    };

    let (quality, alpha_quality, method, lossless, near_lossless) = match section.mode {
        WebpMode::Quality => (
            Some(section.quality),
            Some(section.alpha_quality),
            Some(section.method),
            false,
            None,
        ),
        WebpMode::Lossless => (None, None, None, true, None),
        WebpMode::NearLossless => (None, None, None, true, Some(section.near_lossless)),
    };

    Ok(LibwebpParams {
        preset: section.preset,
        quality,
        alpha_quality,
        method,
        lossless,
        near_lossless,
        target_size,
        metadata: section.metadata.clone(),
        sns: section.sns,
        filter: section.filter,
        auto_filter: section.auto_filter,
        sharpness: section.sharpness,
    })
}

fn normalize_gif2webp(config: &Config) -> Gif2webpParams {
    let section = &config.gif2webp;

    let (lossy, mixed) = match section.mode {
        Gif2webpMode::Lossless => (false, false),
        Gif2webpMode::Lossy => (true, false),
        Gif2webpMode::Mixed => (false, true),
    };

    Gif2webpParams {
        lossy,
        mixed,
        quality: section.quality,
        method: section.method,
        minimize: section.minimize,
        kmin: section.kmin,
        kmax: section.kmax,
        filter: section.filter,
        metadata: section.metadata.clone(),
        multi_threading: section.multi_threading,
    }
}
