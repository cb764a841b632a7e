//! # Encoder Engine Module
//!
//! Questo modulo esegue gli encoder esterni e traduce i record normalizzati
//! nelle righe di comando che ogni tool accetta.
//!
//! ## Responsabilità:
//! - Definisce il trait `EncoderEngine` (input bytes → output bytes)
//! - Implementa `CommandEngine`: scrive l'input in una directory temporanea,
//!   invoca il binario risolto da `PlatformCommands` e rilegge l'output
//! - Costruisce gli argomenti per ciascun encoder (cjpeg, cwebp, pngquant,
//!   optipng, gifsicle, gif2webp, svgo)
//! - Mantiene il registro encoder → engine usato dalla pipeline
//!
//! Gli engine non decidono mai se il risultato va tenuto: confronti di
//! dimensione e revert avvengono a valle.

use std::collections::HashMap;

use futures::future::BoxFuture;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::args;
use crate::encoder::Encoder;
use crate::error::OptimizeError;
use crate::options::{
    EncoderOptions, Gif2webpParams, GifsicleParams, LibwebpParams, MozjpegParams, OptipngParams,
    PngquantParams, SvgoParams,
};
use crate::platform::PlatformCommands;

/// Runs one encoder invocation over in-memory bytes.
///
/// Implementations must be cheap to share: the optimizer keeps a single
/// registry behind an `Arc` and calls into it from every worker.
pub trait EncoderEngine: Send + Sync {
    /// Encodes `input` according to `options` and returns the produced bytes.
    fn encode<'a>(
        &'a self,
        options: &'a EncoderOptions,
        input: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<u8>, OptimizeError>>;

    /// Whether the engine can actually run on this system.
    fn is_available(&self) -> BoxFuture<'_, bool> {
        Box::pin(async { true })
    }
}

/// Engine backed by the encoder's command line binary.
///
/// Ogni invocazione lavora in una directory temporanea propria: l'input viene
/// scritto su file, il tool gira file-to-file e l'output viene riletto in
/// memoria. La directory sparisce alla fine della chiamata.
pub struct CommandEngine {
    encoder: Encoder,
}

impl CommandEngine {
    pub fn new(encoder: Encoder) -> Self {
        Self { encoder }
    }

    async fn run(&self, options: &EncoderOptions, input: &[u8]) -> Result<Vec<u8>, OptimizeError> {
        let encoder = self.encoder;
        let platform = PlatformCommands::instance();

        if !platform.is_tool_available(encoder).await {
            return Err(OptimizeError::MissingDependency(
                platform.tool_name(encoder).to_string(),
            ));
        }

        let scratch = TempDir::new()?;
        let input_path = scratch
            .path()
            .join(format!("input.{}", scratch_input_extension(encoder)));
        let output_path = scratch
            .path()
            .join(format!("output.{}", encoder.extension()));
        tokio::fs::write(&input_path, input).await?;

        let tool_path = platform.resolve_tool(encoder);
        let command_args = build_args(
            options,
            &input_path.to_string_lossy(),
            &output_path.to_string_lossy(),
        );
        debug!("Running {:?} with args: {:?}", tool_path, command_args);

        let start_time = std::time::Instant::now();
        let output = Command::new(&tool_path).args(&command_args).output().await?;
        let elapsed = start_time.elapsed();

        if !output.status.success() {
            let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if message.is_empty() {
                message = format!("exited with {}", output.status);
            }
            warn!("{} failed after {:?}: {}", encoder, elapsed, message);
            return Err(OptimizeError::EncoderFailed { encoder, message });
        }
        debug!("{} completed in {:?}", encoder, elapsed);

        match tokio::fs::read(&output_path).await {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(OptimizeError::EmptyOutput(encoder))
            }
            Err(error) => Err(error.into()),
        }
    }
}

impl EncoderEngine for CommandEngine {
    fn encode<'a>(
        &'a self,
        options: &'a EncoderOptions,
        input: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<u8>, OptimizeError>> {
        Box::pin(self.run(options, input))
    }

    fn is_available(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            PlatformCommands::instance()
                .is_tool_available(self.encoder)
                .await
        })
    }
}

/// Extension given to the scratch input file.
///
/// Quasi tutti i tool riconoscono il formato dal contenuto; svgo invece
/// pretende un file `.svg`.
fn scratch_input_extension(encoder: Encoder) -> &'static str {
    match encoder {
        Encoder::Mozjpeg => "jpg",
        Encoder::Libwebp | Encoder::Pngquant | Encoder::Optipng => "png",
        Encoder::Gifsicle | Encoder::Gif2webp => "gif",
        Encoder::Svgo => "svg",
    }
}

/// Builds the command line arguments for one invocation.
pub fn build_args(options: &EncoderOptions, input: &str, output: &str) -> Vec<String> {
    match options {
        EncoderOptions::Mozjpeg(params) => mozjpeg_args(params, input, output),
        EncoderOptions::Libwebp(params) => libwebp_args(params, input, output),
        EncoderOptions::Pngquant(params) => pngquant_args(params, input, output),
        EncoderOptions::Optipng(params) => optipng_args(params, input, output),
        EncoderOptions::Gifsicle(params) => gifsicle_args(params, input, output),
        EncoderOptions::Gif2webp(params) => gif2webp_args(params, input, output),
        EncoderOptions::Svgo(params) => svgo_args(params, input, output),
    }
}

fn mozjpeg_args(params: &MozjpegParams, input: &str, output: &str) -> Vec<String> {
    let mut command_args = args!["-quality", &params.quality.to_string()];
    command_args.push(
        if params.progressive {
            "-progressive"
        } else {
            "-baseline"
        }
        .to_string(),
    );
    if params.fast_crush {
        command_args.push("-fastcrush".to_string());
    }
    command_args.extend(args!["-dc-scan-opt", &params.dc_scan_opt.to_string()]);
    if !params.trellis {
        command_args.push("-notrellis".to_string());
    }
    if !params.trellis_dc {
        command_args.push("-notrellis-dc".to_string());
    }
    command_args.push(format!("-tune-{}", params.tune.as_str()));
    if !params.overshoot {
        command_args.push("-noovershoot".to_string());
    }
    if params.arithmetic {
        command_args.push("-arithmetic".to_string());
    }
    command_args.extend(args!["-dct", params.dct.as_str()]);
    if params.quant_baseline {
        command_args.push("-quant-baseline".to_string());
    }
    if let Some(table) = params.quant_table {
        command_args.extend(args!["-quant-table", &table.to_string()]);
    }
    if let Some(smooth) = params.smooth {
        command_args.extend(args!["-smooth", &smooth.to_string()]);
    }
    command_args.extend(args!["-outfile", output, input]);
    command_args
}

fn libwebp_args(params: &LibwebpParams, input: &str, output: &str) -> Vec<String> {
    let mut command_args = args!["-preset", params.preset.as_str()];
    if params.lossless {
        command_args.push("-lossless".to_string());
    }
    if let Some(level) = params.near_lossless {
        command_args.extend(args!["-near_lossless", &level.to_string()]);
    }
    if let Some(quality) = params.quality {
        command_args.extend(args!["-q", &quality.to_string()]);
    }
    if let Some(alpha_quality) = params.alpha_quality {
        command_args.extend(args!["-alpha_q", &alpha_quality.to_string()]);
    }
    if let Some(method) = params.method {
        command_args.extend(args!["-m", &method.to_string()]);
    }
    if let Some(size) = params.target_size {
        command_args.extend(args!["-size", &size.to_string()]);
    }
    command_args.extend(args!["-sns", &params.sns.to_string()]);
    command_args.extend(args!["-f", &params.filter.to_string()]);
    if params.auto_filter {
        command_args.push("-af".to_string());
    }
    command_args.extend(args!["-sharpness", &params.sharpness.to_string()]);
    if !params.metadata.is_empty() {
        let list = params
            .metadata
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(",");
        command_args.extend(args!["-metadata", &list]);
    }
    command_args.extend(args![input, "-o", output]);
    command_args
}

fn pngquant_args(params: &PngquantParams, input: &str, output: &str) -> Vec<String> {
    let mut command_args = args!["--speed", &params.speed.to_string()];
    command_args.push(format!(
        "--quality=0-{}",
        (params.max_quality * 100.0).round() as u8
    ));
    if params.dithering > 0.0 {
        command_args.push(format!("--floyd={}", params.dithering));
    } else {
        command_args.push("--nofs".to_string());
    }
    if params.strip {
        command_args.push("--strip".to_string());
    }
    command_args.extend(args!["--force", "--output", output, input]);
    command_args
}

fn optipng_args(params: &OptipngParams, input: &str, output: &str) -> Vec<String> {
    let mut command_args = vec![format!("-o{}", params.optimization_level)];
    if !params.bit_depth_reduction {
        command_args.push("-nb".to_string());
    }
    if !params.color_type_reduction {
        command_args.push("-nc".to_string());
    }
    if !params.palette_reduction {
        command_args.push("-np".to_string());
    }
    command_args.extend(args!["-i", if params.interlaced { "1" } else { "0" }]);
    command_args.extend(args!["-out", output, input]);
    command_args
}

fn gifsicle_args(params: &GifsicleParams, input: &str, output: &str) -> Vec<String> {
    let mut command_args = vec![format!("-O{}", params.optimization_level)];
    command_args.extend(args!["--colors", &params.colors.to_string()]);
    if params.interlaced {
        command_args.push("--interlace".to_string());
    }
    command_args.extend(args![input, "-o", output]);
    command_args
}

fn gif2webp_args(params: &Gif2webpParams, input: &str, output: &str) -> Vec<String> {
    let mut command_args = Vec::new();
    if params.lossy {
        command_args.push("-lossy".to_string());
    }
    if params.mixed {
        command_args.push("-mixed".to_string());
    }
    command_args.extend(args!["-q", &params.quality.to_string()]);
    command_args.extend(args!["-m", &params.method.to_string()]);
    if params.minimize {
        command_args.push("-min_size".to_string());
    }
    command_args.extend(args!["-kmin", &params.kmin.to_string()]);
    command_args.extend(args!["-kmax", &params.kmax.to_string()]);
    command_args.extend(args!["-f", &params.filter.to_string()]);
    if !params.metadata.is_empty() {
        let list = params
            .metadata
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(",");
        command_args.extend(args!["-metadata", &list]);
    }
    if params.multi_threading {
        command_args.push("-mt".to_string());
    }
    command_args.extend(args![input, "-o", output]);
    command_args
}

fn svgo_args(params: &SvgoParams, input: &str, output: &str) -> Vec<String> {
    let mut command_args = Vec::new();
    for plugin in &params.plugins {
        command_args.push(format!("--enable={}", plugin));
    }
    command_args.extend(args!["-i", input, "-o", output]);
    command_args
}

/// Lookup table from encoder to its engine.
pub struct EngineRegistry {
    engines: HashMap<Encoder, Box<dyn EncoderEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    /// Registry with a `CommandEngine` for every known encoder.
    pub fn with_command_engines() -> Self {
        let mut registry = Self::new();
        for encoder in Encoder::ALL {
            registry.insert(encoder, Box::new(CommandEngine::new(encoder)));
        }
        registry
    }

    pub fn insert(&mut self, encoder: Encoder, engine: Box<dyn EncoderEngine>) {
        self.engines.insert(encoder, engine);
    }

    /// Whether an engine is registered for `encoder` and ready to run.
    pub async fn is_available(&self, encoder: Encoder) -> bool {
        match self.engines.get(&encoder) {
            Some(engine) => engine.is_available().await,
            None => false,
        }
    }

    /// Routes `options` to the engine registered for its encoder.
    pub async fn encode(
        &self,
        options: &EncoderOptions,
        input: &[u8],
    ) -> Result<Vec<u8>, OptimizeError> {
        let encoder = options.encoder();
        let engine = self
            .engines
            .get(&encoder)
            .ok_or_else(|| OptimizeError::MissingDependency(encoder.id().to_string()))?;
        engine.encode(options, input).await
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_command_engines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, WebpMetadata, WebpMode};
    use crate::options::normalize;

    fn options_for(config: &Config, encoder: Encoder) -> EncoderOptions {
        normalize(config, encoder).unwrap()
    }

    #[test]
    fn test_mozjpeg_default_args() {
        let config = Config::default();
        let command_args = build_args(&options_for(&config, Encoder::Mozjpeg), "in.jpg", "out.jpg");

        assert_eq!(&command_args[..2], &["-quality", "80"]);
        assert!(command_args.contains(&"-progressive".to_string()));
        assert!(command_args.contains(&"-tune-hvs-psnr".to_string()));
        assert!(!command_args.contains(&"-notrellis".to_string()));
        assert!(!command_args.contains(&"-quant-table".to_string()));
        assert!(!command_args.contains(&"-smooth".to_string()));
        assert_eq!(&command_args[command_args.len() - 3..], &["-outfile", "out.jpg", "in.jpg"]);
    }

    #[test]
    fn test_mozjpeg_quant_table_zero_emits_flag() {
        let mut config = Config::default();
        config.mozjpeg.quant_table = Some(0);
        config.mozjpeg.smooth = 30;
        let command_args = build_args(&options_for(&config, Encoder::Mozjpeg), "in.jpg", "out.jpg");

        let table_at = command_args.iter().position(|a| a == "-quant-table").unwrap();
        assert_eq!(command_args[table_at + 1], "0");
        let smooth_at = command_args.iter().position(|a| a == "-smooth").unwrap();
        assert_eq!(command_args[smooth_at + 1], "30");
    }

    #[test]
    fn test_libwebp_quality_mode_args() {
        let config = Config::default();
        let command_args = build_args(&options_for(&config, Encoder::Libwebp), "in.png", "out.webp");

        assert_eq!(&command_args[..2], &["-preset", "default"]);
        let q_at = command_args.iter().position(|a| a == "-q").unwrap();
        assert_eq!(command_args[q_at + 1], "75");
        assert!(command_args.contains(&"-alpha_q".to_string()));
        assert!(!command_args.contains(&"-lossless".to_string()));
        assert!(!command_args.contains(&"-near_lossless".to_string()));
        assert!(!command_args.contains(&"-size".to_string()));
        assert!(!command_args.contains(&"-metadata".to_string()));
        assert_eq!(&command_args[command_args.len() - 3..], &["in.png", "-o", "out.webp"]);
    }

    #[test]
    fn test_libwebp_near_lossless_args() {
        let mut config = Config::default();
        config.libwebp.mode = WebpMode::NearLossless;
        let command_args = build_args(&options_for(&config, Encoder::Libwebp), "in.png", "out.webp");

        assert!(command_args.contains(&"-lossless".to_string()));
        let level_at = command_args.iter().position(|a| a == "-near_lossless").unwrap();
        assert_eq!(command_args[level_at + 1], "60");
        // near-lossless drops the quality trio entirely
        assert!(!command_args.contains(&"-q".to_string()));
        assert!(!command_args.contains(&"-alpha_q".to_string()));
        assert!(!command_args.contains(&"-m".to_string()));
    }

    #[test]
    fn test_libwebp_metadata_is_comma_joined() {
        let mut config = Config::default();
        config.libwebp.metadata = vec![WebpMetadata::Exif, WebpMetadata::Xmp];
        let command_args = build_args(&options_for(&config, Encoder::Libwebp), "in.png", "out.webp");

        let meta_at = command_args.iter().position(|a| a == "-metadata").unwrap();
        assert_eq!(command_args[meta_at + 1], "exif,xmp");
    }

    #[test]
    fn test_pngquant_args() {
        let config = Config::default();
        let command_args =
            build_args(&options_for(&config, Encoder::Pngquant), "in.png", "out.png");
        assert_eq!(
            command_args,
            vec![
                "--speed", "4", "--quality=0-80", "--floyd=1", "--strip", "--force", "--output",
                "out.png", "in.png",
            ]
        );

        let mut config = Config::default();
        config.pngquant.dithering = 0.0;
        let command_args =
            build_args(&options_for(&config, Encoder::Pngquant), "in.png", "out.png");
        assert!(command_args.contains(&"--nofs".to_string()));
        assert!(!command_args.iter().any(|a| a.starts_with("--floyd")));
    }

    #[test]
    fn test_optipng_args() {
        let config = Config::default();
        let command_args = build_args(&options_for(&config, Encoder::Optipng), "in.png", "out.png");
        assert_eq!(
            command_args,
            vec!["-o3", "-i", "0", "-out", "out.png", "in.png"]
        );

        let mut config = Config::default();
        config.optipng.bit_depth_reduction = false;
        config.optipng.interlaced = true;
        let command_args = build_args(&options_for(&config, Encoder::Optipng), "in.png", "out.png");
        assert!(command_args.contains(&"-nb".to_string()));
        let interlace_at = command_args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(command_args[interlace_at + 1], "1");
    }

    #[test]
    fn test_gifsicle_args() {
        let config = Config::default();
        let command_args =
            build_args(&options_for(&config, Encoder::Gifsicle), "in.gif", "out.gif");
        assert_eq!(
            command_args,
            vec!["-O3", "--colors", "256", "in.gif", "-o", "out.gif"]
        );
    }

    #[test]
    fn test_gif2webp_mode_flags_are_exclusive() {
        use crate::config::Gif2webpMode;

        let mut config = Config::default();
        let command_args =
            build_args(&options_for(&config, Encoder::Gif2webp), "in.gif", "out.webp");
        assert!(command_args.contains(&"-mixed".to_string()));
        assert!(!command_args.contains(&"-lossy".to_string()));

        config.gif2webp.mode = Gif2webpMode::Lossless;
        let command_args =
            build_args(&options_for(&config, Encoder::Gif2webp), "in.gif", "out.webp");
        assert!(!command_args.contains(&"-mixed".to_string()));
        assert!(!command_args.contains(&"-lossy".to_string()));
    }

    #[test]
    fn test_svgo_args_enable_plugins_in_order() {
        let config = Config::default();
        let command_args = build_args(&options_for(&config, Encoder::Svgo), "in.svg", "out.svg");

        assert_eq!(command_args[0], "--enable=cleanupAttrs");
        assert!(command_args.contains(&"--enable=removeComments".to_string()));
        assert!(!command_args.contains(&"--enable=sortAttrs".to_string()));
        assert_eq!(&command_args[command_args.len() - 4..], &["-i", "in.svg", "-o", "out.svg"]);
    }

    struct FakeEngine {
        payload: Vec<u8>,
    }

    impl EncoderEngine for FakeEngine {
        fn encode<'a>(
            &'a self,
            _options: &'a EncoderOptions,
            _input: &'a [u8],
        ) -> BoxFuture<'a, Result<Vec<u8>, OptimizeError>> {
            Box::pin(async move { Ok(self.payload.clone()) })
        }
    }

    #[tokio::test]
    async fn test_registry_routes_by_encoder() {
        let mut registry = EngineRegistry::new();
        registry.insert(
            Encoder::Mozjpeg,
            Box::new(FakeEngine {
                payload: vec![1, 2, 3],
            }),
        );

        let config = Config::default();
        let options = options_for(&config, Encoder::Mozjpeg);
        let encoded = registry.encode(&options, &[9, 9, 9, 9]).await.unwrap();
        assert_eq!(encoded, vec![1, 2, 3]);

        let missing = options_for(&config, Encoder::Svgo);
        assert!(matches!(
            registry.encode(&missing, &[9, 9]).await,
            Err(OptimizeError::MissingDependency(_))
        ));
    }
}
