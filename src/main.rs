//! # Image Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento del config file e applicazione degli override CLI
//! - Validazione degli input dell'utente
//! - Avvio dell'optimizer e scelta dell'exit code
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (input, soglia, workers, encoder, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose;
//!    su stderr in modalità JSON per lasciare stdout agli eventi)
//! 3. Carica il config file per-utente o quello passato con --config
//! 4. Applica gli override CLI e valida il risultato
//! 5. Istanzia ImageOptimizer e avvia il batch
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-optimizer ./photos --min-savings 10 --workers 8 --verbose
//! image-optimizer logo.png --png libwebp --destination '${dirname}/${filename}.${ext}'
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use image_optimizer::{Config, Encoder, FileType, ImageOptimizer};

#[derive(Parser)]
#[command(name = "image-optimizer")]
#[command(about = "Optimize images with the right encoder for each format")]
struct Args {
    /// Files or directories to optimize
    #[arg(required_unless_present = "save_config")]
    inputs: Vec<PathBuf>,

    /// Configuration file (JSON); falls back to the per-user config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum savings in percent required to keep an encoder result (0-100)
    #[arg(long)]
    min_savings: Option<f64>,

    /// Number of parallel workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Destination template; tokens: ${dirname}, ${basename}, ${filename},
    /// ${srcext}, ${ext}, ${encoder}
    #[arg(short, long)]
    destination: Option<String>,

    /// Delete the original file when the destination differs
    #[arg(long)]
    delete_original: bool,

    /// Overwrite existing destinations instead of picking a free " (n)" name
    #[arg(long)]
    overwrite: bool,

    /// Encoder for jpg inputs (mozjpeg, libwebp)
    #[arg(long)]
    jpg: Option<String>,

    /// Encoder for png inputs (pngquant, optipng, libwebp)
    #[arg(long)]
    png: Option<String>,

    /// Encoder for gif inputs (gifsicle, gif2webp)
    #[arg(long)]
    gif: Option<String>,

    /// Encoder for webp inputs (libwebp)
    #[arg(long)]
    webp: Option<String>,

    /// Encoder for svg inputs (svgo)
    #[arg(long)]
    svg: Option<String>,

    /// Emit line-oriented JSON events on stdout instead of the progress bar
    #[arg(long)]
    json: bool,

    /// Write the effective configuration to the per-user config file and exit
    #[arg(long)]
    save_config: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; JSON mode keeps stdout machine-readable
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    if args.json {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Config file does not exist: {}",
                path.display()
            ));
        }
        Config::from_file(path).await?
    } else if let Some(path) = Config::default_path() {
        Config::from_file(&path).await?
    } else {
        Config::default()
    };

    // Apply CLI overrides
    if let Some(min_savings) = args.min_savings {
        config.min_savings = min_savings;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(destination) = args.destination {
        config.saving.destination = destination;
    }
    if args.delete_original {
        config.saving.delete_original = true;
    }
    if args.overwrite {
        config.saving.overwrite = true;
    }
    if args.json {
        config.json_output = true;
    }

    let encoder_overrides = [
        (FileType::Jpg, &args.jpg),
        (FileType::Png, &args.png),
        (FileType::Gif, &args.gif),
        (FileType::Webp, &args.webp),
        (FileType::Svg, &args.svg),
    ];
    for (file_type, flag) in encoder_overrides {
        if let Some(name) = flag {
            let encoder: Encoder = name.parse()?;
            config.encoder.set_for_type(file_type, encoder);
        }
    }

    if args.save_config {
        config.validate()?;
        let path = Config::default_path().ok_or_else(|| {
            anyhow::anyhow!("No per-user config directory available on this platform")
        })?;
        config.save_to_file(&path).await?;
        info!("Configuration saved to {}", path.display());
        return Ok(());
    }

    // Validate arguments
    for input in &args.inputs {
        if !input.exists() {
            return Err(anyhow::anyhow!("Input does not exist: {}", input.display()));
        }
    }

    let optimizer = ImageOptimizer::new(config)?;
    let stats = optimizer.run(&args.inputs).await?;

    if stats.errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}
