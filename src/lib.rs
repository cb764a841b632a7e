//! # Image Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione completa e validazione parametri
//! - `encoder`: Tipi file, encoder e preferenze per formato
//! - `options`: Normalizzazione config → parametri per encoder
//! - `engine`: Esecuzione degli encoder esterni e registry
//! - `savings`: Rapporto di risparmio, soglia e formattazione percentuali
//! - `save_path`: Template di destinazione e collisioni nomi
//! - `pipeline`: Catena completa per singolo file
//! - `optimizer`: Orchestratore del batch
//! - `file_manager`: Discovery file e utilità dimensioni
//! - `platform`: Nomi tool per piattaforma e probing disponibilità
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON line-oriented per host esterni
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use image_optimizer::{Config, ImageOptimizer};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let optimizer = ImageOptimizer::new(config)?;
//! optimizer.run(&[std::path::PathBuf::from("photos")]).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod optimizer;
pub mod options;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod savings;
pub mod save_path;
pub mod utils;

pub use config::Config;
pub use encoder::{Encoder, FileType};
pub use error::OptimizeError;
pub use optimizer::ImageOptimizer;
pub use pipeline::{FileProcessor, Outcome};
