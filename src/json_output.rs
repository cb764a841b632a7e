//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON, un evento per riga
//! su stdout, pensato per host che pilotano il processo (editor, GUI, script).
//!
//! ## Tipi di messaggi:
//! - `start`: inizio del batch con configurazione effettiva
//! - `file_start`: inizio elaborazione di un file
//! - `file_complete`: fine elaborazione (sostituito o revertito)
//! - `file_error`: errore su un singolo file
//! - `complete`: fine batch con statistiche aggregate

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::encoder::EncoderPreference;
use crate::pipeline::{FlairVariant, Outcome};
use crate::progress::OptimizationStats;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del batch
    #[serde(rename = "start")]
    Start {
        total_files: usize,
        workers: usize,
        min_savings: f64,
        destination: String,
        encoder: EncoderPreference,
    },

    /// Inizio elaborazione di un file specifico
    #[serde(rename = "file_start")]
    FileStart {
        path: PathBuf,
        size: u64,
        index: usize,
        total: usize,
    },

    /// Fine elaborazione di un file specifico
    #[serde(rename = "file_complete")]
    FileComplete {
        path: PathBuf,
        destination: PathBuf,
        file_type: String,
        encoder: String,
        original_size: u64,
        final_size: u64,
        savings_percent: String,
        reverted: bool,
        status: FlairVariant,
        title: String,
        description: String,
    },

    /// Errore su un singolo file
    #[serde(rename = "file_error")]
    FileError { path: PathBuf, error: String },

    /// Batch completato
    #[serde(rename = "complete")]
    Complete {
        files_processed: usize,
        files_replaced: usize,
        files_reverted: usize,
        errors: usize,
        bytes_saved: i64,
        overall_reduction: f64,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Crea il messaggio di inizio batch
    pub fn start(total_files: usize, config: &crate::Config) -> Self {
        Self::Start {
            total_files,
            workers: config.workers,
            min_savings: config.min_savings,
            destination: config.saving.destination.clone(),
            encoder: config.encoder.clone(),
        }
    }

    /// Crea un messaggio di inizio file
    pub fn file_start(path: PathBuf, size: u64, index: usize, total: usize) -> Self {
        Self::FileStart {
            path,
            size,
            index,
            total,
        }
    }

    /// Crea un messaggio di completamento file
    pub fn file_complete(outcome: &Outcome) -> Self {
        Self::FileComplete {
            path: outcome.original_path.clone(),
            destination: outcome.destination.clone(),
            file_type: outcome.file_type.as_str().to_string(),
            encoder: outcome.encoder.id().to_string(),
            original_size: outcome.original_size,
            final_size: outcome.final_size,
            savings_percent: crate::savings::format_percent(outcome.ratio),
            reverted: outcome.reverted,
            status: outcome.flair.variant,
            title: outcome.flair.title.clone(),
            description: outcome.flair.description.clone(),
        }
    }

    /// Crea un messaggio di errore file
    pub fn file_error(path: PathBuf, error: String) -> Self {
        Self::FileError { path, error }
    }

    /// Crea il messaggio di completamento batch
    pub fn complete(stats: &OptimizationStats, duration_seconds: f64) -> Self {
        Self::Complete {
            files_processed: stats.files_processed,
            files_replaced: stats.files_replaced,
            files_reverted: stats.files_reverted,
            errors: stats.errors,
            bytes_saved: stats.bytes_saved(),
            overall_reduction: stats.overall_reduction_percent(),
            duration_seconds,
        }
    }
}
