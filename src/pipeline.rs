//! # Per-File Pipeline Module
//!
//! Questo modulo esegue l'intera catena di ottimizzazione per un singolo file.
//!
//! ## Responsabilità:
//! - Determina il tipo file dall'estensione e sceglie l'encoder configurato
//! - Verifica il template di destinazione prima di toccare l'encoder
//! - Normalizza le opzioni e invoca l'engine registrato
//! - Applica la soglia di risparmio: revert (zero scritture) o replace
//! - Finalizza il replace con temp file + rename atomico nella directory
//!   di destinazione
//!
//! ## Ordine delle operazioni:
//! 1. tipo file → encoder → check template
//! 2. lettura input + sniff del contenuto (solo warning)
//! 3. normalize → encode → controlli output vuoto / identico
//! 4. evaluate → revert oppure resolve destination + persist
//!
//! Un revert non scrive mai niente: l'outcome punta al file originale.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, warn};

use crate::config::Config;
use crate::encoder::{Encoder, FileType};
use crate::engine::EngineRegistry;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::options::normalize;
use crate::savings::{self, Decision, SavingsKind};

/// Badge attached to an outcome, mirrored in logs and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlairVariant {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flair {
    pub variant: FlairVariant,
    pub title: String,
    pub description: String,
}

/// Result of one file run.
///
/// Su revert `destination`, `final_size` e `ratio` descrivono comunque il
/// file originale rimasto al suo posto.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub original_path: PathBuf,
    pub destination: PathBuf,
    pub file_type: FileType,
    pub encoder: Encoder,
    pub original_size: u64,
    pub final_size: u64,
    /// Signed savings ratio, negative when the kept result is smaller
    pub ratio: f64,
    pub reverted: bool,
    pub flair: Flair,
}

/// Runs the optimization chain for single files.
pub struct FileProcessor {
    config: Arc<Config>,
    registry: Arc<EngineRegistry>,
}

impl FileProcessor {
    pub fn new(config: Arc<Config>, registry: Arc<EngineRegistry>) -> Self {
        Self { config, registry }
    }

    /// Process one file end to end.
    pub async fn process(&self, path: &Path) -> Result<Outcome, OptimizeError> {
        let file_type = FileType::from_path(path)?;
        let (encoder, output_extension) = self.config.encoder.select(file_type);

        // template problems must surface before any encoder work
        self.config.saving.check_template(&["encoder"])?;

        let input = fs::read(path).await?;
        let original_size = input.len() as u64;

        if let Some(sniffed) = FileManager::sniff_file_type(&input) {
            if sniffed != file_type {
                warn!(
                    "{} has a {} extension but {} content",
                    path.display(),
                    file_type,
                    sniffed
                );
            }
        }

        debug!(
            "Optimizing {} ({}) with {}",
            path.display(),
            FileManager::format_size(original_size),
            encoder
        );

        let options = normalize(&self.config, encoder)?;
        let output = self.registry.encode(&options, &input).await?;

        if output.is_empty() {
            return Err(OptimizeError::EmptyOutput(encoder));
        }
        if output == input {
            return Err(OptimizeError::Declined(encoder));
        }

        let output_size = output.len() as u64;
        let ratio = savings::savings_ratio(original_size, output_size);

        match savings::evaluate(original_size, output_size, self.config.min_savings) {
            Decision::Revert => Ok(Outcome {
                original_path: path.to_path_buf(),
                destination: path.to_path_buf(),
                file_type,
                encoder,
                original_size,
                final_size: original_size,
                ratio,
                reverted: true,
                flair: Flair {
                    variant: FlairVariant::Warning,
                    title: "reverted".to_string(),
                    description: format!(
                        "File reverted as savings didn't reach {}%.",
                        self.config.min_savings
                    ),
                },
            }),
            Decision::Replace(kind) => {
                let destination = self.config.saving.resolve_destination(
                    path,
                    output_extension,
                    &[("encoder", encoder.id())],
                )?;
                persist_output(&output, &destination).await?;

                if self.config.saving.delete_original && destination != path {
                    fs::remove_file(path).await?;
                }

                let percent = savings::format_percent(ratio);
                let flair = match kind {
                    SavingsKind::Gain => Flair {
                        variant: FlairVariant::Success,
                        title: percent.clone(),
                        description: format!("Result is {} smaller than the original.", percent),
                    },
                    SavingsKind::Regression => Flair {
                        variant: FlairVariant::Danger,
                        title: format!("+{}", percent),
                        description: format!("Result is {} larger than the original.", percent),
                    },
                };

                Ok(Outcome {
                    original_path: path.to_path_buf(),
                    destination,
                    file_type,
                    encoder,
                    original_size,
                    final_size: output_size,
                    ratio,
                    reverted: false,
                    flair,
                })
            }
        }
    }
}

/// Write `bytes` to `destination` through a temp file in the same directory,
/// then rename into place.
async fn persist_output(bytes: &[u8], destination: &Path) -> Result<(), OptimizeError> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).await?;

    let temp = NamedTempFile::new_in(&parent)?;
    fs::write(temp.path(), bytes).await?;
    temp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}
