//! # Main Optimizer Orchestrator Module
//!
//! Questo è il modulo principale che orchestra il batch di ottimizzazione.
//!
//! ## Responsabilità:
//! - Validazione config e preflight degli encoder richiesti
//! - Discovery degli input (file espliciti e directory ricorsive)
//! - Fan-out parallelo con worker pool limitato da semaforo
//! - Aggregazione statistiche e report finale
//! - Output: progress bar interattiva oppure eventi JSON per riga
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: config coerente prima di toccare il filesystem
//! 2. **Discovery**: espansione degli input in una lista piatta di file
//! 3. **Preflight**: tabella disponibilità degli encoder che serviranno
//! 4. **Processing**: un task per file, concorrenza limitata dai workers
//! 5. **Reporting**: statistiche aggregate a fine batch
//!
//! ## Error handling:
//! - Errori sui singoli file non fermano il batch
//! - Il preflight fallisce solo se NESSUN encoder richiesto è disponibile
//! - Il chiamante decide l'exit code dal conteggio errori

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::encoder::{Encoder, FileType};
use crate::engine::EngineRegistry;
use crate::file_manager::FileManager;
use crate::json_output::JsonMessage;
use crate::pipeline::FileProcessor;
use crate::platform::PlatformCommands;
use crate::progress::{OptimizationStats, ProgressManager};
use crate::savings;

/// Per-file ceiling, generous enough for large photos on slow encoders
const FILE_TIMEOUT: Duration = Duration::from_secs(180);

/// Main batch orchestrator
pub struct ImageOptimizer {
    config: Arc<Config>,
    registry: Arc<EngineRegistry>,
}

impl ImageOptimizer {
    /// Create an optimizer backed by the command line encoders
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, EngineRegistry::with_command_engines())
    }

    /// Create an optimizer with a custom engine registry
    pub fn with_registry(config: Config, registry: EngineRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        })
    }

    /// Run the whole batch and return the aggregated statistics
    pub async fn run(&self, inputs: &[PathBuf]) -> Result<OptimizationStats> {
        let start_time = std::time::Instant::now();

        info!("Starting image optimization for {} input(s)", inputs.len());
        if self.config.min_savings > 0.0 {
            info!("🎯 Minimum savings: {}%", self.config.min_savings);
        } else {
            info!("🎯 Keeping every encoder result");
        }
        info!("📁 Destination template: {}", self.config.saving.destination);
        if self.config.saving.delete_original {
            info!("🗑️ Originals are deleted when the destination differs");
        }

        let files = FileManager::collect_inputs(inputs).await?;
        info!("Found {} image files to process", files.len());

        if self.config.json_output {
            JsonMessage::start(files.len(), &self.config).emit();
        }

        let mut stats = OptimizationStats::new();
        if files.is_empty() {
            info!("No image files found to process");
            if self.config.json_output {
                JsonMessage::complete(&stats, start_time.elapsed().as_secs_f64()).emit();
            }
            return Ok(stats);
        }

        self.check_dependencies(&files).await?;

        let progress = if self.config.json_output {
            None
        } else {
            Some(ProgressManager::new(files.len() as u64))
        };

        let total_files = files.len();
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = Vec::new();

        for (index, file_path) in files.into_iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await?;
            let processor = FileProcessor::new(self.config.clone(), self.registry.clone());
            let progress_clone = progress.clone();
            let json_output = self.config.json_output;

            let task = tokio::spawn(async move {
                let _permit = permit; // Keep permit alive

                if json_output {
                    let size = FileManager::file_size(&file_path).await.unwrap_or(0);
                    JsonMessage::file_start(file_path.clone(), size, index + 1, total_files)
                        .emit();
                }

                let result = match tokio::time::timeout(
                    FILE_TIMEOUT,
                    processor.process(&file_path),
                )
                .await
                {
                    Ok(result) => result.map_err(anyhow::Error::from),
                    Err(_) => {
                        error!("File processing timed out: {}", file_path.display());
                        Err(anyhow::anyhow!(
                            "processing timed out after {}s",
                            FILE_TIMEOUT.as_secs()
                        ))
                    }
                };

                let name = file_path.file_name().unwrap_or_default().to_string_lossy();
                let message = match &result {
                    Ok(outcome) if outcome.reverted => format!("⏩ {}: reverted", name),
                    Ok(outcome) => {
                        format!("✅ {}: {}", name, savings::format_percent(outcome.ratio))
                    }
                    Err(_) => format!("❌ {}: error", name),
                };
                if let Some(progress) = &progress_clone {
                    progress.update(&message);
                }

                if json_output {
                    match &result {
                        Ok(outcome) => JsonMessage::file_complete(outcome).emit(),
                        Err(error) => {
                            JsonMessage::file_error(file_path.clone(), error.to_string()).emit()
                        }
                    }
                }

                result
            });

            tasks.push(task);
        }

        for task in tasks {
            match task.await? {
                Ok(outcome) if outcome.reverted => stats.add_reverted(outcome.original_size),
                Ok(outcome) => stats.add_replaced(outcome.original_size, outcome.final_size),
                Err(error) => {
                    stats.add_error();
                    error!("Failed to process file: {}", error);
                }
            }
        }

        if let Some(progress) = &progress {
            progress.finish(&stats.format_summary());
        }

        if self.config.json_output {
            JsonMessage::complete(&stats, start_time.elapsed().as_secs_f64()).emit();
        } else {
            self.print_final_stats(&stats);
        }

        Ok(stats)
    }

    /// Probe the encoders the batch will actually need.
    ///
    /// Fallisce solo quando nessuno degli encoder richiesti è utilizzabile;
    /// un sottoinsieme mancante produce errori per-file più avanti.
    async fn check_dependencies(&self, files: &[PathBuf]) -> Result<()> {
        let platform = PlatformCommands::instance();
        let mut required: Vec<Encoder> = Vec::new();
        for file in files {
            let file_type = file
                .extension()
                .and_then(|ext| FileType::from_extension(&ext.to_string_lossy()));
            if let Some(file_type) = file_type {
                let (encoder, _) = self.config.encoder.select(file_type);
                if !required.contains(&encoder) {
                    required.push(encoder);
                }
            }
        }

        if required.is_empty() {
            return Ok(());
        }

        info!("🔧 Checking required encoders:");
        let mut missing = Vec::new();
        for encoder in &required {
            if self.registry.is_available(*encoder).await {
                info!("  ✅ {} ({})", encoder, platform.tool_name(*encoder));
            } else {
                info!("  ❌ {} ({})", encoder, platform.tool_name(*encoder));
                missing.push(*encoder);
            }
        }

        if missing.len() == required.len() {
            let names: Vec<&str> = required.iter().map(|e| e.id()).collect();
            anyhow::bail!(
                "none of the required encoders are installed ({})",
                names.join(", ")
            );
        }
        if !missing.is_empty() {
            warn!(
                "{} encoder(s) unavailable, affected files will fail",
                missing.len()
            );
        }

        Ok(())
    }

    fn print_final_stats(&self, stats: &OptimizationStats) {
        info!("=== Optimization Complete ===");
        info!("Files processed: {}", stats.files_processed);
        info!("Files replaced: {}", stats.files_replaced);
        info!("Files reverted: {}", stats.files_reverted);
        info!("Errors: {}", stats.errors);
        info!("Bytes saved: {}", stats.format_bytes_saved());
        info!("Overall reduction: {:.2}%", stats.overall_reduction_percent());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EncoderEngine;
    use crate::error::OptimizeError;
    use crate::options::EncoderOptions;
    use futures::future::BoxFuture;
    use tempfile::TempDir;

    struct FixedEngine {
        payload: Vec<u8>,
    }

    impl EncoderEngine for FixedEngine {
        fn encode<'a>(
            &'a self,
            _options: &'a EncoderOptions,
            _input: &'a [u8],
        ) -> BoxFuture<'a, Result<Vec<u8>, OptimizeError>> {
            Box::pin(async move { Ok(self.payload.clone()) })
        }
    }

    #[tokio::test]
    async fn test_run_processes_directory_inputs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.jpg"), vec![0xAA; 1_000]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut registry = EngineRegistry::new();
        registry.insert(
            Encoder::Mozjpeg,
            Box::new(FixedEngine {
                payload: vec![1; 400],
            }),
        );

        let mut config = Config::default();
        config.min_savings = 0.0;
        config.workers = 2;
        let optimizer = ImageOptimizer::with_registry(config, registry).unwrap();

        let stats = optimizer
            .run(&[dir.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_replaced, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(
            std::fs::metadata(dir.path().join("a.jpg")).unwrap().len(),
            400
        );
    }

    #[tokio::test]
    async fn test_run_isolates_per_file_failures() {
        let dir = TempDir::new().unwrap();
        let jpg = dir.path().join("a.jpg");
        let png = dir.path().join("b.png");
        std::fs::write(&jpg, vec![0xAA; 1_000]).unwrap();
        std::fs::write(&png, vec![0xBB; 1_000]).unwrap();

        // only the jpg encoder is registered, the png one is missing
        let mut registry = EngineRegistry::new();
        registry.insert(
            Encoder::Mozjpeg,
            Box::new(FixedEngine {
                payload: vec![1; 400],
            }),
        );

        let mut config = Config::default();
        config.min_savings = 0.0;
        let optimizer = ImageOptimizer::with_registry(config, registry).unwrap();

        let stats = optimizer.run(&[jpg.clone(), png.clone()]).await.unwrap();

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_replaced, 1);
        assert_eq!(stats.errors, 1);
        // the failed file is untouched
        assert_eq!(std::fs::read(&png).unwrap(), vec![0xBB; 1_000]);
    }

    #[tokio::test]
    async fn test_run_counts_reverts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.jpg"), vec![0xAA; 1_000]).unwrap();

        let mut registry = EngineRegistry::new();
        registry.insert(
            Encoder::Mozjpeg,
            Box::new(FixedEngine {
                payload: vec![1; 990],
            }),
        );

        let mut config = Config::default();
        config.min_savings = 10.0;
        config.json_output = true;
        let optimizer = ImageOptimizer::with_registry(config, registry).unwrap();

        let stats = optimizer
            .run(&[dir.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(stats.files_reverted, 1);
        assert_eq!(stats.files_replaced, 0);
        assert_eq!(stats.bytes_saved(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_returns_default_stats() {
        let dir = TempDir::new().unwrap();

        let optimizer =
            ImageOptimizer::with_registry(Config::default(), EngineRegistry::new()).unwrap();
        let stats = optimizer.run(&[dir.path().to_path_buf()]).await.unwrap();

        assert_eq!(stats.files_processed, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_up_front() {
        let mut config = Config::default();
        config.encoder.jpg = Encoder::Svgo;

        assert!(ImageOptimizer::with_registry(config, EngineRegistry::new()).is_err());
    }
}
