//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `UnsupportedType`: Tipo di file non supportato (non è jpg/png/webp/svg/gif)
//! - `Template`: Template di destinazione malformato (fallisce prima dell'encoding)
//! - `EncoderFailed`: Il tool encoder esterno è terminato con errore
//! - `EmptyOutput`: L'encoder non ha prodotto alcun output
//! - `Declined`: L'encoder ha restituito l'input invariato (file rifiutato)
//! - `MissingDependency`: Tool encoder esterno non trovato nel PATH
//! - `Validation`: Errori di validazione della configurazione
//!
//! ## Esempio:
//! ```rust,ignore
//! if !tool_exists {
//!     return Err(OptimizeError::MissingDependency("cjpeg".to_string()));
//! }
//! ```

use crate::encoder::Encoder;
use crate::save_path::TemplateError;

/// Custom error types for image optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input type \"{0}\" not supported")]
    UnsupportedType(String),

    #[error("Destination template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Encoder {encoder} failed: {message}")]
    EncoderFailed { encoder: Encoder, message: String },

    #[error("Encoder {0} didn't produce any output")]
    EmptyOutput(Encoder),

    #[error("Encoder {0} refused to process the file")]
    Declined(Encoder),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
