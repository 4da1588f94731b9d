//! N-gram language model construction with ARPA export.
//!
//! This crate turns a cleaned, sentence-delimited corpus into a trigram
//! back-off language model:
//! - Frequency cutoff with unknown-word substitution
//! - Unigram, bigram and trigram extraction
//! - Interchangeable smoothing policies (none, Laplace, Lidstone, Good-Turing)
//! - Conditional probabilities and back-off weights (Brants, Katz)
//! - ARPA serialization
//!
//! Only the model, configuration and serialization APIs are public. File
//! handling stays internal.

/// Core n-gram tables and the model built from them.
pub mod model;

/// ARPA text rendering and output files.
pub mod arpa;

/// Build configuration, deserializable from JSON.
pub mod config;

/// Error types shared by every stage.
pub mod error;

/// Stage-boundary logging with elapsed time.
pub mod timing;

/// I/O utilities (file loading, output paths).
///
/// Not exposed
pub(crate) mod io;

pub use config::BuildConfig;
pub use error::{ConfigError, LmError};
pub use model::corpus::Corpus;
pub use model::language_model::LanguageModel;
