//! Top-level module for the n-gram model.
//!
//! Stages, leaves first:
//! - Corpus loading (`Corpus`)
//! - Frequency cutoff (`cutoff`)
//! - Window extraction (`NGram`, `ngram`)
//! - Counting (`FrequencyTable`) and smoothing (`Smoothing`)
//! - Conditional probabilities (`conditional`)
//! - Back-off weights (`BackoffScheme`)
//! - The assembled model (`LanguageModel`)

/// Back-off weight schemes and the resulting weight table.
pub mod backoff;

/// Conditional probability derivation across consecutive orders.
pub mod conditional;

/// Cleaned corpus representation and the reserved tokens.
pub mod corpus;

/// Rare-word detection and unknown-token substitution.
pub mod cutoff;

/// Occurrence counts per order.
pub mod frequency;

/// Full pipeline from corpus to immutable model.
pub mod language_model;

/// N-gram value type and sliding-window extraction.
pub mod ngram;

/// Probability tables and their numeric space.
pub mod probability;

/// Frequency estimation policies.
pub mod smoothing;
