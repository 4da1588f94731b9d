use std::io;

use thiserror::Error;

/// Configuration problems, detected before any corpus work begins.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
	#[error("unknown smoothing mode '{0}' (expected none, laplace, lidstone or turing)")]
	UnknownSmoothing(String),

	#[error("unknown back-off scheme '{0}' (expected brants, katz or katz-legacy)")]
	UnknownScheme(String),

	#[error("unknown cutoff action '{0}' (expected replace or delete)")]
	UnknownCutoffAction(String),

	#[error("unknown entry order '{0}' (expected descending or lexical)")]
	UnknownEntryOrder(String),

	#[error("lidstone smoothing requires a lambda weight")]
	MissingLambda,

	#[error("{name} must be a positive finite number, got {value}")]
	InvalidParameter { name: &'static str, value: f64 },

	#[error("back-off alpha must be in (0, 1), got {0}")]
	InvalidAlpha(f64),

	#[error("minimum sentence length must be at least 1")]
	InvalidSentenceLength,
}

/// Errors raised while building or writing a language model.
///
/// Everything except `Config` and `Io` signals an internal inconsistency
/// between tables and must never be papered over with a default value.
#[derive(Debug, Error)]
pub enum LmError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error("n-gram order must be between 1 and {max}, got {order}")]
	InvalidOrder { order: usize, max: usize },

	#[error("prefix of '{ngram}' is missing from the lower-order table")]
	MissingPrefix { ngram: String },

	#[error("lower-order continuation of '{ngram}' is missing from its table")]
	MissingSuffix { ngram: String },

	#[error("expected consecutive table orders, got {lower} and {higher}")]
	OrderMismatch { lower: usize, higher: usize },

	#[error("probability tables mix linear and log space")]
	SpaceMismatch,

	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
}

pub type Result<T, E = LmError> = std::result::Result<T, E>;
