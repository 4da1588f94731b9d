use serde::{Deserialize, Serialize};

use crate::arpa::EntryOrder;
use crate::error::ConfigError;
use crate::model::backoff::{BackoffKind, BackoffScheme, DEFAULT_ALPHA};
use crate::model::cutoff::CutoffAction;
use crate::model::probability::Space;
use crate::model::smoothing::{DEFAULT_EPSILON, Smoothing, SmoothingKind};

/// Sentences with fewer tokens than this are left out of n-gram extraction.
pub const DEFAULT_MIN_SENTENCE_LEN: usize = 4;

/// Every knob of one model build.
///
/// Deserializable from a JSON file where every field is optional; missing
/// fields take the defaults below.
///
/// # Defaults
/// - `smoothing`: `none`, `epsilon`: 1, `lambda`: unset
/// - `cutoff`: 1, `cutoff_action`: `replace`
/// - `backoff`: off, `backoff_scheme`: `brants`, `alpha`: 0.4
/// - `min_sentence_len`: 4, `log_space`: off, `entry_order`: `descending`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
	pub smoothing: SmoothingKind,
	/// Additive constant for `laplace`.
	pub epsilon: f64,
	/// Additive weight for `lidstone`; required by that mode.
	pub lambda: Option<f64>,
	/// Tokens seen at most this many times are rare.
	pub cutoff: u64,
	pub cutoff_action: CutoffAction,
	/// Include back-off weights in the output.
	pub backoff: bool,
	pub backoff_scheme: BackoffKind,
	/// Brants discount factor.
	pub alpha: f64,
	pub min_sentence_len: usize,
	/// Compute in natural-log space instead of linear space.
	pub log_space: bool,
	pub entry_order: EntryOrder,
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			smoothing: SmoothingKind::None,
			epsilon: DEFAULT_EPSILON,
			lambda: None,
			cutoff: 1,
			cutoff_action: CutoffAction::Replace,
			backoff: false,
			backoff_scheme: BackoffKind::Brants,
			alpha: DEFAULT_ALPHA,
			min_sentence_len: DEFAULT_MIN_SENTENCE_LEN,
			log_space: false,
			entry_order: EntryOrder::Descending,
		}
	}
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
	if value.is_finite() && value > 0.0 {
		Ok(value)
	} else {
		Err(ConfigError::InvalidParameter { name, value })
	}
}

impl BuildConfig {
	/// Resolves the smoothing selector and its parameter.
	///
	/// # Errors
	/// - `MissingLambda` for `lidstone` without `lambda`
	/// - `InvalidParameter` for a non-positive or non-finite weight
	pub fn smoothing(&self) -> Result<Smoothing, ConfigError> {
		Ok(match self.smoothing {
			SmoothingKind::None => Smoothing::None,
			SmoothingKind::Laplace => Smoothing::Laplace { epsilon: positive("epsilon", self.epsilon)? },
			SmoothingKind::Lidstone => {
				let lambda = self.lambda.ok_or(ConfigError::MissingLambda)?;
				Smoothing::Lidstone { lambda: positive("lambda", lambda)? }
			}
			SmoothingKind::Turing => Smoothing::GoodTuring,
		})
	}

	pub fn backoff_scheme(&self) -> Result<BackoffScheme, ConfigError> {
		Ok(match self.backoff_scheme {
			BackoffKind::Brants => {
				if !(self.alpha > 0.0 && self.alpha < 1.0) {
					return Err(ConfigError::InvalidAlpha(self.alpha));
				}
				BackoffScheme::Brants { alpha: self.alpha }
			}
			BackoffKind::Katz => BackoffScheme::Katz,
			BackoffKind::KatzLegacy => BackoffScheme::KatzLegacy,
		})
	}

	pub fn space(&self) -> Space {
		if self.log_space { Space::Log } else { Space::Linear }
	}

	/// Checks the whole configuration before any corpus work.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.smoothing()?;
		self.backoff_scheme()?;
		if self.min_sentence_len == 0 {
			return Err(ConfigError::InvalidSentenceLength);
		}
		Ok(())
	}

	/// Output file name encoding smoothing, back-off and cutoff, e.g.
	/// `lm_smoothing-laplace_backoff-yes_cutoff-1.txt`.
	pub fn output_filename(&self) -> String {
		format!(
			"lm_smoothing-{}_backoff-{}_cutoff-{}.txt",
			self.smoothing,
			if self.backoff { "yes" } else { "no" },
			self.cutoff
		)
	}
}
