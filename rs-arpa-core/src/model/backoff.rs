use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::conditional::conditional;
use super::ngram::NGram;
use super::probability::{ProbabilityTable, Space};
use crate::error::{ConfigError, LmError, Result};

/// Discount used by the Brants scheme when none is configured.
pub const DEFAULT_ALPHA: f64 = 0.4;

/// Back-off scheme selector as it appears in configuration.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BackoffKind {
	#[default]
	Brants,
	Katz,
	KatzLegacy,
}

impl FromStr for BackoffKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"brants" | "stupid" => Ok(Self::Brants),
			"katz" => Ok(Self::Katz),
			"katz-legacy" => Ok(Self::KatzLegacy),
			_ => Err(ConfigError::UnknownScheme(s.to_owned())),
		}
	}
}

impl fmt::Display for BackoffKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Brants => "brants",
			Self::Katz => "katz",
			Self::KatzLegacy => "katz-legacy",
		})
	}
}

/// How the weight reserved for unseen continuations is computed.
///
/// # Variants
/// - `Brants { alpha }`: a fixed discount, `log(alpha) + log(P)` for every
///   unigram and bigram. `P` is the unigram probability or the bigram
///   conditional. No reconciliation pass.
/// - `Katz`: for a history `h` with observed continuations `v`,
///   `(1 - sum P(v | h)) / (1 - sum P(v | h'))` where `h'` drops the first
///   token of `h` (plain unigram probabilities for a one-token history).
/// - `KatzLegacy`: the formula as historically shipped, written
///   `1 - num/1 - den`, which evaluates to `1 - num - den` over joint
///   probabilities with `den = P(h)` summed once per continuation. The
///   bigram level reads `1 - num/den`. The resulting alpha is multiplied by
///   `P(h)`. Kept to reproduce old models; it is not a distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackoffScheme {
	Brants { alpha: f64 },
	Katz,
	KatzLegacy,
}

impl BackoffScheme {
	pub fn kind(&self) -> BackoffKind {
		match self {
			BackoffScheme::Brants { .. } => BackoffKind::Brants,
			BackoffScheme::Katz => BackoffKind::Katz,
			BackoffScheme::KatzLegacy => BackoffKind::KatzLegacy,
		}
	}

	/// Computes back-off weights for every unigram and bigram.
	///
	/// The three tables hold joint probabilities of orders 1, 2 and 3 in a
	/// single space; the weights come back in that space.
	pub fn weights(
		&self,
		unigrams: &ProbabilityTable,
		bigrams: &ProbabilityTable,
		trigrams: &ProbabilityTable,
	) -> Result<BackoffTable> {
		let space = unigrams.space();
		let bigram_cond = conditional(unigrams, bigrams)?;

		let mut weights = BTreeMap::new();
		match *self {
			BackoffScheme::Brants { alpha } => {
				for (ngram, value) in unigrams.iter().chain(bigram_cond.iter()) {
					weights.insert(ngram.clone(), discount(space, alpha, value));
				}
			}
			BackoffScheme::Katz => {
				let trigram_cond = conditional(bigrams, trigrams)?;
				katz_level(unigrams, &bigram_cond, unigrams, &mut weights)?;
				katz_level(bigrams, &trigram_cond, &bigram_cond, &mut weights)?;
			}
			BackoffScheme::KatzLegacy => {
				legacy_level(unigrams, bigrams, &mut weights, |num, den| 1.0 - num / 1.0 - den);
				legacy_level(bigrams, trigrams, &mut weights, |num, den| {
					if den == 0.0 { 1.0 } else { 1.0 - num / den }
				});
			}
		}

		Ok(BackoffTable { space, weights })
	}
}

fn discount(space: Space, alpha: f64, value: f64) -> f64 {
	match space {
		Space::Linear => alpha * value,
		Space::Log => alpha.ln() + value,
	}
}

/// Katz weights for the histories in `histories`, given the conditionals of
/// the order above and the conditionals of the shortened history.
fn katz_level(
	histories: &ProbabilityTable,
	higher_cond: &ProbabilityTable,
	lower_cond: &ProbabilityTable,
	weights: &mut BTreeMap<NGram, f64>,
) -> Result<()> {
	let space = histories.space();
	let mut exhausted = 0usize;
	let mut degenerate = 0usize;

	for (history, _) in histories.iter() {
		let mut numerator = 0.0;
		let mut denominator = 0.0;
		for (ngram, value) in higher_cond.continuations(history) {
			numerator += space.to_linear(value);
			let lower = lower_cond
				.linear(&ngram.suffix())
				.ok_or_else(|| LmError::MissingSuffix { ngram: ngram.to_string() })?;
			denominator += lower;
		}

		let leftover = 1.0 - numerator;
		let weight = if numerator == 0.0 {
			1.0
		} else if 1.0 - denominator <= 0.0 {
			degenerate += 1;
			1.0
		} else if leftover <= 0.0 {
			exhausted += 1;
			0.0
		} else {
			leftover / (1.0 - denominator)
		};
		weights.insert(history.clone(), space.from_linear(weight));
	}

	if degenerate > 0 {
		log::warn!(
			"{}-gram back-off: {} histories with no lower-order mass left, weight set to 1",
			histories.order(),
			degenerate
		);
	}
	if exhausted > 0 {
		log::debug!(
			"{}-gram back-off: {} histories with no mass left for unseen continuations",
			histories.order(),
			exhausted
		);
	}
	Ok(())
}

fn legacy_level<F>(
	histories: &ProbabilityTable,
	higher: &ProbabilityTable,
	weights: &mut BTreeMap<NGram, f64>,
	alpha: F,
) where
	F: Fn(f64, f64) -> f64,
{
	let space = histories.space();
	let mut clamped = 0usize;

	for (history, value) in histories.iter() {
		let p = space.to_linear(value);
		let mut numerator = 0.0;
		let mut denominator = 0.0;
		for (_, higher_value) in higher.continuations(history) {
			numerator += space.to_linear(higher_value);
			denominator += p;
		}

		let mut weight = alpha(numerator, denominator) * p;
		if weight <= 0.0 {
			clamped += 1;
			weight = 0.0;
		}
		weights.insert(history.clone(), space.from_linear(weight));
	}

	if clamped > 0 {
		log::warn!(
			"{}-gram legacy Katz back-off: {} non-positive weights clamped to 0",
			histories.order(),
			clamped
		);
	}
}

/// Back-off weights keyed by unigram and bigram.
#[derive(Clone, Debug, PartialEq)]
pub struct BackoffTable {
	space: Space,
	weights: BTreeMap<NGram, f64>,
}

impl BackoffTable {
	pub fn space(&self) -> Space {
		self.space
	}

	pub fn get(&self, ngram: &NGram) -> Option<f64> {
		self.weights.get(ngram).copied()
	}

	/// Weight converted to a linear value.
	pub fn linear(&self, ngram: &NGram) -> Option<f64> {
		self.get(ngram).map(|w| self.space.to_linear(w))
	}

	pub fn len(&self) -> usize {
		self.weights.len()
	}

	pub fn is_empty(&self) -> bool {
		self.weights.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&NGram, f64)> {
		self.weights.iter().map(|(ngram, w)| (ngram, *w))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::frequency::FrequencyTable;
	use crate::model::ngram::extract_sentences;
	use crate::model::smoothing::Smoothing;

	fn tables(text: &str, smoothing: Smoothing) -> [ProbabilityTable; 3] {
		let sentences: Vec<Vec<&str>> = text.lines().map(|l| l.split_whitespace().collect()).collect();
		[1, 2, 3].map(|n| {
			let grams = extract_sentences(&sentences, n, 1).unwrap();
			smoothing.estimate(&FrequencyTable::from_ngrams(n, grams))
		})
	}

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn brants_discounts_probability_and_conditional() {
		let [uni, bi, tri] = tables("a b a b", Smoothing::None);
		let bow = BackoffScheme::Brants { alpha: 0.4 }.weights(&uni, &bi, &tri).unwrap();
		assert!(close(bow.get(&NGram::new(["a"])).unwrap(), 0.4 * 0.5));
		// P(b | a) = (2/3) / (2/4)
		assert!(close(bow.get(&NGram::new(["a", "b"])).unwrap(), 0.4 * (2.0 / 3.0) / 0.5));
		assert_eq!(bow.len(), uni.len() + bi.len());
	}

	#[test]
	fn brants_in_log_space_adds_log_alpha() {
		let [uni, bi, tri] = tables("a b a b", Smoothing::None).map(|t| t.into_space(Space::Log));
		let bow = BackoffScheme::Brants { alpha: 0.4 }.weights(&uni, &bi, &tri).unwrap();
		assert_eq!(bow.space(), Space::Log);
		assert!(close(bow.get(&NGram::new(["a"])).unwrap(), 0.4f64.ln() + 0.5f64.ln()));
	}

	#[test]
	fn katz_reserves_unseen_mass() {
		let [uni, bi, tri] = tables("x a b\ny a c\nx a c", Smoothing::Laplace { epsilon: 1.0 });
		let bow = BackoffScheme::Katz.weights(&uni, &bi, &tri).unwrap();

		let p = |t: &ProbabilityTable, g: &[&str]| t.linear(&NGram::new(g.iter().copied())).unwrap();
		let num = (p(&bi, &["a", "b"]) + p(&bi, &["a", "c"])) / p(&uni, &["a"]);
		let den = p(&uni, &["b"]) + p(&uni, &["c"]);
		assert!(num < 1.0);
		let expected = (1.0 - num) / (1.0 - den);
		assert!(close(bow.linear(&NGram::new(["a"])).unwrap(), expected));

		// no observed continuation: nothing reserved, plain back-off
		assert!(close(bow.linear(&NGram::new(["b"])).unwrap(), 1.0));
		assert!(close(bow.linear(&NGram::new(["a", "b"])).unwrap(), 1.0));
	}

	#[test]
	fn katz_without_leftover_mass_is_zero() {
		// unsmoothed: P(b | a) = (2/2) / (2/4) overshoots 1
		let [uni, bi, tri] = tables("a b\na b", Smoothing::None);
		let bow = BackoffScheme::Katz.weights(&uni, &bi, &tri).unwrap();
		assert_eq!(bow.linear(&NGram::new(["a"])), Some(0.0));
	}

	#[test]
	fn katz_without_lower_order_mass_falls_back_to_one() {
		let [uni, bi, tri] = tables("<s> the cat sat </s>\n<s> the dog sat </s>", Smoothing::None);
		let bow = BackoffScheme::Katz.weights(&uni, &bi, &tri).unwrap();

		// P(sat | cat) = (1/8) / (1/10) leaves 1 - den below zero
		let bigram_cond = conditional(&uni, &bi).unwrap();
		assert!(close(bigram_cond.linear(&NGram::new(["cat", "sat"])).unwrap(), 1.25));
		assert_eq!(bow.linear(&NGram::new(["the", "cat"])), Some(1.0));
		assert_eq!(bow.linear(&NGram::new(["the", "dog"])), Some(1.0));
	}

	#[test]
	fn katz_second_level_uses_bigram_conditionals() {
		let [uni, bi, tri] = tables("a b c a b d e f g h", Smoothing::Laplace { epsilon: 1.0 });
		let bow = BackoffScheme::Katz.weights(&uni, &bi, &tri).unwrap();

		let p = |t: &ProbabilityTable, g: &[&str]| t.linear(&NGram::new(g.iter().copied())).unwrap();
		let num = (p(&tri, &["a", "b", "c"]) + p(&tri, &["a", "b", "d"])) / p(&bi, &["a", "b"]);
		let den = (p(&bi, &["b", "c"]) + p(&bi, &["b", "d"])) / p(&uni, &["b"]);
		assert!(num < 1.0 && den < 1.0);
		assert!(close(bow.linear(&NGram::new(["a", "b"])).unwrap(), (1.0 - num) / (1.0 - den)));
	}

	#[test]
	fn legacy_katz_keeps_precedence_reading() {
		let [uni, bi, tri] = tables("x a b\ny a c\nx a c", Smoothing::Laplace { epsilon: 1.0 });
		let bow = BackoffScheme::KatzLegacy.weights(&uni, &bi, &tri).unwrap();

		let p = |t: &ProbabilityTable, g: &[&str]| t.linear(&NGram::new(g.iter().copied())).unwrap();
		let pa = p(&uni, &["a"]);
		let num = p(&bi, &["a", "b"]) + p(&bi, &["a", "c"]);
		let alpha = 1.0 - num - 2.0 * pa;
		assert!(alpha > 0.0);
		assert!(close(bow.linear(&NGram::new(["a"])).unwrap(), alpha * pa));
		// no continuation: alpha = 1
		assert!(close(bow.linear(&NGram::new(["c"])).unwrap(), p(&uni, &["c"])));
	}

	#[test]
	fn parses_scheme_names() {
		assert_eq!("katz-legacy".parse::<BackoffKind>(), Ok(BackoffKind::KatzLegacy));
		assert!("kneser".parse::<BackoffKind>().is_err());
		assert_eq!(BackoffScheme::Brants { alpha: 0.4 }.kind().to_string(), "brants");
	}
}
