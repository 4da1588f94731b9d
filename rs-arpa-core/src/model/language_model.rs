use super::backoff::BackoffTable;
use super::conditional::conditional;
use super::corpus::Corpus;
use super::cutoff::{CutoffReport, apply_cutoff};
use super::frequency::FrequencyTable;
use super::ngram::{MAX_ORDER, NGram, extract_sentences};
use super::probability::ProbabilityTable;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::timing::StageTimer;

/// A trigram language model built from one corpus under one configuration.
///
/// This struct holds, per order:
/// - `frequencies`: raw counts over the sentence-length-filtered corpus
/// - `probabilities`: smoothed joint probabilities, in the configured space
///
/// plus the bigram and trigram conditionals and, when back-off is enabled,
/// the weights for every unigram and bigram.
///
/// # Invariants
/// - every table was built once from the same filtered corpus
/// - every bigram/trigram has its prefix in the order below
/// - nothing is mutated after `build` returns
#[derive(Clone, Debug)]
pub struct LanguageModel {
	frequencies: [FrequencyTable; MAX_ORDER],
	probabilities: [ProbabilityTable; MAX_ORDER],
	bigram_conditionals: ProbabilityTable,
	trigram_conditionals: ProbabilityTable,
	backoff: Option<BackoffTable>,
	cutoff_report: CutoffReport,
}

impl LanguageModel {
	/// Builds the model, logging each stage boundary.
	///
	/// # Behavior
	/// - Validates `config` before touching the corpus.
	/// - Applies the frequency cutoff over every sentence.
	/// - Extracts 1-, 2- and 3-grams from sentences of at least
	///   `config.min_sentence_len` tokens.
	/// - Counts, smooths, derives conditionals and, if `config.backoff` is set,
	///   back-off weights.
	///
	/// # Errors
	/// - `Config` for an invalid configuration
	/// - `MissingPrefix`/`MissingSuffix` if the tables disagree, which points
	///   at inconsistent extraction rather than at the corpus
	pub fn build(corpus: &Corpus, config: &BuildConfig) -> Result<Self> {
		Self::build_timed(corpus, config, &StageTimer::start())
	}

	/// Same as `build`, reporting against an existing timer.
	pub fn build_timed(corpus: &Corpus, config: &BuildConfig, timer: &StageTimer) -> Result<Self> {
		config.validate()?;
		let smoothing = config.smoothing()?;
		let space = config.space();

		let (filtered, cutoff_report) = apply_cutoff(corpus, config.cutoff, config.cutoff_action);
		timer.stage(&format!(
			"A total of {} words occurring {} time(s) or fewer identified",
			cutoff_report.rare_types, config.cutoff
		));
		timer.stage(&format!(
			"{} cutoff word occurrences handled ({})",
			cutoff_report.affected_tokens, config.cutoff_action
		));

		let [unigrams, bigrams, trigrams] =
			[1, 2, 3].map(|n| extract_sentences(filtered.sentences(), n, config.min_sentence_len));
		let frequencies = [(1, unigrams?), (2, bigrams?), (3, trigrams?)].map(|(n, ngrams)| {
			timer.stage(&format!("A total of {} {}-grams found", ngrams.len(), n));
			FrequencyTable::from_ngrams(n, ngrams)
		});

		let probabilities = frequencies.clone().map(|table| {
			let probs = smoothing.estimate(&table).into_space(space);
			timer.stage(&format!("{}-gram probability dictionary made ({})", table.order(), smoothing.kind()));
			probs
		});

		let bigram_conditionals = conditional(&probabilities[0], &probabilities[1])?;
		let trigram_conditionals = conditional(&probabilities[1], &probabilities[2])?;
		timer.stage("Conditional probabilities derived");

		let backoff = if config.backoff {
			let scheme = config.backoff_scheme()?;
			let table = scheme.weights(&probabilities[0], &probabilities[1], &probabilities[2])?;
			timer.stage(&format!("Back-off weights computed ({})", scheme.kind()));
			Some(table)
		} else {
			None
		};

		Ok(Self { frequencies, probabilities, bigram_conditionals, trigram_conditionals, backoff, cutoff_report })
	}

	/// Counts of the given order (1..=3).
	pub fn frequencies(&self, order: usize) -> Option<&FrequencyTable> {
		order.checked_sub(1).and_then(|i| self.frequencies.get(i))
	}

	/// Smoothed joint probabilities of the given order (1..=3).
	pub fn probabilities(&self, order: usize) -> Option<&ProbabilityTable> {
		order.checked_sub(1).and_then(|i| self.probabilities.get(i))
	}

	/// Conditional probabilities P(last | prefix) for order 2 or 3.
	pub fn conditionals(&self, order: usize) -> Option<&ProbabilityTable> {
		match order {
			2 => Some(&self.bigram_conditionals),
			3 => Some(&self.trigram_conditionals),
			_ => None,
		}
	}

	/// The values listed in the ARPA block of `order`: unigram probabilities,
	/// then bigram and trigram conditionals.
	pub fn arpa_entries(&self, order: usize) -> Option<&ProbabilityTable> {
		match order {
			1 => Some(&self.probabilities[0]),
			_ => self.conditionals(order),
		}
	}

	pub fn backoff(&self) -> Option<&BackoffTable> {
		self.backoff.as_ref()
	}

	/// Back-off weight of a unigram or bigram, if back-off is enabled.
	pub fn backoff_weight(&self, ngram: &NGram) -> Option<f64> {
		self.backoff.as_ref()?.get(ngram)
	}

	pub fn cutoff_report(&self) -> &CutoffReport {
		&self.cutoff_report
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::LmError;
	use crate::model::smoothing::SmoothingKind;

	const CORPUS: &str = "<s> the cat sat </s>\n<s> the dog sat </s>\n<s> hi </s>";

	#[test]
	fn builds_all_orders() {
		let config = BuildConfig { cutoff: 0, ..Default::default() };
		let model = LanguageModel::build(&Corpus::from_text(CORPUS), &config).unwrap();

		assert_eq!(model.frequencies(1).unwrap().total(), 10);
		assert_eq!(model.frequencies(2).unwrap().total(), 8);
		assert_eq!(model.frequencies(3).unwrap().total(), 6);
		assert!(model.frequencies(4).is_none());
		assert!(model.frequencies(0).is_none());
		// the short sentence only counts towards the cutoff
		assert!(model.probabilities(1).unwrap().get(&NGram::new(["hi"])).is_none());
		assert!(model.backoff().is_none());
		assert_eq!(model.conditionals(3).unwrap().len(), 6);
	}

	#[test]
	fn conditional_of_the_dog() {
		let config = BuildConfig { cutoff: 0, ..Default::default() };
		let model = LanguageModel::build(&Corpus::from_text(CORPUS), &config).unwrap();
		// (1/8) / (2/10)
		let p = model.arpa_entries(2).unwrap().get(&NGram::new(["the", "dog"])).unwrap();
		assert!((p - 0.625).abs() < 1e-12);
	}

	#[test]
	fn invalid_config_fails_before_work() {
		let config = BuildConfig { smoothing: SmoothingKind::Lidstone, ..Default::default() };
		assert!(matches!(
			LanguageModel::build(&Corpus::from_text(CORPUS), &config),
			Err(LmError::Config(_))
		));
	}

	#[test]
	fn backoff_is_built_on_request() {
		let config = BuildConfig { cutoff: 0, backoff: true, ..Default::default() };
		let model = LanguageModel::build(&Corpus::from_text(CORPUS), &config).unwrap();
		let weight = model.backoff_weight(&NGram::new(["the"])).unwrap();
		assert!((weight - 0.4 * 0.2).abs() < 1e-12);
		assert_eq!(model.backoff().unwrap().len(), 6 + 6);
	}
}
