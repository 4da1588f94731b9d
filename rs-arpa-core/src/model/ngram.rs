use std::fmt;

use crate::error::{LmError, Result};

/// Highest n-gram order the model supports.
pub const MAX_ORDER: usize = 3;

/// An ordered tuple of tokens.
///
/// Two n-grams are equal when their token sequences are equal, wherever they
/// were extracted from. Ordering is lexicographic over the tokens, which gives
/// tables keyed by `NGram` a stable iteration order and groups n-grams sharing
/// a prefix next to each other.
///
/// # Invariants
/// - `1 <= order() <= MAX_ORDER` for every n-gram produced by `extract`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NGram(Vec<String>);

impl NGram {
	/// Builds an n-gram from any sequence of tokens.
	pub fn new<I, S>(tokens: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(tokens.into_iter().map(Into::into).collect())
	}

	/// Number of tokens in the n-gram.
	pub fn order(&self) -> usize {
		self.0.len()
	}

	pub fn tokens(&self) -> &[String] {
		&self.0
	}

	/// The first `order - 1` tokens (the history).
	///
	/// The prefix of a unigram is the empty n-gram.
	pub fn prefix(&self) -> NGram {
		let end = self.0.len().saturating_sub(1);
		Self(self.0[..end].to_vec())
	}

	/// The last `order - 1` tokens.
	///
	/// For a trigram `(a, b, c)` this is the bigram `(b, c)`, the n-gram
	/// consulted when the history is shortened by one token.
	pub fn suffix(&self) -> NGram {
		let start = self.0.len().min(1);
		Self(self.0[start..].to_vec())
	}

	/// The predicted token, `None` for the empty n-gram.
	pub fn last(&self) -> Option<&str> {
		self.0.last().map(String::as_str)
	}
}

impl fmt::Display for NGram {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0.join(" "))
	}
}

fn check_order(n: usize) -> Result<()> {
	if n == 0 || n > MAX_ORDER {
		return Err(LmError::InvalidOrder { order: n, max: MAX_ORDER });
	}
	Ok(())
}

/// Slides a window of width `n` over one sentence.
///
/// - `n == 1` yields one unigram per token.
/// - `n > 1` yields every contiguous window, `len - n + 1` of them.
/// - A sentence shorter than `n` yields nothing.
///
/// # Errors
/// Returns `InvalidOrder` if `n` is not in `1..=MAX_ORDER`.
pub fn extract<S: AsRef<str>>(tokens: &[S], n: usize) -> Result<Vec<NGram>> {
	check_order(n)?;
	if tokens.len() < n {
		return Ok(Vec::new());
	}

	Ok(tokens
		.windows(n)
		.map(|window| NGram::new(window.iter().map(|t| t.as_ref())))
		.collect())
}

/// Extracts n-grams of order `n` from every sentence with at least
/// `min_sentence_len` tokens, concatenated in corpus order.
///
/// The sentence filter is the same for every order, so a sentence either
/// contributes to all tables or to none of them.
pub fn extract_sentences<S: AsRef<str>>(
	sentences: &[Vec<S>],
	n: usize,
	min_sentence_len: usize,
) -> Result<Vec<NGram>> {
	check_order(n)?;
	let mut ngrams = Vec::new();
	for sentence in sentences.iter().filter(|s| s.len() >= min_sentence_len) {
		ngrams.extend(extract(sentence, n)?);
	}
	Ok(ngrams)
}
