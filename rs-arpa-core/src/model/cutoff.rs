use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::corpus::{Corpus, SENTENCE_END, SENTENCE_START, UNKNOWN};
use crate::error::ConfigError;

/// What happens to every occurrence of a rare token.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CutoffAction {
	/// Substitute the unknown marker.
	#[default]
	Replace,
	/// Drop the occurrence.
	Delete,
}

impl FromStr for CutoffAction {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"replace" => Ok(Self::Replace),
			"delete" => Ok(Self::Delete),
			_ => Err(ConfigError::UnknownCutoffAction(s.to_owned())),
		}
	}
}

impl fmt::Display for CutoffAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Replace => "replace",
			Self::Delete => "delete",
		})
	}
}

/// Summary of one cutoff pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CutoffReport {
	/// Number of distinct tokens classified as rare.
	pub rare_types: usize,
	/// Number of token occurrences replaced or deleted.
	pub affected_tokens: usize,
}

/// Tokens never classified as rare: the sentence boundaries and the
/// unknown marker itself.
fn is_reserved(token: &str) -> bool {
	token == SENTENCE_START || token == SENTENCE_END || token == UNKNOWN
}

/// Counts every token across the whole corpus, short sentences included.
pub fn count_tokens<'a, I: IntoIterator<Item = &'a str>>(tokens: I) -> HashMap<&'a str, u64> {
	let mut counts = HashMap::new();
	for token in tokens {
		*counts.entry(token).or_insert(0) += 1;
	}
	counts
}

/// Every distinct, non-reserved token seen at most `k` times.
pub fn rare_tokens(counts: &HashMap<&str, u64>, k: u64) -> BTreeSet<String> {
	counts
		.iter()
		.filter(|(token, count)| **count <= k && !is_reserved(token))
		.map(|(token, _)| (*token).to_owned())
		.collect()
}

fn filter_tokens<'a, I>(tokens: I, rare: &BTreeSet<String>, action: CutoffAction, affected: &mut usize) -> Vec<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut out = Vec::new();
	for token in tokens {
		if !rare.contains(token) {
			out.push(token.to_owned());
			continue;
		}
		*affected += 1;
		if action == CutoffAction::Replace {
			out.push(UNKNOWN.to_owned());
		}
	}
	out
}

/// Applies the frequency cutoff to a corpus.
///
/// Matching is on whole tokens, so `cat` being rare never touches `cats`.
/// Sentences emptied by `Delete` disappear from the result.
pub fn apply_cutoff(corpus: &Corpus, k: u64, action: CutoffAction) -> (Corpus, CutoffReport) {
	let counts = count_tokens(corpus.tokens());
	let rare = rare_tokens(&counts, k);
	log::debug!("{} rare token types at cutoff {}", rare.len(), k);

	let mut affected = 0;
	let sentences = corpus
		.sentences()
		.iter()
		.map(|sentence| filter_tokens(sentence.iter().map(String::as_str), &rare, action, &mut affected))
		.collect();

	let report = CutoffReport { rare_types: rare.len(), affected_tokens: affected };
	(Corpus::from_sentences(sentences), report)
}

/// The same transform on flattened text.
///
/// Line structure is kept; runs of whitespace inside a line collapse to a
/// single space, which is also what separates an inserted unknown marker from
/// its neighbours.
pub fn apply_to_text(text: &str, rare: &BTreeSet<String>, action: CutoffAction) -> String {
	let mut affected = 0;
	text.lines()
		.map(|line| filter_tokens(line.split_whitespace(), rare, action, &mut affected).join(" "))
		.collect::<Vec<_>>()
		.join("\n")
}
