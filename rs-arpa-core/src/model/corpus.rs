use std::path::Path;

use crate::error::Result;
use crate::io::read_file;

/// Sentence start marker written by the cleaning stage.
pub const SENTENCE_START: &str = "<s>";

/// Sentence end marker written by the cleaning stage.
pub const SENTENCE_END: &str = "</s>";

/// Replacement for words under the frequency cutoff.
pub const UNKNOWN: &str = "<UNK>";

/// A cleaned corpus: one sentence per line, tokens separated by whitespace.
///
/// The corpus is expected to be lowercase, punctuation-free and padded with
/// `<s>`/`</s>` already. Blank lines carry no sentence and are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corpus {
	sentences: Vec<Vec<String>>,
}

impl Corpus {
	/// Loads a corpus from a UTF-8 text file.
	pub fn load<P: AsRef<Path>>(filename: P) -> Result<Self> {
		let lines = read_file(filename)?;
		Ok(Self::from_lines(lines.iter().map(String::as_str)))
	}

	pub fn from_text(text: &str) -> Self {
		Self::from_lines(text.lines())
	}

	pub fn from_lines<'a, I: IntoIterator<Item = &'a str>>(lines: I) -> Self {
		let sentences = lines
			.into_iter()
			.map(|line| line.split_whitespace().map(str::to_owned).collect::<Vec<_>>())
			.filter(|tokens| !tokens.is_empty())
			.collect();
		Self { sentences }
	}

	pub fn from_sentences(sentences: Vec<Vec<String>>) -> Self {
		Self { sentences: sentences.into_iter().filter(|s| !s.is_empty()).collect() }
	}

	pub fn sentences(&self) -> &[Vec<String>] {
		&self.sentences
	}

	/// All tokens of all sentences, in order.
	pub fn tokens(&self) -> impl Iterator<Item = &str> {
		self.sentences.iter().flatten().map(String::as_str)
	}

	pub fn token_count(&self) -> usize {
		self.sentences.iter().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.sentences.is_empty()
	}

	/// Renders the corpus back to flat text, one sentence per line.
	pub fn to_text(&self) -> String {
		let mut out = String::new();
		for sentence in &self.sentences {
			out.push_str(&sentence.join(" "));
			out.push('\n');
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_lines_and_skips_blanks() {
		let corpus = Corpus::from_text("<s> a  b </s>\n\n   \n<s> ж </s>\n");
		assert_eq!(corpus.sentences().len(), 2);
		assert_eq!(corpus.sentences()[0], vec!["<s>", "a", "b", "</s>"]);
		assert_eq!(corpus.sentences()[1][1], "ж");
		assert_eq!(corpus.token_count(), 7);
	}

	#[test]
	fn text_round_trip_normalises_whitespace() {
		let corpus = Corpus::from_text("<s>  x\ty </s>");
		assert_eq!(corpus.to_text(), "<s> x y </s>\n");
	}
}
