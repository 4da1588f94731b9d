use std::collections::BTreeMap;

use super::ngram::NGram;

/// Occurrence counts for the n-grams of one order.
///
/// # Invariants
/// - every key has exactly `order` tokens
/// - every count is >= 1
/// - `total` is the sum of all counts (the number of extracted instances)
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyTable {
	order: usize,
	counts: BTreeMap<NGram, u64>,
	total: u64,
}

impl FrequencyTable {
	/// Counts a flat sequence of n-grams of the given order.
	pub fn from_ngrams<I: IntoIterator<Item = NGram>>(order: usize, ngrams: I) -> Self {
		let mut counts = BTreeMap::new();
		let mut total = 0;
		for ngram in ngrams {
			debug_assert_eq!(ngram.order(), order);
			*counts.entry(ngram).or_insert(0) += 1;
			total += 1;
		}
		Self { order, counts, total }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Total number of instances (N).
	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn get(&self, ngram: &NGram) -> Option<u64> {
		self.counts.get(ngram).copied()
	}

	/// Number of distinct n-grams.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&NGram, u64)> {
		self.counts.iter().map(|(ngram, count)| (ngram, *count))
	}

	/// Frequency of frequencies: r -> n_r, the number of distinct n-grams
	/// seen exactly r times.
	pub fn count_of_counts(&self) -> BTreeMap<u64, u64> {
		let mut n_r = BTreeMap::new();
		for count in self.counts.values() {
			*n_r.entry(*count).or_insert(0) += 1;
		}
		n_r
	}
}
