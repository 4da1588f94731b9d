use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ngram::NGram;

/// Numeric convention of a probability table.
///
/// One run uses one space throughout: conditionals divide in linear space and
/// subtract in log space.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Space {
	#[default]
	Linear,
	/// Natural logarithms.
	Log,
}

impl Space {
	/// Converts a linear probability into this space.
	pub fn from_linear(self, p: f64) -> f64 {
		match self {
			Space::Linear => p,
			Space::Log => p.ln(),
		}
	}

	/// Converts a value of this space back to a linear probability.
	pub fn to_linear(self, value: f64) -> f64 {
		match self {
			Space::Linear => value,
			Space::Log => value.exp(),
		}
	}
}

/// Probabilities (or log-probabilities) for the n-grams of one order.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityTable {
	order: usize,
	space: Space,
	values: BTreeMap<NGram, f64>,
}

impl ProbabilityTable {
	pub(crate) fn new(order: usize, space: Space, values: BTreeMap<NGram, f64>) -> Self {
		Self { order, space, values }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn space(&self) -> Space {
		self.space
	}

	/// Raw stored value, in this table's space.
	pub fn get(&self, ngram: &NGram) -> Option<f64> {
		self.values.get(ngram).copied()
	}

	/// Stored value converted to a linear probability.
	pub fn linear(&self, ngram: &NGram) -> Option<f64> {
		self.get(ngram).map(|v| self.space.to_linear(v))
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&NGram, f64)> {
		self.values.iter().map(|(ngram, value)| (ngram, *value))
	}

	/// Every entry whose first `prefix.order()` tokens equal `prefix`.
	///
	/// Keys are ordered lexicographically, so continuations of one history are
	/// contiguous and found with a range scan.
	pub fn continuations<'a>(&'a self, prefix: &'a NGram) -> impl Iterator<Item = (&'a NGram, f64)> + 'a {
		self.values
			.range(prefix.clone()..)
			.take_while(move |(ngram, _)| ngram.tokens().starts_with(prefix.tokens()))
			.map(|(ngram, value)| (ngram, *value))
	}

	/// Re-expresses the table in another space.
	pub fn into_space(self, space: Space) -> Self {
		if space == self.space {
			return self;
		}
		let from = self.space;
		let values = self
			.values
			.into_iter()
			.map(|(ngram, value)| (ngram, space.from_linear(from.to_linear(value))))
			.collect();
		Self { order: self.order, space, values }
	}

	/// Sum of the linear probabilities of every entry.
	pub fn total_mass(&self) -> f64 {
		self.values.values().map(|v| self.space.to_linear(*v)).sum()
	}
}
