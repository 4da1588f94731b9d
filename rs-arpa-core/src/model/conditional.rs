use std::collections::BTreeMap;

use super::probability::{ProbabilityTable, Space};
use crate::error::{LmError, Result};

/// Derives P(last token | prefix) for every n-gram of `higher`.
///
/// `lower` must hold the n-grams one order below, in the same space. The
/// conditional is `P(ngram) / P(prefix)` in linear space and
/// `log P(ngram) - log P(prefix)` in log space.
///
/// # Errors
/// - `OrderMismatch` if the orders are not consecutive
/// - `SpaceMismatch` if the tables use different spaces
/// - `MissingPrefix` if some prefix has no entry in `lower`; extraction
///   windows overlap within one sentence set, so this means the tables were
///   built from inconsistent data
pub fn conditional(lower: &ProbabilityTable, higher: &ProbabilityTable) -> Result<ProbabilityTable> {
	if lower.order() + 1 != higher.order() {
		return Err(LmError::OrderMismatch { lower: lower.order(), higher: higher.order() });
	}
	if lower.space() != higher.space() {
		return Err(LmError::SpaceMismatch);
	}

	let space = higher.space();
	let mut values = BTreeMap::new();
	for (ngram, p) in higher.iter() {
		let prefix_p = lower
			.get(&ngram.prefix())
			.ok_or_else(|| LmError::MissingPrefix { ngram: ngram.to_string() })?;
		let value = match space {
			Space::Linear => p / prefix_p,
			Space::Log => p - prefix_p,
		};
		values.insert(ngram.clone(), value);
	}

	Ok(ProbabilityTable::new(higher.order(), space, values))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::ngram::NGram;

	fn table(order: usize, entries: &[(&[&str], f64)]) -> ProbabilityTable {
		let values = entries.iter().map(|(t, p)| (NGram::new(t.iter().copied()), *p)).collect();
		ProbabilityTable::new(order, Space::Linear, values)
	}

	#[test]
	fn divides_by_prefix() {
		let uni = table(1, &[(&["a"], 0.5), (&["b"], 0.5)]);
		let bi = table(2, &[(&["a", "b"], 0.25), (&["b", "a"], 0.1)]);
		let cond = conditional(&uni, &bi).unwrap();
		assert!((cond.get(&NGram::new(["a", "b"])).unwrap() - 0.5).abs() < 1e-12);
		assert!((cond.get(&NGram::new(["b", "a"])).unwrap() - 0.2).abs() < 1e-12);
	}

	#[test]
	fn log_space_subtracts() {
		let uni = table(1, &[(&["a"], 0.5)]).into_space(Space::Log);
		let bi = table(2, &[(&["a", "a"], 0.25)]).into_space(Space::Log);
		let cond = conditional(&uni, &bi).unwrap();
		assert_eq!(cond.space(), Space::Log);
		assert!((cond.linear(&NGram::new(["a", "a"])).unwrap() - 0.5).abs() < 1e-12);
	}

	#[test]
	fn missing_prefix_is_fatal() {
		let uni = table(1, &[(&["a"], 1.0)]);
		let bi = table(2, &[(&["z", "a"], 0.5)]);
		match conditional(&uni, &bi) {
			Err(LmError::MissingPrefix { ngram }) => assert_eq!(ngram, "z a"),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn rejects_mixed_tables() {
		let uni = table(1, &[(&["a"], 1.0)]);
		let bi = table(2, &[(&["a", "a"], 0.5)]);
		assert!(matches!(conditional(&bi, &uni), Err(LmError::OrderMismatch { .. })));
		let log_bi = bi.clone().into_space(Space::Log);
		assert!(matches!(conditional(&uni, &log_bi), Err(LmError::SpaceMismatch)));
	}
}
