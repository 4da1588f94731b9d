use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::frequency::FrequencyTable;
use super::probability::{ProbabilityTable, Space};
use crate::error::ConfigError;

/// Additive constant used by `laplace` when none is configured.
pub const DEFAULT_EPSILON: f64 = 1.0;

/// Smoothing selector as it appears on the command line and in config files.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingKind {
	#[default]
	None,
	Laplace,
	Lidstone,
	Turing,
}

impl FromStr for SmoothingKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"none" => Ok(Self::None),
			"laplace" => Ok(Self::Laplace),
			"lidstone" => Ok(Self::Lidstone),
			"turing" | "good-turing" => Ok(Self::Turing),
			_ => Err(ConfigError::UnknownSmoothing(s.to_owned())),
		}
	}
}

impl fmt::Display for SmoothingKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::None => "none",
			Self::Laplace => "laplace",
			Self::Lidstone => "lidstone",
			Self::Turing => "turing",
		})
	}
}

/// Frequency estimation policy.
///
/// All variants turn a `FrequencyTable` into a linear `ProbabilityTable` with
/// one entry per observed n-gram; only the formula differs. With N the number
/// of instances of the table's order:
///
/// - `None`: `count / N`
/// - `Laplace`: `(count + epsilon) / (N + N^order)`
/// - `Lidstone`: `(count + lambda) / (N + N^order * lambda)`
/// - `GoodTuring`: `r* / N` with `r* = (r + 1) * n_(r+1) / n_r`
///
/// `N^order` stands in for the size of the unseen-event space at that order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Smoothing {
	None,
	Laplace { epsilon: f64 },
	Lidstone { lambda: f64 },
	GoodTuring,
}

impl Smoothing {
	pub fn kind(&self) -> SmoothingKind {
		match self {
			Smoothing::None => SmoothingKind::None,
			Smoothing::Laplace { .. } => SmoothingKind::Laplace,
			Smoothing::Lidstone { .. } => SmoothingKind::Lidstone,
			Smoothing::GoodTuring => SmoothingKind::Turing,
		}
	}

	/// Estimates probabilities for every n-gram of `table`.
	pub fn estimate(&self, table: &FrequencyTable) -> ProbabilityTable {
		let n = table.total() as f64;
		let values = match *self {
			Smoothing::None => table.iter().map(|(g, c)| (g.clone(), c as f64 / n)).collect(),
			Smoothing::Laplace { epsilon } => {
				let denominator = n + n.powi(table.order() as i32);
				table.iter().map(|(g, c)| (g.clone(), (c as f64 + epsilon) / denominator)).collect()
			}
			Smoothing::Lidstone { lambda } => {
				let denominator = n + n.powi(table.order() as i32) * lambda;
				table.iter().map(|(g, c)| (g.clone(), (c as f64 + lambda) / denominator)).collect()
			}
			Smoothing::GoodTuring => good_turing(table),
		};
		ProbabilityTable::new(table.order(), Space::Linear, values)
	}
}

/// Good-Turing re-estimation.
///
/// A frequency class r with no class r+1 keeps r* = r. Those fallbacks can
/// push the total above 1; in that case the seen mass is rescaled to
/// `1 - n_1 / N`, leaving the Good-Turing unseen mass free.
fn good_turing(table: &FrequencyTable) -> BTreeMap<super::ngram::NGram, f64> {
	let n = table.total() as f64;
	let n_r = table.count_of_counts();

	let mut r_star = BTreeMap::new();
	for (&r, &count) in &n_r {
		let adjusted = match n_r.get(&(r + 1)) {
			Some(&next) => (r + 1) as f64 * next as f64 / count as f64,
			None => {
				log::warn!(
					"{}-grams: no n-grams with frequency {}, using {} for frequency class {}",
					table.order(),
					r + 1,
					r,
					r
				);
				r as f64
			}
		};
		r_star.insert(r, adjusted);
	}

	let mass: f64 = n_r.iter().map(|(r, count)| r_star[r] * *count as f64).sum::<f64>() / n;
	let scale = if mass > 1.0 {
		let singletons = n_r.get(&1).copied().unwrap_or(0) as f64;
		let target = 1.0 - singletons / n;
		let target = if target > 0.0 { target } else { 1.0 };
		log::warn!(
			"{}-grams: Good-Turing mass {:.4} exceeds 1, rescaling seen mass to {:.4}",
			table.order(),
			mass,
			target
		);
		target / mass
	} else {
		1.0
	};

	table
		.iter()
		.map(|(g, r)| (g.clone(), r_star[&r] * scale / n))
		.collect()
}
