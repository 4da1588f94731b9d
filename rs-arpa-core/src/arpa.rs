use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::BuildConfig;
use crate::error::{ConfigError, Result};
use crate::io::{build_output_path, write_file};
use crate::model::language_model::LanguageModel;
use crate::model::ngram::{MAX_ORDER, NGram};
use crate::model::probability::Space;

/// Written in place of `ln(0)` (and of any weight with no logarithm).
pub const LOG_ZERO: f64 = -99.0;

/// Ordering of the entries inside one n-gram block.
///
/// `Descending` is the historical layout: highest back-off weight first when
/// weights are written, otherwise highest probability first, ties broken by
/// the n-gram itself. `Lexical` lists n-grams in token order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrder {
	#[default]
	Descending,
	Lexical,
}

impl FromStr for EntryOrder {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"descending" => Ok(Self::Descending),
			"lexical" => Ok(Self::Lexical),
			_ => Err(ConfigError::UnknownEntryOrder(s.to_owned())),
		}
	}
}

impl fmt::Display for EntryOrder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Descending => "descending",
			Self::Lexical => "lexical",
		})
	}
}

/// Natural log of a stored value, whatever space it was computed in.
fn natural_log(space: Space, value: f64) -> f64 {
	let ln = match space {
		Space::Linear => value.ln(),
		Space::Log => value,
	};
	if ln.is_finite() { ln } else { LOG_ZERO }
}

struct Entry<'a> {
	ngram: &'a NGram,
	log_prob: f64,
	log_bow: Option<f64>,
}

fn block<'a>(model: &'a LanguageModel, order: usize, entry_order: EntryOrder) -> Vec<Entry<'a>> {
	let Some(table) = model.arpa_entries(order) else {
		return Vec::new();
	};
	let backoff = model.backoff().filter(|_| order < MAX_ORDER);

	let mut entries: Vec<Entry> = table
		.iter()
		.map(|(ngram, value)| Entry {
			ngram,
			log_prob: natural_log(table.space(), value),
			log_bow: backoff.map(|b| b.get(ngram).map_or(0.0, |w| natural_log(b.space(), w))),
		})
		.collect();

	if entry_order == EntryOrder::Descending {
		entries.sort_by(|a, b| {
			let key = |e: &Entry| e.log_bow.unwrap_or(e.log_prob);
			key(b).total_cmp(&key(a)).then_with(|| a.ngram.cmp(b.ngram))
		});
	}
	entries
}

/// Renders the model in ARPA layout.
///
/// - Header with the number of distinct n-grams per order
/// - One block per order: `<ln p> <tokens> [<ln bow>]`, the back-off weight
///   only for orders below the maximum and only when the model has weights
/// - Values are natural logarithms; `ln(0)` is written as `LOG_ZERO`
pub fn to_arpa_string(model: &LanguageModel, entry_order: EntryOrder) -> String {
	let mut out = String::from("\n\\data\\\n");
	for order in 1..=MAX_ORDER {
		let count = model.arpa_entries(order).map_or(0, |t| t.len());
		out.push_str(&format!("ngram {order}={count}\n"));
	}

	for order in 1..=MAX_ORDER {
		out.push_str(&format!("\n\\{order}-grams:\n"));
		for entry in block(model, order, entry_order) {
			out.push_str(&format!("{} {}", entry.log_prob, entry.ngram));
			if let Some(bow) = entry.log_bow {
				out.push_str(&format!(" {bow}"));
			}
			out.push('\n');
		}
	}

	out.push_str("\n\\end\\\n");
	out
}

/// Writes the model into `folder` under the name derived from `config`.
///
/// The whole file is rendered in memory first; nothing is written if the
/// destination is unusable.
pub fn save<P: AsRef<Path>>(model: &LanguageModel, config: &BuildConfig, folder: P) -> Result<PathBuf> {
	let path = build_output_path(folder, &config.output_filename())?;
	write_file(&path, &to_arpa_string(model, config.entry_order))?;
	Ok(path)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::corpus::Corpus;

	fn model(config: &BuildConfig) -> LanguageModel {
		let corpus = Corpus::from_text("<s> a b a </s>\n<s> a b b </s>");
		LanguageModel::build(&corpus, config).unwrap()
	}

	fn lines_of(text: &str, header: &str) -> Vec<String> {
		text.split(header)
			.nth(1)
			.unwrap()
			.lines()
			.skip(1)
			.take_while(|l| !l.is_empty())
			.map(str::to_owned)
			.collect()
	}

	#[test]
	fn layout_without_backoff() {
		let config = BuildConfig { cutoff: 0, ..Default::default() };
		let text = to_arpa_string(&model(&config), EntryOrder::Descending);
		assert!(text.starts_with("\n\\data\\\nngram 1=4\nngram 2=6\nngram 3=5\n"));
		assert!(text.ends_with("\\end\\\n"));

		let unigrams = lines_of(&text, "\\1-grams:");
		assert_eq!(unigrams.len(), 4);
		// a, b: 3/10, </s>, <s>: 2/10, ties in token order
		assert_eq!(unigrams[0], format!("{} a", 0.3f64.ln()));
		assert_eq!(unigrams[1], format!("{} b", 0.3f64.ln()));
		assert_eq!(unigrams[2], format!("{} </s>", 0.2f64.ln()));
		assert_eq!(unigrams[3], format!("{} <s>", 0.2f64.ln()));
		assert!(unigrams.iter().all(|l| l.split(' ').count() == 2));

		let trigrams = lines_of(&text, "\\3-grams:");
		assert!(trigrams.iter().all(|l| l.split(' ').count() == 4));
	}

	#[test]
	fn backoff_column_for_lower_orders_only() {
		let config = BuildConfig { cutoff: 0, backoff: true, ..Default::default() };
		let text = to_arpa_string(&model(&config), EntryOrder::Descending);
		let unigrams = lines_of(&text, "\\1-grams:");
		assert_eq!(unigrams[0], format!("{} a {}", 0.3f64.ln(), (0.4f64 * 0.3).ln()));
		assert!(lines_of(&text, "\\2-grams:").iter().all(|l| l.split(' ').count() == 4));
		assert!(lines_of(&text, "\\3-grams:").iter().all(|l| l.split(' ').count() == 4));
	}

	#[test]
	fn log_space_renders_identically() {
		let linear = BuildConfig { cutoff: 0, backoff: true, ..Default::default() };
		let log = BuildConfig { log_space: true, ..linear.clone() };
		let a = to_arpa_string(&model(&linear), EntryOrder::Lexical);
		let b = to_arpa_string(&model(&log), EntryOrder::Lexical);
		let values = |t: &str| -> Vec<f64> {
			t.split_whitespace().filter_map(|w| w.parse::<f64>().ok()).collect()
		};
		let (va, vb) = (values(&a), values(&b));
		assert_eq!(va.len(), vb.len());
		assert!(va.iter().zip(&vb).all(|(x, y)| (x - y).abs() < 1e-9));
	}

	#[test]
	fn lexical_order_follows_tokens() {
		let config = BuildConfig { cutoff: 0, ..Default::default() };
		let text = to_arpa_string(&model(&config), EntryOrder::Lexical);
		let tokens: Vec<String> = lines_of(&text, "\\1-grams:")
			.iter()
			.map(|l| l.split(' ').nth(1).unwrap().to_owned())
			.collect();
		assert_eq!(tokens, vec!["</s>", "<s>", "a", "b"]);
	}

	#[test]
	fn zero_is_written_as_log_zero() {
		assert_eq!(natural_log(Space::Linear, 0.0), LOG_ZERO);
		assert_eq!(natural_log(Space::Log, f64::NEG_INFINITY), LOG_ZERO);
		assert_eq!(LOG_ZERO.to_string(), "-99");
	}

	#[test]
	fn save_uses_configured_name() {
		let dir = tempfile::tempdir().unwrap();
		let config = BuildConfig { cutoff: 0, backoff: true, ..Default::default() };
		let path = save(&model(&config), &config, dir.path()).unwrap();
		assert_eq!(path, dir.path().join("lm_smoothing-none_backoff-yes_cutoff-0.txt"));
		assert!(std::fs::read_to_string(path).unwrap().contains("\\2-grams:"));
	}
}
