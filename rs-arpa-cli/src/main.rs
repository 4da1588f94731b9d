use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use rs_arpa_core::arpa::{self, EntryOrder};
use rs_arpa_core::model::backoff::BackoffKind;
use rs_arpa_core::model::cutoff::CutoffAction;
use rs_arpa_core::model::smoothing::SmoothingKind;
use rs_arpa_core::timing::StageTimer;
use rs_arpa_core::{BuildConfig, Corpus, LanguageModel};

/// Build a trigram language model from a cleaned corpus and write it in
/// ARPA format.
///
/// The corpus must hold one sentence per line, lowercase, without
/// punctuation, padded with <s> and </s>.
#[derive(Parser, Debug)]
#[command(name = "rs-arpa")]
#[command(version)]
struct Args {
	/// The input text file
	#[arg(short, long)]
	infile: PathBuf,

	/// JSON file with build settings; flags below take precedence
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Flavor of smoothing: none, laplace, lidstone or turing
	#[arg(short, long, value_parser = SmoothingKind::from_str)]
	smoothing: Option<SmoothingKind>,

	/// Lidstone's lambda
	#[arg(short = 'w', long)]
	lambda: Option<f64>,

	/// Additive constant for laplace smoothing
	#[arg(long)]
	epsilon: Option<f64>,

	/// Frequency count cutoff
	#[arg(short = 'k', long)]
	cutoff: Option<u64>,

	/// Delete rare words instead of replacing them with <UNK>
	#[arg(long)]
	delete_rare: bool,

	/// Add back-off weights
	#[arg(short, long)]
	backoff: bool,

	/// Back-off scheme: brants, katz or katz-legacy
	#[arg(long, value_parser = BackoffKind::from_str)]
	scheme: Option<BackoffKind>,

	/// Discount factor for brants back-off
	#[arg(long)]
	alpha: Option<f64>,

	/// Sentences with fewer tokens are not used for n-gram extraction
	#[arg(long)]
	min_sentence_len: Option<usize>,

	/// Compute probabilities in log space
	#[arg(long)]
	log_space: bool,

	/// Entry order inside each block: descending or lexical
	#[arg(long, value_parser = EntryOrder::from_str)]
	order: Option<EntryOrder>,

	/// Directory receiving the model file
	#[arg(short, long, default_value = ".")]
	output_dir: PathBuf,

	/// Verbose output
	#[arg(short, long)]
	verbose: bool,
}

impl Args {
	/// Merges the optional config file with the command-line flags.
	fn build_config(&self) -> Result<BuildConfig> {
		let mut config = match &self.config {
			Some(path) => load_config(path)?,
			None => BuildConfig::default(),
		};

		if let Some(smoothing) = self.smoothing {
			config.smoothing = smoothing;
		}
		if self.lambda.is_some() {
			config.lambda = self.lambda;
		}
		if let Some(epsilon) = self.epsilon {
			config.epsilon = epsilon;
		}
		if let Some(cutoff) = self.cutoff {
			config.cutoff = cutoff;
		}
		if self.delete_rare {
			config.cutoff_action = CutoffAction::Delete;
		}
		if self.backoff {
			config.backoff = true;
		}
		if let Some(scheme) = self.scheme {
			config.backoff_scheme = scheme;
		}
		if let Some(alpha) = self.alpha {
			config.alpha = alpha;
		}
		if let Some(len) = self.min_sentence_len {
			config.min_sentence_len = len;
		}
		if self.log_space {
			config.log_space = true;
		}
		if let Some(order) = self.order {
			config.entry_order = order;
		}

		config.validate().context("invalid configuration")?;
		Ok(config)
	}
}

fn load_config(path: &Path) -> Result<BuildConfig> {
	let text = fs::read_to_string(path).with_context(|| format!("cannot read config {}", path.display()))?;
	serde_json::from_str(&text).with_context(|| format!("cannot parse config {}", path.display()))
}

fn main() -> Result<()> {
	let args = Args::parse();
	let level = if args.verbose { "debug" } else { "info" };
	env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

	// Configuration errors stop the run before the corpus is touched
	let config = args.build_config()?;

	let timer = StageTimer::start();
	timer.stage("running");
	log::debug!("{config:?}");

	let corpus = Corpus::load(&args.infile)
		.with_context(|| format!("cannot read corpus {}", args.infile.display()))?;
	timer.stage(&format!(
		"{} tokens read in {} sentences",
		corpus.token_count(),
		corpus.sentences().len()
	));

	let model = LanguageModel::build_timed(&corpus, &config, &timer)?;
	let path = arpa::save(&model, &config, &args.output_dir)
		.with_context(|| format!("cannot write model to {}", args.output_dir.display()))?;
	timer.stage(&format!("successfully printed model to {}", path.display()));

	Ok(())
}
