use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use rs_mark_core::{ChainBuilder, GenerateOptions, Generator, SamplerKind, load_chain};

/// Builds word-level Markov chain models and generates text from them.
#[derive(Debug, Parser)]
#[command(name = "rs-mark", version)]
struct Cli {
	/// Log at debug level (RUST_LOG overrides)
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Build a model from one or more corpora and write it to <outfile>
	#[command(alias = "READ")]
	Read {
		/// Number of words per prefix (>= 1)
		order: usize,

		/// Model file to create
		outfile: PathBuf,

		/// Corpora to learn from, in order
		#[arg(required = true)]
		infiles: Vec<PathBuf>,

		/// Ingest corpora on worker threads (same output as sequential)
		#[arg(long)]
		parallel: bool,
	},

	/// Load a model and print up to <word_count> generated words
	#[command(alias = "GENERATE")]
	Generate {
		/// Model file written by `read`
		modelfile: PathBuf,

		/// Maximum number of words to print (>= 1)
		word_count: usize,

		/// Seed for reproducible output
		#[arg(long)]
		seed: Option<u64>,

		/// Suffix sampler: pool or cumulative
		#[arg(long, default_value_t = SamplerKind::Pool)]
		sampler: SamplerKind,

		/// Reuse or refresh a binary snapshot next to the model
		#[arg(long)]
		cache: bool,
	},
}

fn read(order: usize, outfile: &Path, infiles: &[PathBuf], parallel: bool) -> Result<()> {
	let mut builder = ChainBuilder::new(order)?;

	if parallel {
		builder.ingest_files_parallel(infiles).context("Failed to read corpora")?;
	} else {
		for infile in infiles {
			info!("Reading {}", infile.display());
			builder
				.ingest_file(infile)
				.with_context(|| format!("Failed to read corpus {}", infile.display()))?;
		}
	}

	builder
		.write_file(outfile)
		.with_context(|| format!("Failed to write model {}", outfile.display()))?;
	Ok(())
}

fn generate(modelfile: &Path, options: &GenerateOptions, cache: bool) -> Result<String> {
	let chain = load_chain(modelfile, cache)
		.with_context(|| format!("Failed to load model {}", modelfile.display()))?;
	let mut generator = Generator::from_options(&chain, options);
	Ok(generator.generate_text(options.word_count())?)
}

fn run(cli: Cli) -> Result<()> {
	match cli.command {
		Command::Read { order, outfile, infiles, parallel } => read(order, &outfile, &infiles, parallel),
		Command::Generate { modelfile, word_count, seed, sampler, cache } => {
			let mut options = GenerateOptions::new(word_count)?;
			options.seed = seed;
			options.sampler = sampler;
			println!("{}", generate(&modelfile, &options, cache)?);
			Ok(())
		}
	}
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	let default_filter = if cli.verbose { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

	match run(cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("Error: {e:#}");
			ExitCode::FAILURE
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	#[test]
	fn parses_read_with_several_corpora() {
		let cli = Cli::try_parse_from(["rs-mark", "read", "2", "out.txt", "a.txt", "b.txt"]).unwrap();
		match cli.command {
			Command::Read { order, outfile, infiles, parallel } => {
				assert_eq!(order, 2);
				assert_eq!(outfile, PathBuf::from("out.txt"));
				assert_eq!(infiles, [PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
				assert!(!parallel);
			}
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn rejects_bad_arguments() {
		assert!(Cli::try_parse_from(["rs-mark", "read", "two", "out.txt", "a.txt"]).is_err());
		assert!(Cli::try_parse_from(["rs-mark", "read", "2", "out.txt"]).is_err());
		assert!(Cli::try_parse_from(["rs-mark", "generate", "model.txt", "-3"]).is_err());
		assert!(Cli::try_parse_from(["rs-mark", "generate", "model.txt", "5", "--sampler", "alias"]).is_err());
	}

	#[test]
	fn read_then_generate() {
		let dir = TempDir::new().unwrap();
		let corpus = dir.path().join("corpus.txt");
		let model = dir.path().join("model.txt");
		fs::write(&corpus, "I am not a number! I am a free man!").unwrap();

		read(2, &model, &[corpus], false).unwrap();
		assert!(fs::read_to_string(&model).unwrap().starts_with("2\n\"\" \"\" I 1\n"));

		let mut options = GenerateOptions::new(10_000).unwrap();
		options.seed = Some(1);
		let text = generate(&model, &options, false).unwrap();
		assert!(text.ends_with("free man!"));
	}

	#[test]
	fn zero_word_count_fails_cleanly() {
		let cli = Cli::try_parse_from(["rs-mark", "generate", "model.txt", "0"]).unwrap();
		assert!(run(cli).is_err());
	}

	#[test]
	fn missing_model_fails_cleanly() {
		let dir = TempDir::new().unwrap();
		let options = GenerateOptions::new(5).unwrap();
		let err = generate(&dir.path().join("absent.txt"), &options, false).unwrap_err();
		assert!(format!("{err:#}").contains("Failed to load model"));
	}
}
