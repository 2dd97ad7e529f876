use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use log::{debug, info};

use super::chain::Chain;
use super::prefix::Prefix;
use super::writer;
use crate::error::{ChainError, Result};
use crate::io::{Tokens, open_reader};

/// Builds a `Chain` from one or more token streams.
///
/// # Responsibilities
/// - Slide an order-sized window over each corpus and count suffixes
/// - Keep every corpus's raw tokens so the writer can replay them
/// - Accumulate counts across corpora into one table
///
/// # Notes
/// - Every corpus starts from a window of empty placeholders.
/// - Counts are cumulative across corpora; token records are kept per corpus.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
	chain: Chain,
	corpora: Vec<Vec<String>>,
}

impl ChainBuilder {
	/// Creates a builder for a chain of the given order.
	///
	/// # Errors
	/// Returns `ChainError::Config` if `order` is 0.
	pub fn new(order: usize) -> Result<Self> {
		Ok(Self { chain: Chain::new(order)?, corpora: Vec::new() })
	}

	pub fn order(&self) -> usize {
		self.chain.order()
	}

	pub fn chain(&self) -> &Chain {
		&self.chain
	}

	/// Raw tokens of every ingested corpus, in ingestion order.
	pub fn corpora(&self) -> &[Vec<String>] {
		&self.corpora
	}

	/// Consumes the builder, keeping only the table.
	pub fn into_chain(self) -> Chain {
		self.chain
	}

	/// Ingests one corpus, consuming tokens one at a time.
	///
	/// Returns the number of tokens read. An empty stream still counts as a
	/// corpus but adds nothing to the table.
	///
	/// # Errors
	/// Returns `ChainError::CountOverflow` if a prefix's counts overflow. The
	/// corpus is then not recorded, but the counts added before the failing
	/// token stay in the table.
	pub fn ingest<I>(&mut self, tokens: I) -> Result<usize>
	where
		I: IntoIterator<Item = String>,
	{
		let mut window = Prefix::new(self.chain.order());
		let mut record = Vec::new();

		for token in tokens {
			self.chain.add(&window, &token, 1)?;
			window.shift(&token);
			record.push(token);
		}

		let read = record.len();
		debug!("Ingested corpus #{} ({} tokens)", self.corpora.len(), read);
		self.corpora.push(record);
		Ok(read)
	}

	/// Ingests one corpus from a buffered reader.
	///
	/// # Errors
	/// Returns `ChainError::Io` if reading fails. Tokens read before the
	/// failure are discarded, the builder is left untouched.
	pub fn ingest_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
		let tokens = Tokens::new(reader).collect::<std::io::Result<Vec<_>>>()?;
		self.ingest(tokens)
	}

	/// Ingests one corpus from a file.
	pub fn ingest_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
		let path = path.as_ref();
		let read = self.ingest_reader(open_reader(path)?)?;
		info!("Read {} tokens from {}", read, path.display());
		Ok(read)
	}

	/// Ingests several files on worker threads.
	///
	/// # Behavior
	/// - Each file is built by an independent builder.
	/// - At most `num_cpus::get()` threads run; files are dealt round-robin.
	/// - Partial builders are merged in input-file-list order, so the result
	///   (table, first-seen order and written model) is identical to calling
	///   `ingest_file` on each path in turn.
	///
	/// # Errors
	/// - The first failing file in input order is reported.
	/// - `ChainError::Worker` if a worker thread died without reporting.
	///
	/// Every file is read before anything is merged, so on a read error the
	/// builder is left untouched.
	pub fn ingest_files_parallel<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize> {
		if paths.is_empty() {
			return Ok(0);
		}

		let order = self.order();
		let workers = num_cpus::get().clamp(1, paths.len());
		info!("Ingesting {} corpora on {} threads", paths.len(), workers);

		let (tx, rx) = mpsc::channel();
		for worker in 0..workers {
			let tx = tx.clone();
			let assigned: Vec<(usize, PathBuf)> = paths
				.iter()
				.enumerate()
				.skip(worker)
				.step_by(workers)
				.map(|(index, path)| (index, path.as_ref().to_path_buf()))
				.collect();

			thread::spawn(move || {
				for (index, path) in assigned {
					let partial = ChainBuilder::new(order).and_then(|mut builder| {
						builder.ingest_file(&path)?;
						Ok(builder)
					});
					if tx.send((index, partial)).is_err() {
						return;
					}
				}
			});
		}
		drop(tx);

		let mut slots: Vec<Option<Result<ChainBuilder>>> = (0..paths.len()).map(|_| None).collect();
		for (index, partial) in rx.iter() {
			slots[index] = Some(partial);
		}

		let partials = slots
			.into_iter()
			.enumerate()
			.map(|(index, slot)| {
				slot.ok_or_else(|| {
					ChainError::Worker(format!("no result for {}", paths[index].as_ref().display()))
				})?
			})
			.collect::<Result<Vec<ChainBuilder>>>()?;

		let mut combined = ChainBuilder::new(order)?;
		for partial in partials {
			combined.merge(partial)?;
		}

		let read = combined.corpora.iter().map(Vec::len).sum();
		self.merge(combined)?;
		Ok(read)
	}

	/// Merges another builder into this one.
	///
	/// Counts are summed, new prefixes are appended in `other`'s first-seen
	/// order and `other`'s corpora are appended after ours.
	///
	/// # Errors
	/// - `ChainError::Config` if the orders do not match.
	/// - `ChainError::CountOverflow` if a summed count overflows.
	pub fn merge(&mut self, other: ChainBuilder) -> Result<()> {
		self.chain.merge(&other.chain)?;
		self.corpora.extend(other.corpora);
		Ok(())
	}

	/// Writes the model in the persisted text format.
	pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
		writer::write_model(&self.chain, &self.corpora, writer)
	}

	/// Writes the model to a file, creating or truncating it.
	pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		writer::write_model_file(&self.chain, &self.corpora, path)
	}
}
