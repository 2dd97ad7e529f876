use std::path::PathBuf;

use thiserror::Error;

/// Every failure the chain library can report.
///
/// `Config` and `Io` are fatal at the caller's boundary. `Format` always aborts
/// a model read: a partially parsed table is never returned.
#[derive(Error, Debug)]
pub enum ChainError {
	#[error("Invalid configuration: {0}")]
	Config(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Cannot access {}: {source}", .path.display())]
	Path {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Malformed model at line {line}: {message}")]
	Format { line: usize, message: String },

	#[error("Count of {suffix:?} after {prefix:?} overflows")]
	CountOverflow { prefix: String, suffix: String },

	#[error("Inconsistent table: {0}")]
	InvalidTable(String),

	#[error("Chain is empty, nothing to generate from")]
	ExhaustedChain,

	#[error("Snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),

	#[error("Ingestion worker failed: {0}")]
	Worker(String),
}

impl ChainError {
	pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
		ChainError::Format { line, message: message.into() }
	}

	pub(crate) fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		ChainError::Path { path: path.into(), source }
	}
}

pub type Result<T> = std::result::Result<T, ChainError>;
