use super::sampler::SamplerKind;
use crate::error::{ChainError, Result};

/// Parameters for a generation run.
///
/// # Responsibilities
/// - Track the word limit, an optional seed and the sampler choice
/// - Reject invalid values at the setter, before any generation starts
///
/// # Invariants
/// - `word_count` is always >= 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
	/// Maximum number of tokens to emit.
	word_count: usize,

	/// Seed for the random source; entropy from the OS when `None`.
	pub seed: Option<u64>,

	/// Strategy used to draw suffixes.
	pub sampler: SamplerKind,
}

impl GenerateOptions {
	/// Creates options for `word_count` tokens, unseeded, with the pool sampler.
	///
	/// # Errors
	/// Returns `ChainError::Config` if `word_count` is 0.
	pub fn new(word_count: usize) -> Result<Self> {
		let mut options = Self { word_count: 1, seed: None, sampler: SamplerKind::default() };
		options.set_word_count(word_count)?;
		Ok(options)
	}

	pub fn word_count(&self) -> usize {
		self.word_count
	}

	/// Sets the word limit.
	///
	/// # Errors
	/// Returns `ChainError::Config` if `word_count` is 0.
	pub fn set_word_count(&mut self, word_count: usize) -> Result<()> {
		if word_count == 0 {
			return Err(ChainError::Config("word count must be >= 1".to_owned()));
		}
		self.word_count = word_count;
		Ok(())
	}

	pub fn seed(&self) -> Option<u64> {
		self.seed
	}

	pub fn sampler(&self) -> SamplerKind {
		self.sampler
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_words_is_a_config_error() {
		assert!(matches!(GenerateOptions::new(0), Err(ChainError::Config(_))));

		let mut options = GenerateOptions::new(5).unwrap();
		assert!(options.set_word_count(0).is_err());
		assert_eq!(options.word_count(), 5);
	}
}
