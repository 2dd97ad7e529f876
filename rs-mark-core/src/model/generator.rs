use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::chain::Chain;
use super::options::GenerateOptions;
use super::prefix::Prefix;
use super::sampler::{SamplerKind, SuffixSampler};
use crate::error::{ChainError, Result};

/// Frequency-weighted random walk over a loaded chain.
///
/// # Responsibilities
/// - Pick a uniformly random starting prefix
/// - Repeatedly draw a suffix weighted by its count and slide the window
/// - Stop at the word limit or at the first prefix without suffixes
///
/// The random source is owned by the generator, so a seeded `StdRng` gives
/// reproducible output. The chain is only borrowed and never modified.
#[derive(Debug)]
pub struct Generator<'a, R, S = SamplerKind> {
	chain: &'a Chain,
	rng: R,
	sampler: S,
}

impl<'a> Generator<'a, StdRng, SamplerKind> {
	/// Creates a generator configured from `options`: seeded if a seed is set,
	/// seeded from the OS otherwise.
	pub fn from_options(chain: &'a Chain, options: &GenerateOptions) -> Self {
		let rng = match options.seed() {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		Generator::with_sampler(chain, rng, options.sampler())
	}
}

impl<'a, R: Rng> Generator<'a, R, SamplerKind> {
	/// Creates a generator with the default (repeated pool) sampler.
	pub fn new(chain: &'a Chain, rng: R) -> Self {
		Generator::with_sampler(chain, rng, SamplerKind::default())
	}
}

impl<'a, R: Rng, S: SuffixSampler> Generator<'a, R, S> {
	pub fn with_sampler(chain: &'a Chain, rng: R, sampler: S) -> Self {
		Self { chain, rng, sampler }
	}

	/// Generates at most `max_tokens` tokens.
	///
	/// # Behavior
	/// - The starting prefix is emitted whole, so at least `order` tokens are
	///   returned even if `max_tokens` is smaller.
	/// - Generation stops early, without error, when the current prefix has no
	///   recorded suffix.
	/// - Starting prefixes may contain empty placeholder tokens.
	///
	/// # Errors
	/// Returns `ChainError::ExhaustedChain` if the chain has no prefix.
	pub fn generate(&mut self, max_tokens: usize) -> Result<Vec<String>> {
		let chain = self.chain;
		if chain.is_empty() {
			return Err(ChainError::ExhaustedChain);
		}

		let start = self.rng.random_range(0..chain.len());
		let mut window: Prefix = chain
			.state_at(start)
			.map(|state| state.prefix().clone())
			.ok_or(ChainError::ExhaustedChain)?;

		let mut words: Vec<String> = window.tokens().to_vec();
		while words.len() < max_tokens {
			let Some(state) = chain.get(&window.key()) else {
				debug!("Dead end at {:?} after {} tokens", window.key(), words.len());
				break;
			};
			let Some(suffix) = self.sampler.sample(state, &mut self.rng) else {
				debug!("Dead end at {:?} after {} tokens", window.key(), words.len());
				break;
			};
			window.shift(suffix);
			words.push(suffix.to_owned());
		}

		Ok(words)
	}

	/// Generates and joins the tokens with single spaces, leaving out empty
	/// placeholder tokens.
	pub fn generate_text(&mut self, max_tokens: usize) -> Result<String> {
		let words = self.generate(max_tokens)?;
		Ok(words
			.iter()
			.filter(|word| !word.is_empty())
			.map(String::as_str)
			.collect::<Vec<_>>()
			.join(" "))
	}
}
