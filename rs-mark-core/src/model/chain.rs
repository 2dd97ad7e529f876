use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::prefix::Prefix;
use super::state::State;
use super::writer;
use crate::error::{ChainError, Result};

/// The frequency table of a Markov chain together with its first-seen prefix order.
///
/// States are stored in the order their prefix was first recorded, and an index
/// maps every prefix key to its position, so membership checks are O(1) and
/// iteration order is deterministic.
///
/// # Responsibilities
/// - Accumulate suffix counts per prefix
/// - Remember the order in which prefixes were first seen
/// - Merge with another chain of the same order
///
/// # Invariants
/// - `order` is always >= 1
/// - Every key of `index` points at the state holding that prefix, and every
///   state appears exactly once
/// - All transition counts are >= 1
///
/// `index` is derived from `states` and is not serialized; `reindex` rebuilds
/// it after deserialization.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Chain {
	/// Number of tokens per prefix
	order: usize,

	/// States in first-seen order
	states: Vec<State>,

	/// Mapping from a prefix key to its position in `states`
	#[serde(skip)]
	index: HashMap<String, usize>,
}

impl Chain {
	/// Creates an empty chain of the given order.
	///
	/// # Errors
	/// Returns `ChainError::Config` if `order` is 0.
	pub fn new(order: usize) -> Result<Self> {
		if order == 0 {
			return Err(ChainError::Config("order must be >= 1".to_owned()));
		}
		Ok(Self { order, states: Vec::new(), index: HashMap::new() })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct prefixes.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Number of prefix-suffix observations across the whole table,
	/// saturating at `usize::MAX`.
	pub fn total_observations(&self) -> usize {
		self.states.iter().map(State::total).fold(0, usize::saturating_add)
	}

	/// Adds `count` observations of `suffix` after `prefix`.
	///
	/// The prefix is appended to the first-seen order if it is new.
	///
	/// # Errors
	/// Returns `ChainError::CountOverflow` if the prefix's counts overflow.
	pub fn add(&mut self, prefix: &Prefix, suffix: &str, count: usize) -> Result<()> {
		self.state_mut(prefix).add_transition(suffix, count)
	}

	/// Returns the state for `prefix`, creating it if needed.
	pub(crate) fn state_mut(&mut self, prefix: &Prefix) -> &mut State {
		let key = prefix.key();
		let position = match self.index.get(&key) {
			Some(&position) => position,
			None => {
				let position = self.states.len();
				self.states.push(State::new(prefix.clone()));
				self.index.insert(key, position);
				position
			}
		};
		&mut self.states[position]
	}

	/// Looks up the state for a prefix key.
	pub fn get(&self, key: &str) -> Option<&State> {
		self.index.get(key).map(|&position| &self.states[position])
	}

	pub fn contains(&self, key: &str) -> bool {
		self.index.contains_key(key)
	}

	/// State at `position` in first-seen order.
	pub fn state_at(&self, position: usize) -> Option<&State> {
		self.states.get(position)
	}

	/// States in first-seen order.
	pub fn states(&self) -> impl Iterator<Item = &State> {
		self.states.iter()
	}

	/// Prefix keys in first-seen order.
	pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
		self.states.iter().map(|state| state.prefix().key())
	}

	/// Merges another chain into this one.
	///
	/// # Notes
	/// - Both chains must have the same order.
	/// - Counts for matching prefixes and suffixes are summed.
	/// - Prefixes unknown to `self` are appended in `other`'s first-seen order,
	///   so merging partial chains in input order reproduces sequential building.
	///
	/// # Errors
	/// - `ChainError::Config` if the orders do not match.
	/// - `ChainError::CountOverflow` if a summed count overflows; states merged
	///   before the failing one keep their new counts.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(ChainError::Config(format!(
				"order mismatch: self={}, other={}",
				self.order, other.order
			)));
		}

		for state in &other.states {
			self.state_mut(state.prefix()).merge(state)?;
		}

		Ok(())
	}

	/// Rebuilds the prefix index and every state's derived fields.
	///
	/// # Errors
	/// Returns `ChainError::InvalidTable` if the order is 0, a prefix has the
	/// wrong length or appears twice, or a state is inconsistent.
	pub(crate) fn reindex(&mut self) -> Result<()> {
		if self.order == 0 {
			return Err(ChainError::InvalidTable("order is 0".to_owned()));
		}

		let mut index = HashMap::with_capacity(self.states.len());
		for (position, state) in self.states.iter_mut().enumerate() {
			if state.prefix().len() != self.order {
				return Err(ChainError::InvalidTable(format!(
					"prefix {:?} has {} tokens, expected {}",
					state.prefix().key(),
					state.prefix().len(),
					self.order
				)));
			}
			state.reindex()?;
			if index.insert(state.prefix().key(), position).is_some() {
				return Err(ChainError::InvalidTable(format!("duplicate prefix {:?}", state.prefix().key())));
			}
		}

		self.index = index;
		Ok(())
	}

	/// Writes the chain in the persisted text format, in first-seen order.
	///
	/// A chain without its corpora (for example one loaded from disk) is written
	/// line for line in the order it was read.
	pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
		writer::write_model(self, &[], writer)
	}

	pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		writer::write_model_file(self, &[], path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn prefix(tokens: &[&str]) -> Prefix {
		Prefix::from_tokens(tokens.iter().map(|t| t.to_string()).collect())
	}

	#[test]
	fn zero_order_is_rejected() {
		assert!(matches!(Chain::new(0), Err(ChainError::Config(_))));
	}

	#[test]
	fn prefixes_keep_first_seen_order() {
		let mut chain = Chain::new(1).unwrap();
		chain.add(&prefix(&["b"]), "x", 1).unwrap();
		chain.add(&prefix(&["a"]), "y", 1).unwrap();
		chain.add(&prefix(&["b"]), "z", 2).unwrap();

		assert_eq!(chain.keys().collect::<Vec<_>>(), ["b", "a"]);
		assert_eq!(chain.get("b").unwrap().total(), 3);
		assert_eq!(chain.total_observations(), 4);
	}

	#[test]
	fn merge_sums_counts_and_appends_new_prefixes() {
		let mut left = Chain::new(1).unwrap();
		left.add(&prefix(&["a"]), "x", 1).unwrap();
		let mut right = Chain::new(1).unwrap();
		right.add(&prefix(&["c"]), "y", 1).unwrap();
		right.add(&prefix(&["a"]), "x", 2).unwrap();

		left.merge(&right).unwrap();
		assert_eq!(left.keys().collect::<Vec<_>>(), ["a", "c"]);
		assert_eq!(left.get("a").unwrap().count("x"), 3);

		let other_order = Chain::new(2).unwrap();
		assert!(left.merge(&other_order).is_err());
	}

	#[test]
	fn decoded_chain_is_reindexed() {
		let mut chain = Chain::new(1).unwrap();
		chain.add(&prefix(&["a"]), "x", 4).unwrap();
		chain.add(&prefix(&["b"]), "y", 1).unwrap();

		let bytes = postcard::to_stdvec(&chain).unwrap();
		let mut decoded: Chain = postcard::from_bytes(&bytes).unwrap();
		assert!(decoded.get("a").is_none());

		decoded.reindex().unwrap();
		assert_eq!(decoded.keys().collect::<Vec<_>>(), ["a", "b"]);
		assert_eq!(decoded.get("a").unwrap().count("x"), 4);
		assert_eq!(decoded.get("a").unwrap().total(), 4);
	}

	#[test]
	fn reindex_rejects_inconsistent_tables() {
		let mut duplicated = Chain::new(1).unwrap();
		duplicated.add(&prefix(&["a"]), "x", 1).unwrap();
		duplicated.states.push(duplicated.states[0].clone());
		assert!(matches!(duplicated.reindex(), Err(ChainError::InvalidTable(_))));

		let mut wrong_length = Chain::new(2).unwrap();
		wrong_length.states.push(State::new(prefix(&["a"])));
		assert!(matches!(wrong_length.reindex(), Err(ChainError::InvalidTable(_))));
	}

	#[test]
	fn overflow_is_reported() {
		let mut chain = Chain::new(1).unwrap();
		chain.add(&prefix(&["a"]), "x", usize::MAX).unwrap();
		assert!(matches!(chain.add(&prefix(&["a"]), "y", 1), Err(ChainError::CountOverflow { .. })));

		let mut other = Chain::new(1).unwrap();
		other.add(&prefix(&["a"]), "x", 1).unwrap();
		assert!(matches!(chain.merge(&other), Err(ChainError::CountOverflow { .. })));
	}
}
