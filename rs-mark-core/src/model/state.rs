use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::prefix::Prefix;
use crate::error::{ChainError, Result};

/// One observed suffix of a prefix and how many times it followed it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
	pub suffix: String,
	pub count: usize,
}

/// Represents a state in the chain.
///
/// A `State` corresponds to one prefix and stores every suffix observed after
/// it, in first-observation order.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - Each transition count is strictly positive
/// - `total` is the sum of all transition counts and fits in a `usize`
/// - `lookup[suffix]` is the position of `suffix` in `transitions`
///
/// `lookup` and `total` are derived from `transitions` and are not serialized;
/// `reindex` rebuilds them after deserialization.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct State {
	prefix: Prefix,
	transitions: Vec<Transition>,
	#[serde(skip)]
	lookup: HashMap<String, usize>,
	#[serde(skip)]
	total: usize,
}

impl State {
	/// Creates a new empty state for the given prefix.
	pub fn new(prefix: Prefix) -> Self {
		Self {
			prefix,
			transitions: Vec::new(),
			lookup: HashMap::new(),
			total: 0,
		}
	}

	/// Adds `count` occurrences of `suffix`.
	///
	/// - If the transition already exists, its count is increased.
	/// - Otherwise, a new transition is appended.
	/// - A zero count is ignored, so no zero-weight transition is ever stored.
	///
	/// # Errors
	/// Returns `ChainError::CountOverflow` if the suffix count or the state total
	/// would exceed `usize::MAX`. The state is left unchanged.
	pub fn add_transition(&mut self, suffix: &str, count: usize) -> Result<()> {
		if count == 0 {
			return Ok(());
		}
		let overflow = || ChainError::CountOverflow {
			prefix: self.prefix.key(),
			suffix: suffix.to_owned(),
		};
		let total = self.total.checked_add(count).ok_or_else(overflow)?;

		match self.lookup.get(suffix) {
			Some(&index) => {
				let transition = &mut self.transitions[index];
				// Bounded by `total`, which did not overflow.
				transition.count += count;
			}
			None => {
				self.lookup.insert(suffix.to_owned(), self.transitions.len());
				self.transitions.push(Transition { suffix: suffix.to_owned(), count });
			}
		}
		self.total = total;
		Ok(())
	}

	pub fn prefix(&self) -> &Prefix {
		&self.prefix
	}

	/// Transitions in first-observation order.
	pub fn transitions(&self) -> &[Transition] {
		&self.transitions
	}

	/// Count recorded for `suffix`, 0 if never observed.
	pub fn count(&self, suffix: &str) -> usize {
		self.lookup
			.get(suffix)
			.map(|&index| self.transitions[index].count)
			.unwrap_or(0)
	}

	/// Sum of all transition counts.
	pub fn total(&self) -> usize {
		self.total
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Merges another state into this one, summing counts.
	///
	/// Suffixes new to `self` are appended in `other`'s order.
	///
	/// # Errors
	/// Returns `ChainError::CountOverflow` if a summed count overflows.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		for transition in &other.transitions {
			self.add_transition(&transition.suffix, transition.count)?;
		}
		Ok(())
	}

	/// Rebuilds `lookup` and `total` from `transitions`.
	///
	/// # Errors
	/// Returns `ChainError::InvalidTable` for a duplicate suffix, a zero count
	/// or a total that overflows.
	pub(crate) fn reindex(&mut self) -> Result<()> {
		let invalid = |message: &str| {
			ChainError::InvalidTable(format!("prefix {:?}: {}", self.prefix.key(), message))
		};

		let mut lookup = HashMap::with_capacity(self.transitions.len());
		let mut total: usize = 0;
		for (index, transition) in self.transitions.iter().enumerate() {
			if transition.count == 0 {
				return Err(invalid("zero count"));
			}
			if lookup.insert(transition.suffix.clone(), index).is_some() {
				return Err(invalid("duplicate suffix"));
			}
			total = total.checked_add(transition.count).ok_or_else(|| invalid("total overflows"))?;
		}

		self.lookup = lookup;
		self.total = total;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_accumulate_in_first_seen_order() {
		let mut state = State::new(Prefix::new(1));
		state.add_transition("b", 1).unwrap();
		state.add_transition("a", 2).unwrap();
		state.add_transition("b", 3).unwrap();
		state.add_transition("c", 0).unwrap();

		let suffixes: Vec<_> = state.transitions().iter().map(|t| t.suffix.as_str()).collect();
		assert_eq!(suffixes, ["b", "a"]);
		assert_eq!(state.count("b"), 4);
		assert_eq!(state.count("c"), 0);
		assert_eq!(state.total(), 6);
	}

	#[test]
	fn overflowing_count_leaves_state_untouched() {
		let mut state = State::new(Prefix::new(1));
		state.add_transition("x", usize::MAX).unwrap();
		assert!(matches!(state.add_transition("y", 1), Err(ChainError::CountOverflow { .. })));
		assert!(matches!(state.add_transition("x", 1), Err(ChainError::CountOverflow { .. })));

		assert_eq!(state.transitions().len(), 1);
		assert_eq!(state.count("x"), usize::MAX);
		assert_eq!(state.total(), usize::MAX);
	}

	#[test]
	fn reindex_rebuilds_derived_fields() {
		let mut state = State::new(Prefix::new(1));
		state.add_transition("a", 2).unwrap();
		state.add_transition("b", 5).unwrap();
		state.lookup.clear();
		state.total = 0;

		state.reindex().unwrap();
		assert_eq!(state.count("b"), 5);
		assert_eq!(state.total(), 7);

		state.transitions.push(Transition { suffix: "a".to_owned(), count: 1 });
		assert!(matches!(state.reindex(), Err(ChainError::InvalidTable(_))));
	}
}
