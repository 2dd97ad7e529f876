use std::fmt;
use std::str::FromStr;

use rand::Rng;

use super::state::State;

/// Picks a suffix of a state with probability proportional to its count.
///
/// Implementations must draw exactly one integer uniformly from
/// `0..state.total()` and map it onto the transitions in order, so that any two
/// samplers return the same suffix for the same random state.
pub trait SuffixSampler {
	/// Returns `None` if the state has no transitions.
	fn sample<'s, R: Rng>(&self, state: &'s State, rng: &mut R) -> Option<&'s str>;
}

/// Repeats every suffix `count` times and draws uniformly from the pool.
///
/// Exact, but allocates a pool as large as the state's total count on every draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatedPoolSampler;

impl SuffixSampler for RepeatedPoolSampler {
	fn sample<'s, R: Rng>(&self, state: &'s State, rng: &mut R) -> Option<&'s str> {
		let pool: Vec<&str> = state
			.transitions()
			.iter()
			.flat_map(|t| std::iter::repeat_n(t.suffix.as_str(), t.count))
			.collect();
		if pool.is_empty() {
			return None;
		}
		Some(pool[rng.random_range(0..pool.len())])
	}
}

/// Binary search over cumulative counts.
///
/// Same distribution as `RepeatedPoolSampler`, memory proportional to the
/// number of distinct suffixes instead of the number of observations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CumulativeWeightSampler;

impl SuffixSampler for CumulativeWeightSampler {
	fn sample<'s, R: Rng>(&self, state: &'s State, rng: &mut R) -> Option<&'s str> {
		if state.total() == 0 {
			return None;
		}
		let cumulative: Vec<usize> = state
			.transitions()
			.iter()
			.scan(0, |sum, t| {
				*sum += t.count;
				Some(*sum)
			})
			.collect();

		let r = rng.random_range(0..state.total());
		let position = cumulative.partition_point(|&bound| bound <= r);
		state.transitions().get(position).map(|t| t.suffix.as_str())
	}
}

/// Runtime choice between the available samplers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SamplerKind {
	#[default]
	Pool,
	Cumulative,
}

impl SuffixSampler for SamplerKind {
	fn sample<'s, R: Rng>(&self, state: &'s State, rng: &mut R) -> Option<&'s str> {
		match self {
			SamplerKind::Pool => RepeatedPoolSampler.sample(state, rng),
			SamplerKind::Cumulative => CumulativeWeightSampler.sample(state, rng),
		}
	}
}

impl FromStr for SamplerKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"pool" => Ok(SamplerKind::Pool),
			"cumulative" => Ok(SamplerKind::Cumulative),
			other => Err(format!("unknown sampler '{}', expected 'pool' or 'cumulative'", other)),
		}
	}
}

impl fmt::Display for SamplerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SamplerKind::Pool => write!(f, "pool"),
			SamplerKind::Cumulative => write!(f, "cumulative"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::prefix::Prefix;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn state() -> State {
		let mut state = State::new(Prefix::new(1));
		state.add_transition("a", 3).unwrap();
		state.add_transition("b", 1).unwrap();
		state.add_transition("c", 6).unwrap();
		state
	}

	#[test]
	fn samplers_agree_draw_for_draw() {
		let state = state();
		let mut pool_rng = StdRng::seed_from_u64(7);
		let mut cumulative_rng = StdRng::seed_from_u64(7);
		for _ in 0..500 {
			assert_eq!(
				RepeatedPoolSampler.sample(&state, &mut pool_rng),
				CumulativeWeightSampler.sample(&state, &mut cumulative_rng)
			);
		}
	}

	#[test]
	fn empty_state_yields_nothing() {
		let empty = State::new(Prefix::new(1));
		let mut rng = StdRng::seed_from_u64(1);
		assert_eq!(RepeatedPoolSampler.sample(&empty, &mut rng), None);
		assert_eq!(CumulativeWeightSampler.sample(&empty, &mut rng), None);
	}

	#[test]
	fn draws_follow_counts() {
		let state = state();
		let mut rng = StdRng::seed_from_u64(42);
		let mut hits = [0usize; 3];
		for _ in 0..10_000 {
			match SamplerKind::Cumulative.sample(&state, &mut rng) {
				Some("a") => hits[0] += 1,
				Some("b") => hits[1] += 1,
				Some("c") => hits[2] += 1,
				other => panic!("unexpected draw {:?}", other),
			}
		}
		// Expected 3000 / 1000 / 6000
		assert!((2700..3300).contains(&hits[0]));
		assert!((800..1200).contains(&hits[1]));
		assert!((5600..6400).contains(&hits[2]));
	}

	#[test]
	fn sampler_names_parse() {
		assert_eq!("Pool".parse::<SamplerKind>(), Ok(SamplerKind::Pool));
		assert_eq!("cumulative".parse::<SamplerKind>(), Ok(SamplerKind::Cumulative));
		assert!("alias".parse::<SamplerKind>().is_err());
	}
}
