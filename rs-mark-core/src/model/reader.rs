use std::io::BufRead;
use std::path::Path;

use log::info;

use super::chain::Chain;
use super::prefix::Prefix;
use super::writer::EMPTY_TOKEN;
use crate::error::{ChainError, Result};
use crate::io::open_reader;

/// Parses a model in the persisted text format.
///
/// # Behavior
/// - Line 1 is the order.
/// - Every other line holds `order` prefix fields followed by suffix/count
///   pairs. `""` fields become empty tokens.
/// - A prefix seen on several lines keeps its first position; counts are summed.
///
/// # Errors
/// - `ChainError::Format` for a missing or non-integer header, an order of 0,
///   a line with fewer than `order` fields, an odd number of suffix/count
///   fields, a non-integer count, or counts of one prefix whose sum overflows
///   a `usize`. The whole read is aborted.
/// - `ChainError::Io` if reading fails.
pub fn read_model<R: BufRead>(reader: R) -> Result<Chain> {
	let mut lines = reader.lines();

	let header = lines.next().ok_or_else(|| ChainError::format(1, "missing order header"))??;
	let order: usize = header
		.trim()
		.parse()
		.map_err(|_| ChainError::format(1, format!("order is not an integer: {:?}", header.trim())))?;
	let mut chain = Chain::new(order).map_err(|_| ChainError::format(1, "order must be >= 1"))?;

	for (offset, line) in lines.enumerate() {
		let number = offset + 2;
		let line = line?;
		let fields: Vec<&str> = line
			.split_whitespace()
			.map(|field| if field == EMPTY_TOKEN { "" } else { field })
			.collect();

		if fields.len() < order {
			return Err(ChainError::format(
				number,
				format!("expected at least {} prefix fields, found {}", order, fields.len()),
			));
		}

		let (prefix_fields, pairs) = fields.split_at(order);
		if pairs.len() % 2 != 0 {
			return Err(ChainError::format(number, "odd number of suffix/count fields"));
		}

		let prefix = Prefix::from_tokens(prefix_fields.iter().map(|f| f.to_string()).collect());
		let state = chain.state_mut(&prefix);
		for pair in pairs.chunks_exact(2) {
			let count: usize = pair[1]
				.parse()
				.map_err(|_| ChainError::format(number, format!("count is not an integer: {:?}", pair[1])))?;
			state
				.add_transition(pair[0], count)
				.map_err(|e| ChainError::format(number, e.to_string()))?;
		}
	}

	Ok(chain)
}

/// Reads a model from a file.
pub fn read_model_file<P: AsRef<Path>>(path: P) -> Result<Chain> {
	let path = path.as_ref();
	let chain = read_model(open_reader(path)?)?;
	info!("Loaded {} prefixes (order {}) from {}", chain.len(), chain.order(), path.display());
	Ok(chain)
}
