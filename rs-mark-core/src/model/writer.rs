use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use log::info;

use super::chain::Chain;
use super::prefix::Prefix;
use super::state::State;
use crate::error::Result;
use crate::io::create_writer;

/// Marker written in place of an empty-string token.
pub const EMPTY_TOKEN: &str = "\"\"";

/// Writes `chain` in the persisted text format.
///
/// # Format
/// - Line 1: the order.
/// - One line per distinct prefix: the prefix tokens, then every suffix with
///   its cumulative count, space separated. Empty tokens are written as `""`.
///
/// # Behavior
/// - Each corpus in `corpora` is replayed with the same window sliding used
///   while building. A prefix's line is emitted the first time the replay
///   reaches it, and never again.
/// - Prefixes the replay never reaches (a chain loaded from disk has no
///   corpora) are emitted afterwards in first-seen order.
/// - Suffixes are written in first-observation order.
pub fn write_model<W: Write>(chain: &Chain, corpora: &[Vec<String>], mut writer: W) -> Result<()> {
	writeln!(writer, "{}", chain.order())?;

	let mut emitted: HashSet<String> = HashSet::with_capacity(chain.len());

	for corpus in corpora {
		let mut window = Prefix::new(chain.order());
		for token in corpus {
			let key = window.key();
			if !emitted.contains(&key) {
				if let Some(state) = chain.get(&key) {
					write_state(&mut writer, state)?;
				}
				emitted.insert(key);
			}
			window.shift(token);
		}
	}

	for state in chain.states() {
		if emitted.insert(state.prefix().key()) {
			write_state(&mut writer, state)?;
		}
	}

	writer.flush()?;
	Ok(())
}

/// Writes `chain` to `path`, creating or truncating the file.
pub fn write_model_file<P: AsRef<Path>>(chain: &Chain, corpora: &[Vec<String>], path: P) -> Result<()> {
	let path = path.as_ref();
	write_model(chain, corpora, create_writer(path)?)?;
	info!("Wrote {} prefixes (order {}) to {}", chain.len(), chain.order(), path.display());
	Ok(())
}

fn write_state<W: Write>(writer: &mut W, state: &State) -> Result<()> {
	let mut fields: Vec<&str> = state.prefix().tokens().iter().map(|t| quote(t)).collect();
	let counts: Vec<String> = state.transitions().iter().map(|t| t.count.to_string()).collect();
	for (transition, count) in state.transitions().iter().zip(&counts) {
		fields.push(quote(&transition.suffix));
		fields.push(count);
	}
	writeln!(writer, "{}", fields.join(" "))?;
	Ok(())
}

fn quote(token: &str) -> &str {
	if token.is_empty() { EMPTY_TOKEN } else { token }
}
