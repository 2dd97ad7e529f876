use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::chain::Chain;
use super::reader::read_model;
use crate::error::{ChainError, Result};
use crate::io::build_output_path;

/// Binary form of a parsed model, tagged with the SHA-256 of the text it
/// was parsed from.
#[derive(Serialize, Deserialize)]
struct Snapshot {
	model_digest: [u8; 32],
	chain: Chain,
}

/// Loads a chain from a text model, optionally through a binary snapshot.
///
/// - `use_snapshot == false`: parses the text model.
/// - `use_snapshot == true`: uses `<model>.bin` next to the model if it was
///   built from the current model content (same SHA-256); otherwise parses the
///   text model and (re)writes the snapshot with `postcard`.
///
/// A snapshot that cannot be decoded, was built from other content or holds
/// an inconsistent table is logged and rebuilt. The text model stays the
/// canonical form; the snapshot only saves parsing.
pub fn load_chain<P: AsRef<Path>>(model_path: P, use_snapshot: bool) -> Result<Chain> {
	let model_path = model_path.as_ref();
	let text = fs::read(model_path).map_err(|e| ChainError::path(model_path, e))?;
	if !use_snapshot {
		return parse_model(model_path, &text);
	}

	let snapshot_path = snapshot_path(model_path)?;
	let model_digest: [u8; 32] = Sha256::digest(&text).into();
	if let Some(chain) = read_snapshot(&snapshot_path, &model_digest) {
		info!("Loaded {} prefixes from snapshot {}", chain.len(), snapshot_path.display());
		return Ok(chain);
	}

	let chain = parse_model(model_path, &text)?;
	let snapshot = Snapshot { model_digest, chain };
	let bytes = postcard::to_stdvec(&snapshot)?;
	fs::write(&snapshot_path, bytes).map_err(|e| ChainError::path(&snapshot_path, e))?;
	info!("Wrote snapshot {}", snapshot_path.display());
	Ok(snapshot.chain)
}

/// Path of the binary snapshot belonging to a text model.
///
/// Example: `models/alice.txt` → `models/alice.bin`
pub fn snapshot_path<P: AsRef<Path>>(model_path: P) -> Result<PathBuf> {
	let path = build_output_path(&model_path, "bin")?;
	if path == model_path.as_ref() {
		return Err(ChainError::Config(format!(
			"model {} would be overwritten by its own snapshot",
			path.display()
		)));
	}
	Ok(path)
}

fn parse_model(model_path: &Path, text: &[u8]) -> Result<Chain> {
	let chain = read_model(text)?;
	info!("Loaded {} prefixes (order {}) from {}", chain.len(), chain.order(), model_path.display());
	Ok(chain)
}

/// Returns the snapshot's chain if it decodes, matches `model_digest` and
/// reindexes cleanly. Any other outcome means the snapshot must be rebuilt.
fn read_snapshot(snapshot_path: &Path, model_digest: &[u8; 32]) -> Option<Chain> {
	let bytes = fs::read(snapshot_path).ok()?;
	let mut snapshot: Snapshot = match postcard::from_bytes(&bytes) {
		Ok(snapshot) => snapshot,
		Err(e) => {
			warn!("Snapshot {} is unreadable ({}), rebuilding", snapshot_path.display(), e);
			return None;
		}
	};
	if &snapshot.model_digest != model_digest {
		warn!("Snapshot {} is stale, rebuilding", snapshot_path.display());
		return None;
	}
	if let Err(e) = snapshot.chain.reindex() {
		warn!("Snapshot {} is invalid ({}), rebuilding", snapshot_path.display(), e);
		return None;
	}
	Some(snapshot.chain)
}
