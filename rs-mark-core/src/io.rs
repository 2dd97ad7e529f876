use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::vec;

use crate::error::{ChainError, Result};

/// Lazily splits a reader into whitespace-delimited tokens.
///
/// - Reads one line at a time, never the whole corpus
/// - Lines are read as raw bytes and decoded with `String::from_utf8_lossy`:
///   invalid UTF-8 sequences (for example Latin-1 text) become U+FFFD instead
///   of failing the corpus
/// - Yields owned tokens; I/O failures are yielded as errors
pub struct Tokens<R> {
	reader: R,
	line: Vec<u8>,
	pending: vec::IntoIter<String>,
}

impl<R: BufRead> Tokens<R> {
	pub fn new(reader: R) -> Self {
		Self { reader, line: Vec::new(), pending: Vec::new().into_iter() }
	}
}

impl<R: BufRead> Iterator for Tokens<R> {
	type Item = io::Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(token) = self.pending.next() {
				return Some(Ok(token));
			}
			self.line.clear();
			match self.reader.read_until(b'\n', &mut self.line) {
				Ok(0) => return None,
				Ok(_) => {
					self.pending = String::from_utf8_lossy(&self.line)
						.split_whitespace()
						.map(str::to_owned)
						.collect::<Vec<_>>()
						.into_iter();
				}
				Err(e) => return Some(Err(e)),
			}
		}
	}
}

/// Opens a file for buffered reading, attaching the path to any error.
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
	let path = path.as_ref();
	File::open(path)
		.map(BufReader::new)
		.map_err(|e| ChainError::path(path, e))
}

/// Creates (or truncates) a file for buffered writing, attaching the path to any error.
pub fn create_writer<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
	let path = path.as_ref();
	File::create(path)
		.map(BufWriter::new)
		.map_err(|e| ChainError::path(path, e))
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `models/alice.txt` + `"bin"` → `models/alice.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokens_span_lines_and_skip_blank_runs() {
		let text = "I am\n\n  not   a\tnumber!\r\nI";
		let tokens: Vec<String> = Tokens::new(text.as_bytes()).collect::<io::Result<_>>().unwrap();
		assert_eq!(tokens, ["I", "am", "not", "a", "number!", "I"]);
	}

	#[test]
	fn tokens_survive_invalid_utf8() {
		let bytes: &[u8] = b"caf\xe9 au lait\nna\xefve caf\xc3\xa9\n";
		let tokens: Vec<String> = Tokens::new(bytes).collect::<io::Result<_>>().unwrap();
		assert_eq!(tokens, ["caf\u{FFFD}", "au", "lait", "na\u{FFFD}ve", "café"]);
	}

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("models/alice.txt", "bin").unwrap();
		assert_eq!(path, PathBuf::from("models/alice.bin"));
		assert!(build_output_path("", "bin").is_err());
	}
}
