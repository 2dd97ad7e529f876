use serde::{Deserialize, Serialize};

/// A fixed-length window of tokens.
///
/// A new window is filled with empty-string placeholders so that the first
/// tokens of a corpus still have a prefix to hang off.
///
/// # Invariants
/// - The window length never changes after construction (it is the chain order).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Prefix {
	tokens: Vec<String>,
}

impl Prefix {
	/// Creates a window of `order` empty placeholders.
	pub fn new(order: usize) -> Self {
		Self { tokens: vec![String::new(); order] }
	}

	/// Wraps already collected tokens. The window length is `tokens.len()`.
	pub fn from_tokens(tokens: Vec<String>) -> Self {
		Self { tokens }
	}

	/// Canonical string key: tokens joined with a single space.
	pub fn key(&self) -> String {
		self.tokens.join(" ")
	}

	/// Drops the first token and appends `token` at the end.
	pub fn shift(&mut self, token: &str) {
		if self.tokens.is_empty() {
			return;
		}
		self.tokens.rotate_left(1);
		if let Some(last) = self.tokens.last_mut() {
			last.clear();
			last.push_str(token);
		}
	}

	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}
