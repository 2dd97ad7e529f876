//! Word-level Markov chain text generation library.
//!
//! This crate provides:
//! - Frequency table construction from whitespace-delimited corpora
//! - A deterministic, order-preserving text format for trained models
//! - Frequency-weighted random generation with an injectable random source
//!
//! The most used items are re-exported at the crate root.

/// Chain model, persistence and generation.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// Token streaming and file helpers.
pub(crate) mod io;

pub use error::{ChainError, Result};
pub use io::Tokens;
pub use model::builder::ChainBuilder;
pub use model::chain::Chain;
pub use model::generator::Generator;
pub use model::options::GenerateOptions;
pub use model::prefix::Prefix;
pub use model::reader::{read_model, read_model_file};
pub use model::sampler::{CumulativeWeightSampler, RepeatedPoolSampler, SamplerKind, SuffixSampler};
pub use model::snapshot::load_chain;
pub use model::state::{State, Transition};
pub use model::writer::{write_model, write_model_file};
