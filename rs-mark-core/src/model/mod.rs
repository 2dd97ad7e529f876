//! Markov chain model: building, persistence and generation.
//!
//! - Prefix windows and their string keys (`Prefix`)
//! - The ordered frequency table (`Chain`, `State`)
//! - Corpus ingestion (`ChainBuilder`)
//! - The persisted text format (`writer`, `reader`) and binary snapshots
//! - Weighted random generation (`Generator`, `SuffixSampler`)

/// Fixed-length token window.
pub mod prefix;

/// Suffix counts of a single prefix.
pub mod state;

/// Frequency table with first-seen prefix order.
pub mod chain;

/// Corpus ingestion, sequential or on worker threads.
pub mod builder;

/// Text model serialization with deterministic line order.
pub mod writer;

/// Text model parsing.
pub mod reader;

/// Optional binary snapshot of a parsed model.
pub mod snapshot;

/// Weighted suffix selection strategies.
pub mod sampler;

/// Generation parameters.
pub mod options;

/// Weighted random walk over a chain.
pub mod generator;
