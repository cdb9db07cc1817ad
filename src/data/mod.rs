//! Corpus ingestion, seed dictionaries and persisted artefacts.

pub mod conll;
pub mod seeds;
pub mod store;
