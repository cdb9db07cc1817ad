//! Rule-seeded bootstrapping of emotion/cause relations from parsed tweets.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod nlp;

pub use error::{EmoCauseError, Result};
