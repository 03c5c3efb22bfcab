//! A small blocking client for the Wordnik word-data API.
//!
//! ```no_run
//! use wordnik::{Client, Config, DefinitionsOptions};
//!
//! let client = Client::new(Config::load()?)?;
//! let definitions = client.definitions("donkey", &DefinitionsOptions::default())?;
//! if let Some(first) = definitions.get(0) {
//!     println!("{}: {}", first["headword"], first["text"]);
//! }
//! # Ok::<(), wordnik::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
mod serde_help;

pub use client::{Client, DefinitionsOptions, Method, PhrasesOptions, RelatedWordsOptions};
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
