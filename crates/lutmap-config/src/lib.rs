//! # lutmap-config
//!
//! Loads map specifications and their build options from YAML or JSON
//! documents.
//!
//! # Features
//!
//! - Single-map documents ([`MapDocument`])
//! - Libraries of named maps with shared defaults ([`MapLibrary`])
//! - Layered documents combined by an ordered deep merge ([`deep_merge`],
//!   [`MergePolicy`])
//! - Dotted-path access into the merged store ([`lookup`])
//!
//! # Example
//!
//! ```rust
//! use lutmap_config::MapDocument;
//!
//! let doc = MapDocument::from_yaml_str(r#"
//! map:
//!   red: 1
//!   blue: 2
//! axis: -1
//! keep_dims: false
//! "#).unwrap();
//! let lut = doc.build::<u8, u8>().unwrap();
//! assert_eq!(lut.len(), 2);
//! ```
//!
//! # Dependencies
//!
//! - [`serde_yaml`] - YAML/JSON parsing
//! - [`lutmap-lut`] - Transform building

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod document;
mod error;
mod merge;

pub use document::{MapDocument, MapLibrary};
pub use error::{ConfigError, ConfigResult};
pub use merge::{deep_merge, lookup, merge_layers, validate_keys, MergePolicy, MAP_FIELD};
