//! Configuration parsing and types.
//!
//! - `types` - `Config` and its `process`, `logging` and `storage` sections
//! - `duration` - human-readable duration strings
//! - `parser` - YAML loading with defaults for a missing file
//! - `validation` - range checks and environment overrides

mod duration;
mod parser;
mod types;
mod validation;

pub use duration::*;
pub use parser::*;
pub use types::*;
