//! Builder module for `argscope`.
//! See [documentation root](https://docs.rs/argscope/latest/argscope/index.html) for full details.
#![deny(missing_docs)]
mod analysis;
mod api;
mod constant;
mod constraint;
mod context;
mod error;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;
mod runtime;
mod scanner;

pub use api::*;
pub use constraint::{absent, at_least, at_most, exactly, present, Condition, Rule, When};
pub use context::{ConvertFn, ResolvedConfig, ScopeConfig};
pub use error::*;
pub use model::*;
pub use runtime::{ConfigError, Diagnostics, GeneralParser, Parsed};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
