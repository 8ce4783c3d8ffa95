//! `argscope` is a scoped command line parser for Rust.
//!
//! Most command line parsers see the Cli as a flat list of tokens.
//! `argscope` adds *scope*: options may be collected into bracketed groups (`--db [ --host localhost ]`), each group its own namespace with its own configuration.
//! Specifically, `argscope` attempts to prioritize the following design concerns:
//! * *Type safe argument parsing*:
//! The user should not call any `&str -> T` conversion functions directly.
//! * *Scoped options*:
//! A group may reuse a flag name of its parent, and configures its own prefixes, positional ordering, bounds, and converters (inheriting whatever it leaves unset).
//! * *Every error in one pass*:
//! The parser recovers from each malformed token, so that one run reports every independent problem, nested by the group in which it occurred.
//! * *Declarative constraints*:
//! Requirements, exclusions, dependencies, and boolean conditions between flags are declared up front and checked after binding.
//!
//! # Usage
//! This page includes a demo on using `argscope`.
//! ```no_run
#![doc = include_str!("../demos/demo_grouped.rs")]
//! ```
//!
//! ```console
//! $ grouped --db [ --host localhost -p 5432 ] api web
//! Deploying ["api", "web"] (database: localhost:5432).
//!
//! $ grouped --db [ -p x --replica r ] api
//! Analysis:
//!   --db:
//!     Invalid value for '-p': cannot convert 'x' to u16.
//! --db [ -p x --replica r ] api
//!           ^
//! Constraint:
//!   A replica needs an explicit port.
//! --db [ -p x --replica r ] api
//! ^
//! ```
//!
//! # Input grammar
//! * Single value options: `--flag value`, `--flag=value`, or `--flag = value`.
//! A `bool` option may omit its value, in which case it is `true`.
//! * Multi value options: `--flag v1 v2 v3`, greedy until the next flag of the scope, a bracket, or the end of the input.
//! * Groups: `--group [ ... ]`, arbitrarily nestable.
//! * Positionals: bare values, routed to the arguments of the scope in declaration order.
//! * Double dash: one `--` per scope forces the tokens on one side of it to be positional.
//! * String literals: `"..."` or `'...'`, with the escapes `\n \r \t \" \' \\`.
//!
//! # Builder Api
//! Configure `argscope` by starting with a [`CommandLineParser`] and `add`ing parameters.
//! There are two classes of parameters: [`Parameter::argument`] and [`Parameter::option`].
//! Options may be collected into a [`Group`], which is itself added to the parser (or to another group).
//!
//! ### Fields
//! * [`Scalar`]: a single value (the last occurrence wins).
//! * [`Optional`]: a single value, held in an `Option<T>`.
//! * [`Collection`]: a multi value, for any collection that implements [Collectable](./prelude/trait.Collectable.html).
//! The cardinality is set via [`Nargs`].
//!
//! Value types implement [`Convert`].
//! `argscope` provides it for `bool`, `char`, every integer and float type, `String`, and `PathBuf`.
//! Use [`convert_from_str`] to implement it for your own `FromStr` types.
//!
//! ### Configuration
//! Each scope takes a [`ScopeConfig`], where every unset setting is inherited from the enclosing scope.
//!
//! ### Constraints
//! Add a [`Rule`] via [`CommandLineParser::rule`].
//! Rules refer to flags by [`FlagPath`] (ex: `"--db > --port"`), which resolve aliases at every level.
//!
//! ### Diagnostics
//! [`GeneralParser::parse_str`] returns [`Diagnostics`], holding one [`ErrorGroup`] per phase (Syntax, Analysis, Constraint).
//! [`GeneralParser::parse`] prints these and exits.
#![deny(missing_docs)]

pub use argscope_builder::*;
