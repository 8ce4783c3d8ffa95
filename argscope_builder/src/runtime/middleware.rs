use std::collections::BTreeMap;
use std::env;
use thiserror::Error;

use crate::analysis::bind;
use crate::constant::{ANALYSIS_GROUP, CONSTRAINT_GROUP, SYNTAX_GROUP};
use crate::constraint::ConstraintEngine;
use crate::context::{Context, FlagTree};
use crate::error::{ErrorGroup, ErrorMessage};
use crate::model::FlagPath;
use crate::parser::{check_positionals, parse};
use crate::runtime::{print_diagnostics, UserInterface};
use crate::scanner::scan;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The declared configuration is invalid.
/// Carries every problem found, within the Validation group.
#[derive(Debug, Error)]
#[error("Config error:\n{0}")]
pub struct ConfigError(ErrorGroup);

impl ConfigError {
    pub(crate) fn new(errors: ErrorGroup) -> Self {
        Self(errors)
    }

    /// The validation errors.
    pub fn errors(&self) -> &ErrorGroup {
        &self.0
    }
}

/// Every diagnostic of one parse run, by phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    input: String,
    syntax: ErrorGroup,
    analysis: ErrorGroup,
    constraint: ErrorGroup,
}

impl Diagnostics {
    pub(crate) fn from_parts(
        input: impl Into<String>,
        syntax: ErrorGroup,
        analysis: ErrorGroup,
        constraint: ErrorGroup,
    ) -> Self {
        Self {
            input: input.into(),
            syntax,
            analysis,
            constraint,
        }
    }

    /// The input that was parsed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The lexical and syntax errors.
    pub fn syntax(&self) -> &ErrorGroup {
        &self.syntax
    }

    /// The errors from binding values onto the declared parameters.
    pub fn analysis(&self) -> &ErrorGroup {
        &self.analysis
    }

    /// The constraint rule violations.
    pub fn constraint(&self) -> &ErrorGroup {
        &self.constraint
    }

    /// The phase groups which carry errors, in pipeline order.
    pub fn groups(&self) -> Vec<&ErrorGroup> {
        [&self.syntax, &self.analysis, &self.constraint]
            .into_iter()
            .filter(|group| group.has_errors())
            .collect()
    }

    /// Whether any phase recorded an error.
    pub fn has_errors(&self) -> bool {
        !self.groups().is_empty()
    }

    /// Every message, in pipeline then document order.
    pub fn messages(&self) -> Vec<&ErrorMessage> {
        self.groups()
            .into_iter()
            .flat_map(ErrorGroup::messages)
            .collect()
    }

    /// The total number of messages.
    pub fn count(&self) -> usize {
        self.groups().iter().map(|group| group.count()).sum()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, group) in self.groups().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            write!(f, "{group}")?;
        }

        Ok(())
    }
}

/// The outcome of a successful parse.
/// By this point, every value has been written into its variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    tree: FlagTree,
    populated: BTreeMap<FlagPath, usize>,
}

impl Parsed {
    /// Whether the flag at `path` was populated.
    /// Paths resolve aliases, so `"-o > -x"` and `"--outer > --ex"` are equivalent.
    ///
    /// ### Example
    /// ```ignore
    /// assert!(parsed.is_set("--outer > -x"));
    /// ```
    pub fn is_set(&self, path: impl Into<FlagPath>) -> bool {
        match self.tree.canonical(&path.into()) {
            Some(canonical) => self.populated.contains_key(&canonical),
            None => false,
        }
    }

    /// The canonical path of every populated flag, with the position of its (latest) occurrence.
    pub fn populated(&self) -> &BTreeMap<FlagPath, usize> {
        &self.populated
    }
}

/// The configured command line parser.
/// Built via `CommandLineParser::build` or `CommandLineParser::build_parser`.
pub struct GeneralParser<'a> {
    program: String,
    about: Option<String>,
    context: Context<'a>,
    engine: ConstraintEngine,
    user_interface: Box<dyn UserInterface>,
}

impl<'a> GeneralParser<'a> {
    pub(crate) fn new(
        program: impl Into<String>,
        about: Option<String>,
        context: Context<'a>,
        engine: ConstraintEngine,
        user_interface: Box<dyn UserInterface>,
    ) -> Self {
        Self {
            program: program.into(),
            about,
            context,
            engine,
            user_interface,
        }
    }

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The program description.
    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    /// The help text of the flag (or positional) at `path`.
    pub fn description(&self, path: impl Into<FlagPath>) -> Option<&str> {
        self.context
            .documentation(&path.into())
            .and_then(|documentation| documentation.help.as_deref())
    }

    /// The meta (value hint) of the flag (or positional) at `path`.
    pub fn input_hint(&self, path: impl Into<FlagPath>) -> Option<&[String]> {
        self.context
            .documentation(&path.into())
            .and_then(|documentation| documentation.meta.as_deref())
    }

    /// Run the command line parser against the `input` string.
    ///
    /// Parsing runs every phase, collecting all the errors in one pass:
    /// 1. Scanning and parsing build the syntax tree, recovering from each syntax error.
    /// 2. Binding converts the values and writes them into your program variables.
    /// 3. The constraint rules are checked against the populated flags.
    ///
    /// Notice, variables may be partially written when an error is returned.
    pub fn parse_str(self, input: &str) -> Result<Parsed, Diagnostics> {
        let GeneralParser {
            mut context,
            engine,
            ..
        } = self;
        run(&mut context, &engine, input)
    }

    /// Run the command line parser against the input tokens.
    ///
    /// The tokens are joined into one input, quoting any token which would otherwise scan differently.
    /// If any error is found, it is printed and this returns with `Err(1)`.
    pub fn parse_tokens(self, tokens: &[&str]) -> Result<Parsed, i32> {
        let GeneralParser {
            mut context,
            engine,
            user_interface,
            ..
        } = self;
        let input = join(tokens);

        match run(&mut context, &engine, &input) {
            Ok(parsed) => Ok(parsed),
            Err(diagnostics) => {
                print_diagnostics(&diagnostics, &*user_interface);
                Err(1)
            }
        }
    }

    /// Run the command line parser against the Cli [`env::args`].
    ///
    /// If any error is found, it is printed and the program exits with error code `1` (via `std::process::exit`).
    pub fn parse(self) -> Parsed {
        let command_input: Vec<String> = env::args().skip(1).collect();

        match self.parse_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        ) {
            Ok(parsed) => parsed,
            Err(exit_code) => {
                std::process::exit(exit_code);
            }
        }
    }
}

fn run(context: &mut Context, engine: &ConstraintEngine, input: &str) -> Result<Parsed, Diagnostics> {
    let mut syntax = ErrorGroup::root(SYNTAX_GROUP);
    let tokens = scan(input, &mut syntax);
    let statement = parse(tokens, context, &mut syntax);
    check_positionals(&statement, context, &mut syntax);

    // The recovered tree is bound regardless of syntax errors, so that independent errors are all reported.
    let mut analysis = ErrorGroup::root(ANALYSIS_GROUP);
    bind(&statement, context, &mut analysis);
    context.finish();

    let mut constraint = ErrorGroup::root(CONSTRAINT_GROUP);
    let mut populated = BTreeMap::default();
    context.populated(&FlagPath::default(), &mut populated);
    engine.evaluate(&populated, &mut constraint);

    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Parsed {} nodes: {} syntax, {} analysis, {} constraint errors.",
            statement.count(),
            syntax.count(),
            analysis.count(),
            constraint.count()
        );
    }

    let diagnostics = Diagnostics::from_parts(input, syntax, analysis, constraint);

    if diagnostics.has_errors() {
        Err(diagnostics)
    } else {
        Ok(Parsed {
            tree: context.flag_tree(),
            populated,
        })
    }
}

// Join argv tokens, such that each one scans back to the same text.
fn join(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|token| quote(token))
        .collect::<Vec<String>>()
        .join(" ")
}

fn quote(token: &str) -> String {
    if token.is_empty() || token.contains(char::is_whitespace) || token.starts_with(['"', '\'']) {
        format!("\"{}\"", token.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        token.to_string()
    }
}
