use crate::api::{Convert, Group, Parameter};
use crate::constant::VALIDATION_GROUP;
use crate::constraint::{ConstraintEngine, Rule};
use crate::context::{Context, Declaration, ResolvedConfig, ScopeConfig};
use crate::error::ErrorGroup;
use crate::model::FlagPath;
use crate::runtime::{ConfigError, ConsoleInterface, GeneralParser, UserInterface};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The base command line parser.
///
/// ### Example
/// ```
/// # use argscope_builder as argscope;
/// use argscope::{CommandLineParser};
///
/// let parser = CommandLineParser::new("program")
///     // Configure with CommandLineParser::add, CommandLineParser::group, and CommandLineParser::rule.
///     .build();
/// parser.parse_tokens(empty::slice()).unwrap();
/// ```
pub struct CommandLineParser<'a> {
    program: String,
    about: Option<String>,
    context: Context<'a>,
    rules: Vec<Rule>,
}

impl<'a> CommandLineParser<'a> {
    /// Create a command line parser.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::CommandLineParser;
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .build();
    ///
    /// parser.parse_tokens(vec![].as_slice()).unwrap();
    /// ```
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            context: Context::default(),
            rules: Vec::default(),
        }
    }

    /// Document the about message for this command line parser.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Configure the root scope.
    /// Groups inherit every setting they do not configure themselves.
    /// If repeated, only the final configuration will apply.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{CommandLineParser, Parameter, PositionalPolicy, Scalar, ScopeConfig};
    ///
    /// let mut value: u32 = 0;
    /// let mut verbose: bool = false;
    /// let parser = CommandLineParser::new("program")
    ///     .config(ScopeConfig::default().positional_policy(PositionalPolicy::AfterFlags))
    ///     .add(Parameter::option(Scalar::new(&mut verbose), "-v"))
    ///     .add(Parameter::argument(Scalar::new(&mut value), "value"))
    ///     .build();
    ///
    /// parser.parse_tokens(vec!["-v", "true", "1"].as_slice()).unwrap();
    ///
    /// assert!(verbose);
    /// assert_eq!(value, 1);
    /// ```
    pub fn config(mut self, config: ScopeConfig) -> Self {
        self.context.set_config(config);
        self
    }

    /// Add an argument/option to the command line parser.
    ///
    /// The order of argument parameters corresponds to their positional order during parsing.
    /// The order of option parameters does not affect the command parser semantics.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{CommandLineParser, Parameter, Scalar};
    ///
    /// let mut a: u32 = 0;
    /// let mut b: u32 = 0;
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::argument(Scalar::new(&mut a), "a"))
    ///     .add(Parameter::argument(Scalar::new(&mut b), "b"))
    ///     .build();
    ///
    /// parser.parse_tokens(vec!["1", "2"].as_slice()).unwrap();
    ///
    /// assert_eq!(a, 1);
    /// assert_eq!(b, 2);
    /// ```
    pub fn add<T: Convert + 'static>(mut self, parameter: Parameter<'a, T>) -> Self {
        self.context
            .declare(Declaration::from(parameter.consume()));
        self
    }

    /// Add an option group to the command line parser.
    /// On the command line, a group's parameters are given within brackets: `--group [ ... ]`.
    pub fn group(mut self, group: Group<'a>) -> Self {
        self.context.declare(Declaration::from(group));
        self
    }

    /// Add a constraint rule, checked once every value has been bound.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{CommandLineParser, Parameter, Rule, Scalar};
    ///
    /// let mut a: u32 = 0;
    /// let mut b: u32 = 0;
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::option(Scalar::new(&mut a), "-a"))
    ///     .add(Parameter::option(Scalar::new(&mut b), "-b"))
    ///     .rule(Rule::exclusion("-a", "-b"))
    ///     .build();
    ///
    /// assert!(parser.parse_str("-a 1 -b 2").is_err());
    /// ```
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub(crate) fn build_with_interface(
        self,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<GeneralParser<'a>, ConfigError> {
        let CommandLineParser {
            program,
            about,
            mut context,
            rules,
        } = self;
        context.resolve_config(&ResolvedConfig::default());

        let mut errors = ErrorGroup::root(VALIDATION_GROUP);
        context.validate(&FlagPath::default(), &mut errors);
        let engine = ConstraintEngine::new(rules, &context, &mut errors);

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Built parser '{program}': {} validation errors.", errors.count());
        }

        if errors.has_errors() {
            return Err(ConfigError::new(errors));
        }

        Ok(GeneralParser::new(
            program,
            about,
            context,
            engine,
            user_interface,
        ))
    }

    /// Build the command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated flag, or a rule naming an unknown flag).
    pub fn build_parser(self) -> Result<GeneralParser<'a>, ConfigError> {
        self.build_with_interface(Box::new(ConsoleInterface::terminal()))
    }

    /// Build the command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated flag, or a rule naming an unknown flag).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> GeneralParser<'a> {
        match self.build_parser() {
            Ok(gp) => gp,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}
