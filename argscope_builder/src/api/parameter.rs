use std::collections::BTreeMap;
use std::rc::Rc;

use crate::api::{CliArgument, CliOption, Convert, GenericCapturable, InvalidCapture};
use crate::context::{
    AnonymousCapturable, Context, ConvertFn, Declaration, Documentation, ResolvedConfig,
    ScopeConfig,
};
use crate::model::{Flag, Nargs};
use crate::prelude::Choices;

pub(crate) struct AnonymousCapture<'a, T: 'a> {
    field: Box<dyn GenericCapturable<'a, T> + 'a>,
    converter: Option<ConvertFn<T>>,
    choices: BTreeMap<String, String>,
}

impl<'a, T> AnonymousCapture<'a, T> {
    pub(crate) fn bind(field: impl GenericCapturable<'a, T> + 'a) -> Self {
        Self {
            field: Box::new(field),
            converter: None,
            choices: BTreeMap::default(),
        }
    }
}

impl<'a, T: Convert + 'static> AnonymousCapturable for AnonymousCapture<'a, T> {
    fn begin(&mut self) {
        self.field.begin();
    }

    fn capture(&mut self, value: &str, config: &ResolvedConfig) -> Result<(), InvalidCapture> {
        if !self.choices.is_empty() && !self.choices.contains_key(value) {
            return Err(InvalidCapture::InvalidChoice {
                token: value.to_string(),
                choices: self
                    .choices
                    .keys()
                    .map(|choice| format!("'{choice}'"))
                    .collect::<Vec<String>>()
                    .join(", "),
            });
        }

        // Priority: the parameter's converter, the scope's converter for `T`, the built-in conversion.
        let converted = match self.converter.as_ref().or_else(|| config.converter::<T>()) {
            Some(converter) => converter(value).map_err(|message| InvalidCapture::Custom {
                token: value.to_string(),
                message,
            })?,
            None => T::convert(value, config)?,
        };
        self.field.capture(converted);
        Ok(())
    }

    fn finish(&mut self) {
        self.field.finish();
    }

    fn implicit(&self) -> Option<&'static str> {
        T::implicit()
    }

    fn nargs(&self) -> Option<Nargs> {
        self.field.nargs()
    }

    fn required(&self) -> bool {
        self.field.required()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ParameterClass {
    Opt(Flag),
    Arg(String),
}

pub(super) struct ParameterInner<'a, T> {
    class: ParameterClass,
    field: AnonymousCapture<'a, T>,
    documentation: Documentation,
}

impl<'a, T> std::fmt::Debug for ParameterInner<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (class, name) = match &self.class {
            ParameterClass::Opt(flag) => ("Opt", flag.names().collect::<Vec<&str>>().join(", ")),
            ParameterClass::Arg(name) => ("Arg", name.clone()),
        };
        let nargs = match self.field.field.nargs() {
            Some(nargs) => format!(", {nargs}"),
            None => "".to_string(),
        };
        let help = match &self.documentation.help {
            Some(d) => format!(", {d}"),
            None => "".to_string(),
        };

        write!(
            f,
            "{class}[{t}{nargs}, {name}{help}]",
            t = std::any::type_name::<T>(),
        )
    }
}

impl<'a, T: Convert + 'static> From<ParameterInner<'a, T>> for Declaration<'a> {
    fn from(value: ParameterInner<'a, T>) -> Self {
        let ParameterInner {
            class,
            field,
            documentation,
        } = value;

        match class {
            ParameterClass::Opt(flag) => Declaration::Option {
                flag,
                documentation,
                capture: Box::new(field),
            },
            ParameterClass::Arg(name) => Declaration::Positional {
                name,
                documentation,
                capture: Box::new(field),
            },
        }
    }
}

/// An argument/option for the command parser.
/// Used with [`CommandLineParser::add`](./struct.CommandLineParser.html#method.add) and [`Group::add`].
pub struct Parameter<'a, T>(ParameterInner<'a, T>);

impl<'a, T: Convert + 'static> Parameter<'a, T> {
    /// Create an option parameter.
    /// The `flag` must start with one of the enclosing scope's prefixes (by default, `-` or `--`).
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{Parameter, Scalar};
    ///
    /// let mut verbose: bool = false;
    /// Parameter::option(Scalar::new(&mut verbose), "--verbose");
    /// ```
    pub fn option(
        field: impl GenericCapturable<'a, T> + CliOption + 'a,
        flag: impl Into<String>,
    ) -> Self {
        Self(ParameterInner {
            class: ParameterClass::Opt(Flag::new(flag)),
            field: AnonymousCapture::bind(field),
            documentation: Documentation::default(),
        })
    }

    /// Create an argument (positional) parameter.
    ///
    /// The order of argument parameters corresponds to their positional order during parsing.
    /// A [`Collection`](crate::Collection) field declares the scope's multi-positional, which receives every positional value past the single value arguments.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{Parameter, Scalar};
    ///
    /// let mut path: String = String::default();
    /// Parameter::argument(Scalar::new(&mut path), "path");
    /// ```
    pub fn argument(
        field: impl GenericCapturable<'a, T> + CliArgument + 'a,
        name: impl Into<String>,
    ) -> Self {
        Self(ParameterInner {
            class: ParameterClass::Arg(name.into()),
            field: AnonymousCapture::bind(field),
            documentation: Documentation::default(),
        })
    }

    /// Add an alias to this option parameter.
    /// Has no effect on argument parameters.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{Parameter, Scalar};
    ///
    /// let mut verbose: bool = false;
    /// Parameter::option(Scalar::new(&mut verbose), "--verbose")
    ///     .alias("-v");
    /// ```
    pub fn alias(self, alias: impl Into<String>) -> Self {
        let mut inner = self.0;
        inner.class = match inner.class {
            ParameterClass::Opt(flag) => ParameterClass::Opt(flag.alias(alias)),
            class => class,
        };
        Self(inner)
    }

    /// Document the help message for this parameter.
    /// If repeated, only the final message will apply to the parameter.
    ///
    /// See also:
    /// * [`Parameter::meta`]
    /// * [`Parameter::choice`]
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{Parameter, Scalar};
    ///
    /// let mut verbose: bool = false;
    /// Parameter::option(Scalar::new(&mut verbose), "--verbose")
    ///     .help("--this will get discarded--")
    ///     .help("Make the program output verbose.");
    /// ```
    pub fn help(self, description: impl Into<String>) -> Self {
        let mut inner = self.0;
        inner.documentation.help.replace(description.into());
        Self(inner)
    }

    /// Document the meta message(s) (input hints) for this parameter.
    /// If repeated, only the final message will apply to the parameter.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{Parameter, Scalar};
    ///
    /// let mut port: u16 = 0;
    /// Parameter::option(Scalar::new(&mut port), "--port")
    ///     .meta(vec!["PORT", "1024 and up"]);
    /// ```
    pub fn meta(self, descriptions: Vec<impl Into<String>>) -> Self {
        let mut inner = self.0;
        inner
            .documentation
            .meta
            .replace(descriptions.into_iter().map(|s| s.into()).collect());
        Self(inner)
    }

    /// Set the conversion function for this parameter.
    /// Takes precedence over both the scope's converter for `T`, and the built-in conversion.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{Parameter, Scalar};
    ///
    /// let mut level: u8 = 0;
    /// Parameter::option(Scalar::new(&mut level), "--level")
    ///     .converter(|text| match text {
    ///         "low" => Ok(1),
    ///         "high" => Ok(9),
    ///         _ => Err("expected 'low' or 'high'".to_string()),
    ///     });
    /// ```
    pub fn converter(self, converter: impl Fn(&str) -> Result<T, String> + 'static) -> Self {
        let mut inner = self.0;
        let converter: ConvertFn<T> = Rc::new(converter);
        inner.field.converter.replace(converter);
        Self(inner)
    }

    pub(super) fn consume(self) -> ParameterInner<'a, T> {
        self.0
    }
}

impl<'a, T: Convert + std::fmt::Display + 'static> Choices<T> for Parameter<'a, T> {
    /// Declare a choice for this parameter, with its help message.
    /// If repeated for the same `variant` of `T`, only the final message will apply to the parameter.
    ///
    /// Once any choice is declared, values outside of the choices are rejected.
    /// A value is matched against the choices by its text, so each variant's `Display` must match the text the user types.
    ///
    /// ### Example
    /// ```
    /// # use argscope_builder as argscope;
    /// use argscope::{prelude::*, Parameter, Scalar};
    ///
    /// let mut door: u32 = 0;
    /// Parameter::argument(Scalar::new(&mut door), "door")
    ///     .choice(1, "--this will get discarded--")
    ///     .choice(1, "Enter door #1.")
    ///     .choice(2, "Enter door #2.");
    /// ```
    fn choice(self, variant: T, description: impl Into<String>) -> Self {
        let mut inner = self.0;
        inner
            .field
            .choices
            .insert(variant.to_string(), description.into());
        Self(inner)
    }
}

/// A named option group: a nested scope, written on the command line as `--group [ ... ]`.
/// Used with [`CommandLineParser::group`](./struct.CommandLineParser.html#method.group) and [`Group::group`].
///
/// Groups carry their own [`ScopeConfig`]; anything left unset inherits from the enclosing scope.
///
/// ### Example
/// ```
/// # use argscope_builder as argscope;
/// use argscope::{CommandLineParser, Group, Parameter, Scalar};
///
/// let mut outer: u32 = 0;
/// let mut inner: u32 = 0;
/// let parser = CommandLineParser::new("program")
///     .add(Parameter::option(Scalar::new(&mut outer), "-x"))
///     .group(Group::new("--g").add(Parameter::option(Scalar::new(&mut inner), "-x")))
///     .build();
///
/// parser.parse_tokens(vec!["-x", "10", "--g", "[", "-x", "20", "]"].as_slice()).unwrap();
///
/// assert_eq!(outer, 10);
/// assert_eq!(inner, 20);
/// ```
pub struct Group<'a> {
    flag: Flag,
    documentation: Documentation,
    scope: Context<'a>,
}

impl<'a> Group<'a> {
    /// Create a group.
    pub fn new(flag: impl Into<String>) -> Self {
        Self {
            flag: Flag::new(flag),
            documentation: Documentation::default(),
            scope: Context::default(),
        }
    }

    /// Add an alias to this group.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.flag = self.flag.alias(alias);
        self
    }

    /// Document the help message for this group.
    /// If repeated, only the final message will apply to the group.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.documentation.help.replace(description.into());
        self
    }

    /// Configure the scope of this group.
    /// If repeated, only the final configuration will apply to the group.
    pub fn config(mut self, config: ScopeConfig) -> Self {
        self.scope.set_config(config);
        self
    }

    /// Add an argument/option to this group.
    pub fn add<T: Convert + 'static>(mut self, parameter: Parameter<'a, T>) -> Self {
        self.scope.declare(Declaration::from(parameter.consume()));
        self
    }

    /// Nest a group within this group.
    pub fn group(mut self, group: Group<'a>) -> Self {
        self.scope.declare(Declaration::from(group));
        self
    }
}

impl<'a> From<Group<'a>> for Declaration<'a> {
    fn from(value: Group<'a>) -> Self {
        let Group {
            flag,
            documentation,
            scope,
        } = value;
        Declaration::Group {
            flag,
            documentation,
            scope,
        }
    }
}
