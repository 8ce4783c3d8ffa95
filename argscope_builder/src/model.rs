use std::collections::BTreeSet;

/// The cardinality of values to accept for a multi-value option or the multi-positional slot.
///
/// An empty value list is always a syntax error, so every variant requires at least one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `+`: At least one value must be specified, without an upper limit.
    AtLeastOne,
    /// At least one value, but no more than `N`.
    AtMost(usize),
}

impl Nargs {
    pub(crate) fn maximum(&self) -> Option<usize> {
        match self {
            Nargs::AtLeastOne => None,
            Nargs::AtMost(n) => Some(*n),
        }
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How a `char` typed value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharMode {
    /// The value is a literal single character (ex: `-c x`).
    ExpectAscii,
    /// The value is a numeric literal for the character code (ex: `-c 0x78`).
    ExpectInteger,
}

/// The rule governing where positional values may appear relative to flags within one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionalPolicy {
    /// Positionals and flags may be freely mixed.
    Interleaved,
    /// All positionals must textually precede all flags of the scope.
    BeforeFlags,
    /// All positionals must textually follow all flags of the scope.
    AfterFlags,
}

impl std::fmt::Display for PositionalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionalPolicy::Interleaved => write!(f, "interleaved"),
            PositionalPolicy::BeforeFlags => write!(f, "before flags"),
            PositionalPolicy::AfterFlags => write!(f, "after flags"),
        }
    }
}

/// A declared flag: the main name plus its aliases.
///
/// Two flags are the same when their name sets intersect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    main: String,
    aliases: BTreeSet<String>,
}

impl Flag {
    /// Create a flag without any aliases.
    pub fn new(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            aliases: BTreeSet::default(),
        }
    }

    /// Add an alias to this flag.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    /// The main name of this flag.
    pub fn main(&self) -> &str {
        &self.main
    }

    /// Every name this flag answers to: the main name first, then the aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.main.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `name` is the main name or one of the aliases.
    pub fn contains(&self, name: &str) -> bool {
        self.main == name || self.aliases.contains(name)
    }

    /// Whether this flag shares any name with `other`.
    pub fn overlaps(&self, other: &Flag) -> bool {
        other.names().any(|name| self.contains(name))
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.main)
    }
}

/// A group-qualified reference to a flag: the chain of group names, followed by the terminal flag name.
///
/// Any segment may use an alias; resolution treats aliases transparently.
///
/// ### Example
/// ```
/// # use argscope_builder as argscope;
/// use argscope::FlagPath;
///
/// let path = FlagPath::from("--outer > --inner > -x");
/// assert_eq!(path.segments(), &["--outer", "--inner", "-x"]);
/// assert_eq!(path.to_string(), "--outer > --inner > -x");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlagPath {
    segments: Vec<String>,
}

pub(crate) const PATH_SEPARATOR: &str = " > ";

impl FlagPath {
    /// Create a flag path from its segments (outer-most group first, terminal flag last).
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The terminal flag name (empty for an empty path).
    pub fn terminal(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub(crate) fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for FlagPath {
    fn from(value: &str) -> Self {
        FlagPath::new(
            value
                .split('>')
                .map(str::trim)
                .filter(|segment| !segment.is_empty()),
        )
    }
}

impl From<String> for FlagPath {
    fn from(value: String) -> Self {
        FlagPath::from(value.as_str())
    }
}

impl std::fmt::Display for FlagPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join(PATH_SEPARATOR))
    }
}
