use std::collections::BTreeSet;

use crate::model::FlagPath;

/// A boolean predicate over which flags are populated once binding completes.
///
/// Conditions are built from the leaf predicates [`present`], [`absent`], [`exactly`], [`at_least`] and [`at_most`],
/// then combined with [`Condition::and`], [`Condition::or`] and `!` (negation).
/// Evaluation short-circuits, left to right.
///
/// ### Example
/// ```
/// # use argscope_builder as argscope;
/// use argscope::{at_most, present};
///
/// let condition = present("--output").and(!present("--dry-run")).or(at_most(0, ["-x", "-y"]));
/// assert_eq!(
///     condition.to_string(),
///     "((present(--output) AND NOT present(--dry-run)) OR at_most(0, -x, -y))"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The flag is populated.
    Present(FlagPath),
    /// The flag is not populated.
    Absent(FlagPath),
    /// Precisely `n` of the flags are populated.
    Exactly(usize, Vec<FlagPath>),
    /// At least `n` of the flags are populated.
    AtLeast(usize, Vec<FlagPath>),
    /// At most `n` of the flags are populated.
    AtMost(usize, Vec<FlagPath>),
    /// Both conditions hold.
    And(Box<Condition>, Box<Condition>),
    /// Either condition holds.
    Or(Box<Condition>, Box<Condition>),
    /// The condition does not hold.
    Not(Box<Condition>),
}

/// The condition that `path` is populated.
pub fn present(path: impl Into<FlagPath>) -> Condition {
    Condition::Present(path.into())
}

/// The condition that `path` is not populated.
pub fn absent(path: impl Into<FlagPath>) -> Condition {
    Condition::Absent(path.into())
}

/// The condition that precisely `n` of the `paths` are populated.
pub fn exactly<P: Into<FlagPath>>(n: usize, paths: impl IntoIterator<Item = P>) -> Condition {
    Condition::Exactly(n, paths.into_iter().map(Into::into).collect())
}

/// The condition that at least `n` of the `paths` are populated.
pub fn at_least<P: Into<FlagPath>>(n: usize, paths: impl IntoIterator<Item = P>) -> Condition {
    Condition::AtLeast(n, paths.into_iter().map(Into::into).collect())
}

/// The condition that at most `n` of the `paths` are populated.
pub fn at_most<P: Into<FlagPath>>(n: usize, paths: impl IntoIterator<Item = P>) -> Condition {
    Condition::AtMost(n, paths.into_iter().map(Into::into).collect())
}

impl Condition {
    /// Both `self` and `other` must hold.
    pub fn and(self, other: Condition) -> Condition {
        Condition::And(Box::new(self), Box::new(other))
    }

    /// Either `self` or `other` must hold.
    pub fn or(self, other: Condition) -> Condition {
        Condition::Or(Box::new(self), Box::new(other))
    }

    pub(crate) fn evaluate(&self, populated: &BTreeSet<&FlagPath>) -> bool {
        let count = |paths: &[FlagPath]| {
            paths
                .iter()
                .filter(|path| populated.contains(path))
                .count()
        };

        match self {
            Condition::Present(path) => populated.contains(path),
            Condition::Absent(path) => !populated.contains(path),
            Condition::Exactly(n, paths) => count(paths) == *n,
            Condition::AtLeast(n, paths) => count(paths) >= *n,
            Condition::AtMost(n, paths) => count(paths) <= *n,
            Condition::And(left, right) => left.evaluate(populated) && right.evaluate(populated),
            Condition::Or(left, right) => left.evaluate(populated) || right.evaluate(populated),
            Condition::Not(inner) => !inner.evaluate(populated),
        }
    }

    /// Rewrite every path of this condition through `f`.
    pub(crate) fn map_paths(self, f: &mut impl FnMut(FlagPath) -> FlagPath) -> Condition {
        let mut all = |paths: Vec<FlagPath>| -> Vec<FlagPath> { paths.into_iter().map(&mut *f).collect() };

        match self {
            Condition::Present(path) => Condition::Present(f(path)),
            Condition::Absent(path) => Condition::Absent(f(path)),
            Condition::Exactly(n, paths) => Condition::Exactly(n, all(paths)),
            Condition::AtLeast(n, paths) => Condition::AtLeast(n, all(paths)),
            Condition::AtMost(n, paths) => Condition::AtMost(n, all(paths)),
            Condition::And(left, right) => left.map_paths(f).and(right.map_paths(f)),
            Condition::Or(left, right) => left.map_paths(f).or(right.map_paths(f)),
            Condition::Not(inner) => !inner.map_paths(f),
        }
    }
}

impl std::ops::Not for Condition {
    type Output = Condition;

    fn not(self) -> Self::Output {
        Condition::Not(Box::new(self))
    }
}

fn join(paths: &[FlagPath]) -> String {
    paths
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Present(path) => write!(f, "present({path})"),
            Condition::Absent(path) => write!(f, "absent({path})"),
            Condition::Exactly(n, paths) => write!(f, "exactly({n}, {})", join(paths)),
            Condition::AtLeast(n, paths) => write!(f, "at_least({n}, {})", join(paths)),
            Condition::AtMost(n, paths) => write!(f, "at_most({n}, {})", join(paths)),
            Condition::And(left, right) => write!(f, "({left} AND {right})"),
            Condition::Or(left, right) => write!(f, "({left} OR {right})"),
            Condition::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RuleKind {
    Requirement(FlagPath),
    Exclusion(FlagPath, FlagPath),
    Dependency(FlagPath, Vec<FlagPath>),
    Condition {
        when: Option<Condition>,
        require: Condition,
    },
}

impl RuleKind {
    fn map_paths(self, f: &mut impl FnMut(FlagPath) -> FlagPath) -> RuleKind {
        match self {
            RuleKind::Requirement(path) => RuleKind::Requirement(f(path)),
            RuleKind::Exclusion(first, second) => {
                let first = f(first);
                RuleKind::Exclusion(first, f(second))
            }
            RuleKind::Dependency(dependent, prerequisites) => {
                let dependent = f(dependent);
                RuleKind::Dependency(dependent, prerequisites.into_iter().map(&mut *f).collect())
            }
            RuleKind::Condition { when, require } => RuleKind::Condition {
                when: when.map(|when| when.map_paths(f)),
                require: require.map_paths(f),
            },
        }
    }
}

/// A cross-flag constraint, checked once binding completes.
/// Used with [`CommandLineParser::rule`](./struct.CommandLineParser.html#method.rule).
///
/// Flag paths are group qualified (ex: `"--net > --port"`), and may use any alias at any level.
/// Every path is resolved while building the parser; a path that does not resolve is a configuration error.
///
/// ### Example
/// ```
/// # use argscope_builder as argscope;
/// use argscope::{present, Rule};
///
/// Rule::requirement("--input");
/// Rule::exclusion("--quiet", "--verbose").message("Pick one of quiet or verbose.");
/// Rule::dependency("--port", ["--host"]);
/// Rule::when(present("--output")).require(!present("--dry-run"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

/// The precondition of a conditional [`Rule`].
/// Completed via [`When::require`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct When(Condition);

impl When {
    /// The condition which must hold whenever the precondition holds.
    pub fn require(self, condition: Condition) -> Rule {
        Rule::new(RuleKind::Condition {
            when: Some(self.0),
            require: condition,
        })
    }
}

impl Rule {
    fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// The flag must be populated.
    pub fn requirement(path: impl Into<FlagPath>) -> Self {
        Rule::new(RuleKind::Requirement(path.into()))
    }

    /// The two flags must not both be populated.
    pub fn exclusion(first: impl Into<FlagPath>, second: impl Into<FlagPath>) -> Self {
        Rule::new(RuleKind::Exclusion(first.into(), second.into()))
    }

    /// When `dependent` is populated, every one of the `prerequisites` must be populated too.
    pub fn dependency<P: Into<FlagPath>>(
        dependent: impl Into<FlagPath>,
        prerequisites: impl IntoIterator<Item = P>,
    ) -> Self {
        Rule::new(RuleKind::Dependency(
            dependent.into(),
            prerequisites.into_iter().map(Into::into).collect(),
        ))
    }

    /// The condition must always hold.
    pub fn require(condition: Condition) -> Self {
        Rule::new(RuleKind::Condition {
            when: None,
            require: condition,
        })
    }

    /// Start a conditional rule: only when `condition` holds is the required condition checked.
    pub fn when(condition: Condition) -> When {
        When(condition)
    }

    /// Replace the generated message of this rule.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message.replace(message.into());
        self
    }

    pub(crate) fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub(crate) fn custom_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub(crate) fn map_paths(self, f: &mut impl FnMut(FlagPath) -> FlagPath) -> Rule {
        let Rule { kind, message } = self;
        Rule {
            kind: kind.map_paths(f),
            message,
        }
    }
}
