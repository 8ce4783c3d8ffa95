/// The discriminator carried by every recorded diagnostic.
///
/// Which stage produced the diagnostic is given by the group it lives in (see [`Diagnostics`](crate::Diagnostics)),
/// so a few kinds (ex: `UnknownFlag`) legitimately appear under more than one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Validation (declaration time).
    /// Two flags or aliases of one scope collide.
    DuplicateFlag,
    /// A flag, alias or positional name is empty.
    EmptyFlag,
    /// A flag does not start with any of the scope's prefixes.
    InvalidPrefix,
    /// A flag cannot be scanned back as a single flag token (ex: it contains whitespace, or reads as a number).
    InvalidFlagName,
    /// A scope declares more than one multi-positional slot.
    MultiplePositionals,
    /// A constraint names a flag path that does not resolve.
    InvalidFlagPath,
    /// A flag depends on, or excludes, itself.
    SelfReference,
    /// The same flag is required twice.
    DuplicateRequirement,

    // Syntax (scanning & parsing).
    /// A string literal runs to the end of input.
    UnterminatedString,
    /// A string literal contains an unsupported escape.
    UnknownEscape,
    /// A flag expecting a value is not followed by one.
    MissingValue,
    /// A group flag is not followed by `[`.
    MissingLeftBracket,
    /// A group body runs to the end of input without `]`.
    MissingRightBracket,
    /// A `]` without a matching `[`.
    UnmatchedRightBracket,
    /// A flag-like token that names nothing in its scope.
    UnknownFlag,
    /// A token that cannot appear where it does (or too many positional values).
    UnexpectedToken,
    /// A second `--` within the same scope.
    MultipleDoubleDash,
    /// A positional value violates the scope's positional policy.
    PositionalOrder,

    // Analysis (binding).
    /// A flag is bound against the wrong kind of entity.
    IncorrectOptionType,
    /// A value text cannot be converted into the declared type.
    ConversionError,
    /// A multi-value flag receives more values than it allows.
    TooManyValues,
    /// A declared fixed positional receives no value.
    MissingPositional,

    // Constraint (after binding).
    /// A required flag is not populated.
    RequiredFlag,
    /// Two mutually exclusive flags are both populated.
    Exclusion,
    /// A flag is populated without its prerequisites.
    Dependency,
    /// A boolean condition does not hold.
    Condition,
}

/// Behaviour of every stage error that may be recorded into an [`ErrorGroup`](crate::ErrorGroup).
pub trait Diagnostic: std::fmt::Display {
    /// The discriminator for this diagnostic.
    fn kind(&self) -> ErrorKind;
}
