use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::context::{Context, ValidationError};
use crate::error::{Diagnostic, ErrorGroup, ErrorKind};
use crate::model::FlagPath;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

mod rule;

pub use rule::*;

/// Rule violations, detected once binding completes.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConstraintError {
    #[error("Flag '{path}' is required.")]
    RequiredFlag { path: String },

    #[error("Flags '{first}' and '{second}' cannot be used together.")]
    Exclusion { first: String, second: String },

    #[error("Flag '{dependent}' requires: {missing}.")]
    Dependency { dependent: String, missing: String },

    #[error("Condition not satisfied: {description}.")]
    Condition { description: String },

    #[error("{message}")]
    Custom { kind: ErrorKind, message: String },
}

impl Diagnostic for ConstraintError {
    fn kind(&self) -> ErrorKind {
        match self {
            ConstraintError::RequiredFlag { .. } => ErrorKind::RequiredFlag,
            ConstraintError::Exclusion { .. } => ErrorKind::Exclusion,
            ConstraintError::Dependency { .. } => ErrorKind::Dependency,
            ConstraintError::Condition { .. } => ErrorKind::Condition,
            ConstraintError::Custom { kind, .. } => *kind,
        }
    }
}

/// The validated rule set of one parser.
/// Every path held here is canonical (main flag names only).
#[derive(Debug, Default)]
pub(crate) struct ConstraintEngine {
    requirements: Vec<Rule>,
    exclusions: Vec<Rule>,
    dependencies: Vec<Rule>,
    conditions: Vec<Rule>,
}

impl ConstraintEngine {
    /// Resolve and validate the `rules` against the `context`, recording each setup problem into `errors`.
    /// A rule with a problem is left out of the engine.
    pub(crate) fn new(rules: Vec<Rule>, context: &Context, errors: &mut ErrorGroup) -> Self {
        let mut engine = ConstraintEngine::default();
        let mut required: BTreeSet<FlagPath> = BTreeSet::default();

        for rule in rules {
            let mut invalid: Vec<String> = Vec::default();
            let rule = rule.map_paths(&mut |path| match context.lookup_by_path(&path) {
                Ok((canonical, _)) => canonical,
                Err(_) => {
                    invalid.push(path.to_string());
                    path
                }
            });

            if !invalid.is_empty() {
                for path in invalid {
                    errors.add(0, &ValidationError::InvalidFlagPath { path });
                }
                continue;
            }

            match rule.kind() {
                RuleKind::Requirement(path) => {
                    if !required.insert(path.clone()) {
                        errors.add(
                            0,
                            &ValidationError::DuplicateRequirement {
                                path: path.to_string(),
                            },
                        );
                        continue;
                    }
                    engine.requirements.push(rule);
                }
                RuleKind::Exclusion(first, second) => {
                    if first == second {
                        errors.add(
                            0,
                            &ValidationError::SelfReference {
                                path: first.to_string(),
                            },
                        );
                        continue;
                    }
                    engine.exclusions.push(rule);
                }
                RuleKind::Dependency(dependent, prerequisites) => {
                    if prerequisites.contains(dependent) {
                        errors.add(
                            0,
                            &ValidationError::SelfReference {
                                path: dependent.to_string(),
                            },
                        );
                        continue;
                    }
                    engine.dependencies.push(rule);
                }
                RuleKind::Condition { .. } => engine.conditions.push(rule),
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Constraint engine: {} requirements, {} exclusions, {} dependencies, {} conditions.",
                engine.requirements.len(),
                engine.exclusions.len(),
                engine.dependencies.len(),
                engine.conditions.len()
            );
        }

        engine
    }

    /// Check every rule against the `populated` flags (canonical path to its latest position).
    /// Order: requirements, exclusions, dependencies, then conditions.
    pub(crate) fn evaluate(&self, populated: &BTreeMap<FlagPath, usize>, errors: &mut ErrorGroup) {
        let present: BTreeSet<&FlagPath> = populated.keys().collect();
        let mut report = |rule: &Rule, position: usize, error: ConstraintError| match rule
            .custom_message()
        {
            Some(message) => errors.add(
                position,
                &ConstraintError::Custom {
                    kind: error.kind(),
                    message: message.to_string(),
                },
            ),
            None => errors.add(position, &error),
        };

        for rule in &self.requirements {
            if let RuleKind::Requirement(path) = rule.kind() {
                if !present.contains(path) {
                    report(
                        rule,
                        0,
                        ConstraintError::RequiredFlag {
                            path: path.to_string(),
                        },
                    );
                }
            }
        }

        for rule in &self.exclusions {
            if let RuleKind::Exclusion(first, second) = rule.kind() {
                if let (Some(a), Some(b)) = (populated.get(first), populated.get(second)) {
                    report(
                        rule,
                        *a.max(b),
                        ConstraintError::Exclusion {
                            first: first.to_string(),
                            second: second.to_string(),
                        },
                    );
                }
            }
        }

        for rule in &self.dependencies {
            if let RuleKind::Dependency(dependent, prerequisites) = rule.kind() {
                if let Some(position) = populated.get(dependent) {
                    let missing: Vec<String> = prerequisites
                        .iter()
                        .filter(|prerequisite| !present.contains(prerequisite))
                        .map(|prerequisite| format!("'{prerequisite}'"))
                        .collect();

                    if !missing.is_empty() {
                        report(
                            rule,
                            *position,
                            ConstraintError::Dependency {
                                dependent: dependent.to_string(),
                                missing: missing.join(", "),
                            },
                        );
                    }
                }
            }
        }

        for rule in &self.conditions {
            if let RuleKind::Condition { when, require } = rule.kind() {
                let gated = when
                    .as_ref()
                    .map(|when| when.evaluate(&present))
                    .unwrap_or(true);

                if gated && !require.evaluate(&present) {
                    let description = match when {
                        Some(when) => format!("when {when}, require {require}"),
                        None => require.to_string(),
                    };
                    report(rule, 0, ConstraintError::Condition { description });
                }
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Constraints evaluated over {} populated flags: {} violations.",
                populated.len(),
                errors.count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::entity::test::Recorder;
    use crate::context::{Declaration, Documentation, ResolvedConfig};
    use crate::model::Flag;
    use rstest::rstest;

    fn option(flag: Flag) -> Declaration<'static> {
        Declaration::Option {
            flag,
            documentation: Documentation::default(),
            capture: Box::new(Recorder::default()),
        }
    }

    fn context() -> Context<'static> {
        let mut inner = Context::default();
        inner.declare(option(Flag::new("--flag").alias("-f")));
        let mut root = Context::default();
        root.declare(option(Flag::new("-a").alias("--alpha")));
        root.declare(option(Flag::new("-b")));
        root.declare(option(Flag::new("-c")));
        root.declare(Declaration::Group {
            flag: Flag::new("--group").alias("-g"),
            documentation: Documentation::default(),
            scope: inner,
        });
        root.resolve_config(&ResolvedConfig::default());
        root
    }

    fn engine(rules: Vec<Rule>) -> ConstraintEngine {
        let mut errors = ErrorGroup::root("Validation");
        let engine = ConstraintEngine::new(rules, &context(), &mut errors);
        assert!(!errors.has_errors(), "{errors}");
        engine
    }

    fn populated(flags: &[(&str, usize)]) -> BTreeMap<FlagPath, usize> {
        flags
            .iter()
            .map(|(path, position)| (FlagPath::from(*path), *position))
            .collect()
    }

    fn evaluate(rules: Vec<Rule>, flags: &[(&str, usize)]) -> ErrorGroup {
        let mut errors = ErrorGroup::root("Constraint");
        engine(rules).evaluate(&populated(flags), &mut errors);
        errors
    }

    fn texts(errors: &ErrorGroup) -> Vec<&str> {
        errors.messages().iter().map(|m| m.text()).collect()
    }

    #[rstest]
    #[case(Rule::requirement("-z"), "Invalid flag path '-z'.")]
    #[case(Rule::requirement("--group > -a"), "Invalid flag path '--group > -a'.")]
    #[case(Rule::requirement("-a > --flag"), "Invalid flag path '-a > --flag'.")]
    #[case(Rule::requirement(""), "Invalid flag path ''.")]
    #[case(Rule::exclusion("-a", "--alpha"), "Flag '-a' cannot depend on, or exclude, itself.")]
    #[case(Rule::dependency("-g > -f", ["-b", "--group > --flag"]), "Flag '--group > --flag' cannot depend on, or exclude, itself.")]
    #[case(Rule::require(present("-a").and(absent("-q"))), "Invalid flag path '-q'.")]
    fn setup_errors(#[case] rule: Rule, #[case] expected: &str) {
        // Setup
        let mut errors = ErrorGroup::root("Validation");

        // Execute
        let engine = ConstraintEngine::new(vec![rule], &context(), &mut errors);

        // Verify
        assert_eq!(texts(&errors), vec![expected]);
        assert!(engine.requirements.is_empty());
        assert!(engine.exclusions.is_empty());
        assert!(engine.dependencies.is_empty());
        assert!(engine.conditions.is_empty());
    }

    #[test]
    fn duplicate_requirement() {
        let mut errors = ErrorGroup::root("Validation");
        let engine = ConstraintEngine::new(
            vec![Rule::requirement("-a"), Rule::requirement("--alpha")],
            &context(),
            &mut errors,
        );

        assert_eq!(texts(&errors), vec!["Flag '-a' is required more than once."]);
        assert_eq!(errors.messages()[0].kind(), ErrorKind::DuplicateRequirement);
        assert_eq!(engine.requirements.len(), 1);
    }

    #[test]
    fn paths_are_canonical() {
        let engine = engine(vec![Rule::requirement("-g > -f")]);
        assert_eq!(
            engine.requirements[0].kind(),
            &RuleKind::Requirement(FlagPath::from("--group > --flag"))
        );
    }

    #[rstest]
    #[case(&[], vec!["Flag '-a' is required."])]
    #[case(&[("-a", 3)], vec![])]
    fn requirement(#[case] flags: &[(&str, usize)], #[case] expected: Vec<&str>) {
        let errors = evaluate(vec![Rule::requirement("--alpha")], flags);
        assert_eq!(texts(&errors), expected);
    }

    #[test]
    fn requirement_kind() {
        let errors = evaluate(vec![Rule::requirement("-a")], &[]);
        assert_eq!(errors.of_kind(ErrorKind::RequiredFlag).len(), 1);
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[("-a", 0)], 0)]
    #[case(&[("-b", 4)], 0)]
    #[case(&[("-a", 0), ("-b", 4)], 1)]
    fn exclusion(#[case] flags: &[(&str, usize)], #[case] expected: usize) {
        let errors = evaluate(vec![Rule::exclusion("-a", "-b")], flags);
        assert_eq!(errors.count(), expected);
    }

    #[test]
    fn exclusion_message() {
        let errors = evaluate(
            vec![Rule::exclusion("-a", "--group > --flag")],
            &[("-a", 9), ("--group > --flag", 3)],
        );

        assert_eq!(
            texts(&errors),
            vec!["Flags '-a' and '--group > --flag' cannot be used together."]
        );
        assert_eq!(errors.messages()[0].position(), 9);
        assert_eq!(errors.messages()[0].kind(), ErrorKind::Exclusion);
    }

    #[rstest]
    #[case(&[], vec![])]
    #[case(&[("-b", 0)], vec![])]
    #[case(&[("-a", 5)], vec!["Flag '-a' requires: '-b', '-c'."])]
    #[case(&[("-a", 5), ("-c", 0)], vec!["Flag '-a' requires: '-b'."])]
    #[case(&[("-a", 5), ("-b", 0), ("-c", 0)], vec![])]
    fn dependency(#[case] flags: &[(&str, usize)], #[case] expected: Vec<&str>) {
        let errors = evaluate(vec![Rule::dependency("-a", ["-b", "-c"])], flags);
        assert_eq!(texts(&errors), expected);
    }

    #[test]
    fn dependency_position() {
        let errors = evaluate(vec![Rule::dependency("-a", ["-b"])], &[("-a", 7)]);
        assert_eq!(errors.messages()[0].position(), 7);
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[("-b", 0)], 0)]
    #[case(&[("-a", 0)], 1)]
    #[case(&[("-a", 0), ("-b", 2)], 0)]
    fn when_require(#[case] flags: &[(&str, usize)], #[case] expected: usize) {
        let errors = evaluate(
            vec![Rule::when(present("-a")).require(present("-b"))],
            flags,
        );
        assert_eq!(errors.count(), expected);
    }

    #[test]
    fn condition_message() {
        let errors = evaluate(
            vec![
                Rule::require(exactly(1, ["-a", "-b"])),
                Rule::when(present("-a")).require(!present("-c")),
            ],
            &[("-a", 0), ("-b", 2), ("-c", 4)],
        );

        assert_eq!(
            texts(&errors),
            vec![
                "Condition not satisfied: exactly(1, -a, -b).",
                "Condition not satisfied: when present(-a), require NOT present(-c).",
            ]
        );
        assert_eq!(errors.of_kind(ErrorKind::Condition).len(), 2);
    }

    #[test]
    fn custom_message() {
        let errors = evaluate(
            vec![
                Rule::requirement("-c").message("Please provide -c."),
                Rule::exclusion("-a", "-b").message("Pick one."),
            ],
            &[("-a", 0), ("-b", 2)],
        );

        assert_eq!(texts(&errors), vec!["Please provide -c.", "Pick one."]);
        assert_eq!(errors.messages()[0].kind(), ErrorKind::RequiredFlag);
        assert_eq!(errors.messages()[1].kind(), ErrorKind::Exclusion);
    }

    #[test]
    fn evaluation_order() {
        // Recorded in rule category order, regardless of declaration order.
        let errors = evaluate(
            vec![
                Rule::require(absent("-a")),
                Rule::dependency("-a", ["-c"]),
                Rule::exclusion("-a", "-b"),
                Rule::requirement("-c"),
            ],
            &[("-a", 0), ("-b", 0)],
        );

        let kinds: Vec<ErrorKind> = errors.messages().iter().map(|m| m.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::RequiredFlag,
                ErrorKind::Exclusion,
                ErrorKind::Dependency,
                ErrorKind::Condition,
            ]
        );
    }
}
