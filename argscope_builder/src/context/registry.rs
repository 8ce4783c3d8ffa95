use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::api::is_numeric_literal;
use crate::constant::{DOUBLE_DASH, ROOT_SCOPE};
use crate::context::entity::*;
use crate::context::{FlagTree, ResolvedConfig, ScopeConfig};
use crate::error::{Diagnostic, ErrorGroup, ErrorKind};
use crate::model::{Flag, FlagPath};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Errors in the declared configuration, detected before any input is parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ValidationError {
    #[error("Duplicate flag '{name}' in scope '{scope}'.")]
    DuplicateFlag { name: String, scope: String },

    #[error("Empty name in scope '{scope}'.")]
    EmptyFlag { scope: String },

    #[error("Flag '{name}' in scope '{scope}' must start with one of: {prefixes}.")]
    InvalidPrefix {
        name: String,
        scope: String,
        prefixes: String,
    },

    #[error("Flag '{name}' in scope '{scope}' cannot be written as a flag.")]
    InvalidFlagName { name: String, scope: String },

    #[error("Scope '{scope}' declares a second multi-positional '{name}'.")]
    MultiplePositionals { name: String, scope: String },

    #[error("Invalid flag path '{path}'.")]
    InvalidFlagPath { path: String },

    #[error("Flag '{path}' cannot depend on, or exclude, itself.")]
    SelfReference { path: String },

    #[error("Flag '{path}' is required more than once.")]
    DuplicateRequirement { path: String },
}

impl Diagnostic for ValidationError {
    fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::DuplicateFlag { .. } => ErrorKind::DuplicateFlag,
            ValidationError::EmptyFlag { .. } => ErrorKind::EmptyFlag,
            ValidationError::InvalidPrefix { .. } => ErrorKind::InvalidPrefix,
            ValidationError::InvalidFlagName { .. } => ErrorKind::InvalidFlagName,
            ValidationError::MultiplePositionals { .. } => ErrorKind::MultiplePositionals,
            ValidationError::InvalidFlagPath { .. } => ErrorKind::InvalidFlagPath,
            ValidationError::SelfReference { .. } => ErrorKind::SelfReference,
            ValidationError::DuplicateRequirement { .. } => ErrorKind::DuplicateRequirement,
        }
    }
}

/// The display name of the scope at `path`.
pub(crate) fn scope_name(path: &FlagPath) -> String {
    if path.is_empty() {
        ROOT_SCOPE.to_string()
    } else {
        path.to_string()
    }
}

/// One declaration into a scope.
pub(crate) enum Declaration<'a> {
    Option {
        flag: Flag,
        documentation: Documentation,
        capture: Box<dyn AnonymousCapturable + 'a>,
    },
    Group {
        flag: Flag,
        documentation: Documentation,
        scope: Context<'a>,
    },
    Positional {
        name: String,
        documentation: Documentation,
        capture: Box<dyn AnonymousCapturable + 'a>,
    },
}

// Problems only detectable while declaring, reported by `validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Collision {
    Flag(String),
    MultiPositional(String),
}

/// A scope of the flag registry: the root parser, or one group.
#[derive(Debug, Default)]
pub(crate) struct Context<'a> {
    config: ScopeConfig,
    resolved: Option<ResolvedConfig>,
    declared: Vec<Declared<'a>>,
    names: HashMap<String, usize>,
    positionals: Vec<PositionalSlot<'a>>,
    multi_positional: Option<PositionalSlot<'a>>,
    collisions: Vec<Collision>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(config: ScopeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub(crate) fn set_config(&mut self, config: ScopeConfig) {
        self.config = config;
    }

    pub(crate) fn declare(&mut self, declaration: Declaration<'a>) {
        match declaration {
            Declaration::Option {
                flag,
                documentation,
                capture,
            } => {
                let slot = Slot::new(capture);
                let entity = match slot.nargs() {
                    Some(nargs) => Entity::Multi(slot, nargs),
                    None => Entity::Single(slot),
                };
                self.declare_flag(Declared {
                    flag,
                    documentation,
                    entity,
                });
            }
            Declaration::Group {
                flag,
                documentation,
                scope,
            } => {
                self.declare_flag(Declared {
                    flag,
                    documentation,
                    entity: Entity::Group {
                        scope: Box::new(scope),
                        set_at: None,
                    },
                });
            }
            Declaration::Positional {
                name,
                documentation,
                capture,
            } => {
                let positional = PositionalSlot {
                    name,
                    documentation,
                    slot: Slot::new(capture),
                };

                if positional.slot.nargs().is_none() {
                    self.positionals.push(positional);
                } else if self.multi_positional.is_some() {
                    self.collisions
                        .push(Collision::MultiPositional(positional.name));
                } else {
                    self.multi_positional.replace(positional);
                }
            }
        }
    }

    fn declare_flag(&mut self, declared: Declared<'a>) {
        let index = self.declared.len();

        for name in declared.flag.names() {
            if self.names.contains_key(name) {
                self.collisions.push(Collision::Flag(name.to_string()));
            } else {
                self.names.insert(name.to_string(), index);
            }
        }

        self.declared.push(declared);
    }

    pub(crate) fn lookup_by_name(&self, name: &str) -> Option<&Declared<'a>> {
        self.names.get(name).map(|index| &self.declared[*index])
    }

    /// The documentation of the flag, or the positional, at `path`.
    /// A positional is addressed by its name within the scope of its enclosing groups.
    pub(crate) fn documentation(&self, path: &FlagPath) -> Option<&Documentation> {
        if let Ok((_, declared)) = self.lookup_by_path(path) {
            return Some(&declared.documentation);
        }

        let (terminal, groups) = path.segments().split_last()?;
        let scope = if groups.is_empty() {
            self
        } else {
            match self.lookup_by_path(&FlagPath::new(groups.to_vec())).ok()? {
                (_, Declared {
                    entity: Entity::Group { scope, .. },
                    ..
                }) => scope,
                _ => return None,
            }
        };

        scope
            .positionals
            .iter()
            .chain(scope.multi_positional.iter())
            .find(|positional| &positional.name == terminal)
            .map(|positional| &positional.documentation)
    }

    pub(crate) fn contains_flag(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Resolve the `path` (alias transparently) down the group chain.
    /// Returns the canonical path (main names only) together with the entity.
    pub(crate) fn lookup_by_path(
        &self,
        path: &FlagPath,
    ) -> Result<(FlagPath, &Declared<'a>), ValidationError> {
        let invalid = || ValidationError::InvalidFlagPath {
            path: path.to_string(),
        };
        let (terminal, groups) = path.segments().split_last().ok_or_else(invalid)?;
        let mut scope = self;
        let mut canonical = FlagPath::default();

        for segment in groups {
            match scope.lookup_by_name(segment) {
                Some(Declared {
                    flag,
                    entity: Entity::Group { scope: inner, .. },
                    ..
                }) => {
                    canonical = canonical.child(flag.main());
                    scope = inner;
                }
                _ => return Err(invalid()),
            }
        }

        let declared = scope.lookup_by_name(terminal).ok_or_else(invalid)?;
        Ok((canonical.child(declared.flag.main()), declared))
    }

    /// Propagate the inherited configuration down the scope tree, in place.
    pub(crate) fn resolve_config(&mut self, parent: &ResolvedConfig) {
        let resolved = self.config.resolve(parent);

        for declared in self.declared.iter_mut() {
            if let Entity::Group { scope, .. } = &mut declared.entity {
                scope.resolve_config(&resolved);
            }
        }

        self.resolved.replace(resolved);
    }

    /// The resolved configuration of this scope.
    pub(crate) fn config(&self) -> &ResolvedConfig {
        self.resolved
            .as_ref()
            .expect("internal error - the scope configuration must be resolved before use")
    }

    /// Check the declarations of this scope (and every nested scope), recording each problem into `errors`.
    pub(crate) fn validate(&self, scope: &FlagPath, errors: &mut ErrorGroup) {
        let config = self.config();
        let name = scope_name(scope);

        for collision in &self.collisions {
            let error = match collision {
                Collision::Flag(flag) => ValidationError::DuplicateFlag {
                    name: flag.clone(),
                    scope: name.clone(),
                },
                Collision::MultiPositional(positional) => ValidationError::MultiplePositionals {
                    name: positional.clone(),
                    scope: name.clone(),
                },
            };
            errors.add(0, &error);
        }

        for declared in &self.declared {
            for flag in declared.flag.names() {
                if let Err(error) = check_flag_name(flag, config, &name) {
                    errors.add(0, &error);
                }
            }

            if let Entity::Group { scope: inner, .. } = &declared.entity {
                inner.validate(&scope.child(declared.flag.main()), errors);
            }
        }

        for positional in self.positionals.iter().chain(self.multi_positional.iter()) {
            if positional.name.is_empty() {
                errors.add(0, &ValidationError::EmptyFlag { scope: name.clone() });
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Validated scope '{name}': {} flags, {} positionals.",
                self.declared.len(),
                self.positionals.len() + self.multi_positional.iter().count()
            );
        }
    }

    /// Split borrow of a flag's entity together with this scope's configuration.
    pub(crate) fn entity_for_binding(
        &mut self,
        name: &str,
    ) -> Option<(&mut Declared<'a>, &ResolvedConfig)> {
        let config = self
            .resolved
            .as_ref()
            .expect("internal error - the scope configuration must be resolved before use");
        let index = *self.names.get(name)?;
        Some((&mut self.declared[index], config))
    }

    /// Split borrow of the positional slot for the `index`-th positional value, together with this scope's configuration.
    /// Indices past the fixed slots route to the multi-positional slot, if any.
    pub(crate) fn positional_for_binding(
        &mut self,
        index: usize,
    ) -> (Option<&mut PositionalSlot<'a>>, &ResolvedConfig) {
        let config = self
            .resolved
            .as_ref()
            .expect("internal error - the scope configuration must be resolved before use");
        let fixed = self.positionals.len();
        let slot = if index < fixed {
            self.positionals.get_mut(index)
        } else {
            self.multi_positional.as_mut()
        };
        (slot, config)
    }

    /// The number of fixed positional slots.
    pub(crate) fn fixed_positionals(&self) -> usize {
        self.positionals.len()
    }

    /// The multi-positional slot, if declared.
    /// The fixed positional slots which are required but were not filled.
    pub(crate) fn missing_positionals(&self) -> impl Iterator<Item = &PositionalSlot<'a>> {
        self.positionals
            .iter()
            .filter(|positional| positional.slot.required() && !positional.slot.occurred())
    }

    /// Commit every captured value of this scope tree into the caller variables.
    pub(crate) fn finish(&mut self) {
        for declared in self.declared.iter_mut() {
            match &mut declared.entity {
                Entity::Single(slot) | Entity::Multi(slot, _) => slot.finish(),
                Entity::Group { scope, .. } => scope.finish(),
            }
        }

        for positional in self
            .positionals
            .iter_mut()
            .chain(self.multi_positional.iter_mut())
        {
            positional.slot.finish();
        }
    }

    /// Collect the canonical path of every populated flag in this scope tree, with its latest position.
    pub(crate) fn populated(&self, scope: &FlagPath, out: &mut BTreeMap<FlagPath, usize>) {
        for declared in &self.declared {
            let path = scope.child(declared.flag.main());

            if let Some(position) = declared.entity.set_at() {
                out.insert(path.clone(), position);
            }

            if let Entity::Group { scope: inner, .. } = &declared.entity {
                inner.populated(&path, out);
            }
        }
    }

    /// An owned snapshot of the declared flag names, for resolving paths after the registry is consumed.
    pub(crate) fn flag_tree(&self) -> FlagTree {
        FlagTree::new(
            self.declared
                .iter()
                .map(|declared| {
                    let inner = match &declared.entity {
                        Entity::Group { scope, .. } => Some(scope.flag_tree()),
                        _ => None,
                    };
                    (declared.flag.clone(), inner)
                })
                .collect(),
        )
    }
}

fn check_flag_name(name: &str, config: &ResolvedConfig, scope: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyFlag {
            scope: scope.to_string(),
        });
    }

    let prefix = config
        .prefix_of(name)
        .ok_or_else(|| ValidationError::InvalidPrefix {
            name: name.to_string(),
            scope: scope.to_string(),
            prefixes: config
                .prefixes()
                .iter()
                .map(|prefix| format!("'{prefix}'"))
                .collect::<Vec<String>>()
                .join(", "),
        })?;

    if name.len() == prefix.len() {
        return Err(ValidationError::EmptyFlag {
            scope: scope.to_string(),
        });
    }

    if name == DOUBLE_DASH
        || is_numeric_literal(name)
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '[' | ']' | '=' | '"' | '\''))
    {
        return Err(ValidationError::InvalidFlagName {
            name: name.to_string(),
            scope: scope.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::entity::test::Recorder;
    use crate::model::Nargs;
    use rstest::rstest;

    fn option(flag: Flag) -> Declaration<'static> {
        Declaration::Option {
            flag,
            documentation: Documentation::default(),
            capture: Box::new(Recorder::default()),
        }
    }

    fn multi(flag: Flag) -> Declaration<'static> {
        Declaration::Option {
            flag,
            documentation: Documentation::default(),
            capture: Box::new(Recorder {
                nargs: Some(Nargs::AtLeastOne),
                ..Recorder::default()
            }),
        }
    }

    fn positional(name: &str, nargs: Option<Nargs>) -> Declaration<'static> {
        Declaration::Positional {
            name: name.to_string(),
            documentation: Documentation::default(),
            capture: Box::new(Recorder {
                nargs,
                required: true,
                ..Recorder::default()
            }),
        }
    }

    fn group(flag: Flag, scope: Context<'static>) -> Declaration<'static> {
        Declaration::Group {
            flag,
            documentation: Documentation::default(),
            scope,
        }
    }

    fn validate(mut context: Context<'static>) -> ErrorGroup {
        context.resolve_config(&ResolvedConfig::default());
        let mut errors = ErrorGroup::root("Validation");
        context.validate(&FlagPath::default(), &mut errors);
        errors
    }

    fn nested() -> Context<'static> {
        let mut inner = Context::default();
        inner.declare(option(Flag::new("-x")));
        let mut outer = Context::default();
        outer.declare(group(Flag::new("--inner").alias("-i"), inner));
        outer.declare(multi(Flag::new("--many")));
        let mut root = Context::default();
        root.declare(option(Flag::new("-x").alias("--ex")));
        root.declare(group(Flag::new("--outer").alias("-o"), outer));
        root
    }

    #[test]
    fn lookup_by_name() {
        let context = nested();
        assert!(context.contains_flag("-x"));
        assert!(context.contains_flag("--ex"));
        assert!(!context.contains_flag("--many"));
        assert_eq!(context.lookup_by_name("--ex").unwrap().flag.main(), "-x");
        assert_matches!(&context.lookup_by_name("-o").unwrap().entity, Entity::Group { .. });
        assert!(context.lookup_by_name("-y").is_none());
    }

    #[rstest]
    #[case("-x", "-x")]
    #[case("--ex", "-x")]
    #[case("--outer", "--outer")]
    #[case("-o > --many", "--outer > --many")]
    #[case("--outer > -i > -x", "--outer > --inner > -x")]
    #[case("-o > -i", "--outer > --inner")]
    fn lookup_by_path(#[case] path: &str, #[case] expected: &str) {
        let context = nested();
        let (canonical, _) = context.lookup_by_path(&FlagPath::from(path)).unwrap();
        assert_eq!(canonical, FlagPath::from(expected));
    }

    #[rstest]
    #[case("")]
    #[case("-y")]
    #[case("-x > -x")]
    #[case("--outer > -x")]
    #[case("--outer > --inner > --many")]
    fn lookup_by_path_invalid(#[case] path: &str) {
        let context = nested();
        assert_matches!(
            context.lookup_by_path(&FlagPath::from(path)),
            Err(ValidationError::InvalidFlagPath { .. })
        );
    }

    #[test]
    fn resolve_config_in_place() {
        let mut inner = Context::new(ScopeConfig::default().prefixes(["+"]));
        inner.declare(option(Flag::new("+x")));
        let mut root = Context::new(
            ScopeConfig::default().positional_policy(crate::model::PositionalPolicy::AfterFlags),
        );
        root.declare(group(Flag::new("--g"), inner));

        root.resolve_config(&ResolvedConfig::default());

        assert_matches!(&root.lookup_by_name("--g").unwrap().entity, Entity::Group { scope, .. } => {
            assert_eq!(scope.config().prefixes(), &["+".to_string()]);
            assert_eq!(
                scope.config().positional_policy(),
                crate::model::PositionalPolicy::AfterFlags
            );
        });
    }

    #[test]
    #[should_panic]
    fn config_unresolved() {
        Context::default().config();
    }

    #[test]
    fn validate_ok() {
        let errors = validate(nested());
        assert!(!errors.has_errors());
    }

    #[rstest]
    #[case(vec![Flag::new("-x"), Flag::new("-x")], ErrorKind::DuplicateFlag)]
    #[case(vec![Flag::new("-x"), Flag::new("-y").alias("-x")], ErrorKind::DuplicateFlag)]
    #[case(vec![Flag::new("")], ErrorKind::EmptyFlag)]
    #[case(vec![Flag::new("-")], ErrorKind::EmptyFlag)]
    #[case(vec![Flag::new("--")], ErrorKind::EmptyFlag)]
    #[case(vec![Flag::new("x")], ErrorKind::InvalidPrefix)]
    #[case(vec![Flag::new("-x").alias("y")], ErrorKind::InvalidPrefix)]
    #[case(vec![Flag::new("-5")], ErrorKind::InvalidFlagName)]
    #[case(vec![Flag::new("-a b")], ErrorKind::InvalidFlagName)]
    #[case(vec![Flag::new("-a=b")], ErrorKind::InvalidFlagName)]
    #[case(vec![Flag::new("-[")], ErrorKind::InvalidFlagName)]
    fn validate_flags(#[case] flags: Vec<Flag>, #[case] expected: ErrorKind) {
        // Setup
        let mut context = Context::default();
        for flag in flags {
            context.declare(option(flag));
        }

        // Execute
        let errors = validate(context);

        // Verify
        let messages = errors.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind(), expected);
    }

    #[test]
    fn validate_nested_scope_name() {
        let mut inner = Context::default();
        inner.declare(option(Flag::new("-x")));
        inner.declare(option(Flag::new("-x")));
        let mut root = Context::default();
        root.declare(group(Flag::new("--g"), inner));

        let errors = validate(root);

        let messages = errors.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text(), "Duplicate flag '-x' in scope '--g'.");
    }

    #[test]
    fn validate_group_flag_against_parent_prefixes() {
        let mut inner = Context::new(ScopeConfig::default().prefixes(["+"]));
        inner.declare(option(Flag::new("+x")));
        let mut root = Context::default();
        root.declare(group(Flag::new("+g"), inner));

        let errors = validate(root);

        let messages = errors.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind(), ErrorKind::InvalidPrefix);
        assert_eq!(
            messages[0].text(),
            "Flag '+g' in scope 'root' must start with one of: '-', '--'."
        );
    }

    #[test]
    fn validate_positionals() {
        let mut context = Context::default();
        context.declare(positional("a", None));
        context.declare(positional("", None));
        context.declare(positional("rest", Some(Nargs::AtLeastOne)));
        context.declare(positional("more", Some(Nargs::AtLeastOne)));

        let errors = validate(context);

        assert_eq!(errors.of_kind(ErrorKind::EmptyFlag).len(), 1);
        assert_eq!(errors.of_kind(ErrorKind::MultiplePositionals).len(), 1);
        assert_eq!(errors.count(), 2);
    }

    #[test]
    fn positional_routing() {
        let mut context = Context::default();
        context.declare(positional("a", None));
        context.declare(positional("b", None));
        context.resolve_config(&ResolvedConfig::default());

        assert_eq!(context.fixed_positionals(), 2);
        assert_eq!(context.positional_for_binding(1).0.unwrap().name, "b");
        assert!(context.positional_for_binding(2).0.is_none());

        context.declare(positional("rest", Some(Nargs::AtMost(2))));
        assert_eq!(context.positional_for_binding(2).0.unwrap().name, "rest");
        assert_eq!(context.positional_for_binding(7).0.unwrap().name, "rest");
        assert_eq!(context.missing_positionals().count(), 2);
    }

    #[test]
    fn populated_paths() {
        // Setup
        let mut context = nested();
        context.resolve_config(&ResolvedConfig::default());
        let config = ResolvedConfig::default();
        {
            let (declared, _) = context.entity_for_binding("--ex").unwrap();
            if let Entity::Single(slot) = &mut declared.entity {
                slot.begin(2);
                slot.capture("1", &config).unwrap();
            }
            let (declared, _) = context.entity_for_binding("-o").unwrap();
            if let Entity::Group { scope, set_at } = &mut declared.entity {
                set_at.replace(8);
                let (declared, _) = scope.entity_for_binding("--many").unwrap();
                if let Entity::Multi(slot, _) = &mut declared.entity {
                    slot.begin(12);
                    slot.capture("1", &config).unwrap();
                }
                let (declared, _) = scope.entity_for_binding("-i").unwrap();
                if let Entity::Group { scope, .. } = &mut declared.entity {
                    let (declared, _) = scope.entity_for_binding("-x").unwrap();
                    if let Entity::Single(slot) = &mut declared.entity {
                        slot.begin(20);
                    }
                }
            }
        }

        // Execute
        let mut out = BTreeMap::default();
        context.populated(&FlagPath::default(), &mut out);

        // Verify
        assert_eq!(
            out,
            BTreeMap::from([
                (FlagPath::from("-x"), 2),
                (FlagPath::from("--outer"), 8),
                (FlagPath::from("--outer > --many"), 12),
            ])
        );
    }

    #[test]
    fn documentation() {
        // Setup
        let mut inner = Context::default();
        inner.declare(Declaration::Positional {
            name: "item".to_string(),
            documentation: Documentation {
                help: Some("an item".to_string()),
                meta: None,
            },
            capture: Box::new(Recorder::default()),
        });
        let mut context = Context::default();
        context.declare(Declaration::Option {
            flag: Flag::new("-x").alias("--ex"),
            documentation: Documentation {
                help: Some("the x".to_string()),
                meta: Some(vec!["X".to_string()]),
            },
            capture: Box::new(Recorder::default()),
        });
        context.declare(group(Flag::new("--g"), inner));

        // Execute
        let flag = context.documentation(&FlagPath::from("--ex"));
        let positional = context.documentation(&FlagPath::from("--g > item"));

        // Verify
        assert_eq!(flag.unwrap().help.as_deref(), Some("the x"));
        assert_eq!(flag.unwrap().meta, Some(vec!["X".to_string()]));
        assert_eq!(positional.unwrap().help.as_deref(), Some("an item"));
        assert!(context.documentation(&FlagPath::from("item")).is_none());
        assert!(context.documentation(&FlagPath::from("-x > item")).is_none());
    }

    #[test]
    fn flag_tree_snapshot() {
        let tree = nested().flag_tree();
        assert_eq!(
            tree.canonical(&FlagPath::from("-o > -i > -x")),
            Some(FlagPath::from("--outer > --inner > -x"))
        );
    }
}
