use thiserror::Error;

use crate::api::InvalidCapture;
use crate::context::{scope_name, Context, Entity, EntityKind};
use crate::error::{Diagnostic, ErrorGroup, ErrorKind};
use crate::model::FlagPath;
use crate::parser::{Located, Node, Statement};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Errors in binding the syntax tree onto the declared entities.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum AnalysisError {
    #[error("Unknown flag '{flag}' in scope '{scope}'.")]
    UnknownFlag { flag: String, scope: String },

    #[error("Flag '{flag}' is a {expected}, but was used as a {found}.")]
    IncorrectOptionType {
        flag: String,
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("Invalid value for '{name}': {error}")]
    ConversionError { name: String, error: InvalidCapture },

    #[error("Flag '{flag}' takes at most {maximum} value(s).")]
    TooManyValues { flag: String, maximum: usize },

    #[error("Too many positional values in scope '{scope}' (at most {maximum}).")]
    TooManyPositionals { maximum: usize, scope: String },

    #[error("Missing positional '{name}' in scope '{scope}'.")]
    MissingPositional { name: String, scope: String },
}

impl Diagnostic for AnalysisError {
    fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::UnknownFlag { .. } => ErrorKind::UnknownFlag,
            AnalysisError::IncorrectOptionType { .. } => ErrorKind::IncorrectOptionType,
            AnalysisError::ConversionError { .. } => ErrorKind::ConversionError,
            AnalysisError::TooManyValues { .. } => ErrorKind::TooManyValues,
            AnalysisError::TooManyPositionals { .. } => ErrorKind::UnexpectedToken,
            AnalysisError::MissingPositional { .. } => ErrorKind::MissingPositional,
        }
    }
}

/// Bind every node of the `statement` onto the entities of `context`, converting the value texts as it goes.
/// Each failing node records its error(s) into `errors`; the errors of a group nest under the group's bracket span.
pub(crate) fn bind(statement: &Statement, context: &mut Context, errors: &mut ErrorGroup) {
    bind_scope(
        &statement.nodes,
        context,
        &FlagPath::default(),
        statement.end,
        errors,
    );

    #[cfg(feature = "tracing_debug")]
    {
        debug!("Bound syntax tree: {} analysis errors.", errors.count());
    }
}

// `end` is where problems with the scope as a whole (ex: missing positionals) are attributed.
fn bind_scope(
    nodes: &[Node],
    context: &mut Context,
    path: &FlagPath,
    end: usize,
    errors: &mut ErrorGroup,
) {
    let mut index = 0;

    for node in nodes {
        match node {
            Node::Option { flag, value } => bind_option(flag, value, context, path, errors),
            Node::MultiOption { flag, values } => {
                bind_multi_option(flag, values, context, path, errors)
            }
            Node::Group {
                flag,
                children,
                span,
            } => bind_group(flag, children, *span, context, path, errors),
            Node::Positional { value } => {
                bind_positional(value, index, context, path, errors);
                index += 1;
            }
        }
    }

    for positional in context.missing_positionals() {
        errors.add(
            end,
            &AnalysisError::MissingPositional {
                name: positional.name.clone(),
                scope: scope_name(path),
            },
        );
    }
}

fn unknown_flag(flag: &Located, path: &FlagPath) -> AnalysisError {
    AnalysisError::UnknownFlag {
        flag: flag.text.clone(),
        scope: scope_name(path),
    }
}

fn incorrect_type(flag: &Located, expected: EntityKind, found: EntityKind) -> AnalysisError {
    AnalysisError::IncorrectOptionType {
        flag: flag.text.clone(),
        expected,
        found,
    }
}

fn bind_option(
    flag: &Located,
    value: &Located,
    context: &mut Context,
    path: &FlagPath,
    errors: &mut ErrorGroup,
) {
    let Some((declared, config)) = context.entity_for_binding(&flag.text) else {
        errors.add(flag.position, &unknown_flag(flag, path));
        return;
    };

    match &mut declared.entity {
        Entity::Single(slot) => {
            slot.begin(flag.position);

            if let Err(error) = slot.capture(&value.text, config) {
                errors.add(
                    value.position,
                    &AnalysisError::ConversionError {
                        name: flag.text.clone(),
                        error,
                    },
                );
            }
        }
        entity => errors.add(
            flag.position,
            &incorrect_type(flag, entity.kind(), EntityKind::SingleValued),
        ),
    }
}

fn bind_multi_option(
    flag: &Located,
    values: &[Located],
    context: &mut Context,
    path: &FlagPath,
    errors: &mut ErrorGroup,
) {
    let Some((declared, config)) = context.entity_for_binding(&flag.text) else {
        errors.add(flag.position, &unknown_flag(flag, path));
        return;
    };

    match &mut declared.entity {
        Entity::Multi(slot, nargs) => {
            let maximum = nargs.maximum();
            slot.begin(flag.position);

            for (i, value) in values.iter().enumerate() {
                if let Some(maximum) = maximum.filter(|maximum| i >= *maximum) {
                    errors.add(
                        value.position,
                        &AnalysisError::TooManyValues {
                            flag: flag.text.clone(),
                            maximum,
                        },
                    );
                    break;
                }

                if let Err(error) = slot.capture(&value.text, config) {
                    errors.add(
                        value.position,
                        &AnalysisError::ConversionError {
                            name: flag.text.clone(),
                            error,
                        },
                    );
                }
            }
        }
        entity => errors.add(
            flag.position,
            &incorrect_type(flag, entity.kind(), EntityKind::MultiValued),
        ),
    }
}

fn bind_group(
    flag: &Located,
    children: &[Node],
    span: (usize, usize),
    context: &mut Context,
    path: &FlagPath,
    errors: &mut ErrorGroup,
) {
    let Some((declared, _)) = context.entity_for_binding(&flag.text) else {
        errors.add(flag.position, &unknown_flag(flag, path));
        return;
    };
    let inner_path = path.child(declared.flag.main());

    match &mut declared.entity {
        Entity::Group { scope, set_at } => {
            set_at.replace(flag.position);
            let mut inner = ErrorGroup::new(inner_path.to_string(), span.0, span.1);
            bind_scope(
                children,
                scope,
                &inner_path,
                span.1.saturating_sub(1),
                &mut inner,
            );
            errors.insert_group(inner);
        }
        entity => errors.add(
            flag.position,
            &incorrect_type(flag, entity.kind(), EntityKind::Group),
        ),
    }
}

fn bind_positional(
    value: &Located,
    index: usize,
    context: &mut Context,
    path: &FlagPath,
    errors: &mut ErrorGroup,
) {
    let fixed = context.fixed_positionals();
    let (positional, config) = context.positional_for_binding(index);

    let Some(positional) = positional else {
        errors.add(
            value.position,
            &AnalysisError::TooManyPositionals {
                maximum: fixed,
                scope: scope_name(path),
            },
        );
        return;
    };

    if index >= fixed {
        // The multi-positional slot.
        if let Some(maximum) = positional.slot.nargs().and_then(|nargs| nargs.maximum()) {
            if index - fixed >= maximum {
                errors.add(
                    value.position,
                    &AnalysisError::TooManyPositionals {
                        maximum: fixed + maximum,
                        scope: scope_name(path),
                    },
                );
                return;
            }
        }
    }

    if index <= fixed {
        positional.slot.begin(value.position);
    }

    if let Err(error) = positional.slot.capture(&value.text, config) {
        errors.add(
            value.position,
            &AnalysisError::ConversionError {
                name: positional.name.clone(),
                error,
            },
        );
    }
}
