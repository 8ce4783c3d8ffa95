use crate::context::{Context, Entity};
use crate::error::ErrorGroup;
use crate::model::PositionalPolicy;
use crate::parser::ast::*;
use crate::parser::SyntaxError;

/// Check the positional ordering policy of every scope in the tree.
/// One error per offending positional, naming the nearest flag it is on the wrong side of.
pub(crate) fn check_positionals(statement: &Statement, context: &Context, errors: &mut ErrorGroup) {
    check_scope(&statement.nodes, context, errors);
}

fn check_scope(nodes: &[Node], context: &Context, errors: &mut ErrorGroup) {
    let policy = context.config().positional_policy();
    let flags: Vec<&Located> = nodes.iter().filter_map(Node::flag).collect();

    for node in nodes {
        match node {
            Node::Positional { value } => {
                let offending = match policy {
                    PositionalPolicy::Interleaved => None,
                    PositionalPolicy::BeforeFlags => flags
                        .iter()
                        .filter(|flag| flag.position < value.position)
                        .last(),
                    PositionalPolicy::AfterFlags => flags
                        .iter()
                        .find(|flag| flag.position > value.position),
                };

                if let Some(flag) = offending {
                    errors.add(
                        value.position,
                        &SyntaxError::PositionalOrder {
                            value: value.text.clone(),
                            flag: flag.text.clone(),
                            flag_position: flag.position,
                            policy,
                        },
                    );
                }
            }
            Node::Group { flag, children, .. } => {
                if let Some(Entity::Group { scope, .. }) = context
                    .lookup_by_name(&flag.text)
                    .map(|declared| &declared.entity)
                {
                    check_scope(children, scope, errors);
                }
            }
            Node::Option { .. } | Node::MultiOption { .. } => {}
        }
    }
}
