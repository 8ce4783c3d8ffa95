use thiserror::Error;

use crate::context::{scope_name, Context, Declared, Entity};
use crate::error::{Diagnostic, ErrorGroup, ErrorKind};
use crate::model::{FlagPath, PositionalPolicy};
use crate::parser::ast::*;
use crate::scanner::{Token, TokenKind, TokenStream};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Errors in the shape of the input.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SyntaxError {
    #[error("Flag '{flag}' is missing a value.")]
    MissingValue { flag: String },

    #[error("Group '{flag}' must be followed by '['.")]
    MissingLeftBracket { flag: String },

    #[error("Group '{flag}' is missing its closing ']'.")]
    MissingRightBracket { flag: String },

    #[error("Unmatched ']'.")]
    UnmatchedRightBracket,

    #[error("Unknown flag '{flag}' in scope '{scope}'.")]
    UnknownFlag { flag: String, scope: String },

    #[error("Unexpected {token}.")]
    UnexpectedToken { token: String },

    #[error("Multiple '--' in scope '{scope}'.")]
    MultipleDoubleDash { scope: String },

    #[error("Positional '{value}' must come {policy} (found flag '{flag}' at {flag_position}).")]
    PositionalOrder {
        value: String,
        flag: String,
        flag_position: usize,
        policy: PositionalPolicy,
    },
}

impl Diagnostic for SyntaxError {
    fn kind(&self) -> ErrorKind {
        match self {
            SyntaxError::MissingValue { .. } => ErrorKind::MissingValue,
            SyntaxError::MissingLeftBracket { .. } => ErrorKind::MissingLeftBracket,
            SyntaxError::MissingRightBracket { .. } => ErrorKind::MissingRightBracket,
            SyntaxError::UnmatchedRightBracket => ErrorKind::UnmatchedRightBracket,
            SyntaxError::UnknownFlag { .. } => ErrorKind::UnknownFlag,
            SyntaxError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            SyntaxError::MultipleDoubleDash { .. } => ErrorKind::MultipleDoubleDash,
            SyntaxError::PositionalOrder { .. } => ErrorKind::PositionalOrder,
        }
    }
}

// Which tokens of a scope the double dash forces into positionals.
#[derive(Debug, Clone, Copy)]
struct Dash {
    position: Option<usize>,
    policy: PositionalPolicy,
}

impl Dash {
    fn forces(&self, token: &Token) -> bool {
        match self.position {
            None => false,
            Some(dash) => match self.policy {
                PositionalPolicy::BeforeFlags => token.position < dash,
                PositionalPolicy::Interleaved | PositionalPolicy::AfterFlags => {
                    token.position > dash
                }
            },
        }
    }
}

struct Parser<'e> {
    stream: TokenStream,
    errors: &'e mut ErrorGroup,
}

/// Parse the `tokens` into a syntax tree, driven by the flags declared in `context`.
/// Every syntax problem is recorded into `errors`; parsing always runs to the end of input.
pub(crate) fn parse(tokens: Vec<Token>, context: &Context, errors: &mut ErrorGroup) -> Statement {
    let mut parser = Parser {
        stream: TokenStream::new(tokens),
        errors,
    };
    let nodes = parser.scope(context, &FlagPath::default());
    let unmatched: Vec<usize> = parser.stream.unmatched().collect();

    for position in unmatched {
        parser
            .errors
            .add(position, &SyntaxError::UnmatchedRightBracket);
    }

    let statement = Statement {
        nodes,
        end: parser.stream.end_position(),
    };

    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Parsed {} nodes, {} syntax errors.",
            statement.count(),
            parser.errors.count()
        );
    }

    statement
}

impl<'e> Parser<'e> {
    fn scope(&mut self, context: &Context, path: &FlagPath) -> Vec<Node> {
        let root = path.is_empty();
        let config = context.config();
        let dash = Dash {
            position: self.find_double_dash(root, path),
            policy: config.positional_policy(),
        };
        let mut nodes = Vec::default();

        loop {
            let token = self.stream.peek().clone();

            match token.kind {
                TokenKind::End => break,
                TokenKind::RightBracket => {
                    if root {
                        // Recorded by the stream as unmatched.
                        self.stream.consume();
                    } else {
                        break;
                    }
                }
                TokenKind::DoubleDash => {
                    self.stream.consume();
                }
                TokenKind::LeftBracket => {
                    self.errors.add(
                        token.position,
                        &SyntaxError::UnexpectedToken {
                            token: token.kind.to_string(),
                        },
                    );
                    self.skip_subscope();
                }
                TokenKind::Equals => {
                    self.stream.consume();
                    self.errors.add(
                        token.position,
                        &SyntaxError::UnexpectedToken {
                            token: token.kind.to_string(),
                        },
                    );
                }
                TokenKind::Identifier | TokenKind::StringLiteral => {
                    let token = self.stream.consume();

                    if token.kind == TokenKind::StringLiteral || dash.forces(&token) {
                        nodes.push(Node::Positional {
                            value: Located::from(token),
                        });
                    } else if let Some(declared) = context.lookup_by_name(&token.text) {
                        if let Some(node) = self.bundle(token, declared, context, path, dash) {
                            nodes.push(node);
                        }
                    } else if config.looks_like_flag(&token.text) {
                        self.errors.add(
                            token.position,
                            &SyntaxError::UnknownFlag {
                                flag: token.text,
                                scope: scope_name(path),
                            },
                        );
                        self.recover(context);
                    } else {
                        nodes.push(Node::Positional {
                            value: Located::from(token),
                        });
                    }
                }
            }
        }

        nodes
    }

    fn bundle(
        &mut self,
        flag: Token,
        declared: &Declared,
        context: &Context,
        path: &FlagPath,
        dash: Dash,
    ) -> Option<Node> {
        match &declared.entity {
            Entity::Single(slot) => self.single_value(flag, slot.implicit(), context),
            Entity::Multi(..) => self.multi_value(flag, context, dash),
            Entity::Group { scope, .. } => {
                self.group(flag, scope, &path.child(declared.flag.main()))
            }
        }
    }

    // Look ahead (without consuming) through the rest of this scope for its double dash.
    fn find_double_dash(&mut self, root: bool, path: &FlagPath) -> Option<usize> {
        let mut depth: usize = 0;
        let mut found = None;
        let mut n = 0;

        loop {
            let token = self.stream.peek_nth(n);

            match token.kind {
                TokenKind::End => break,
                TokenKind::LeftBracket => depth += 1,
                TokenKind::RightBracket => {
                    if depth > 0 {
                        depth -= 1;
                    } else if !root {
                        break;
                    }
                }
                TokenKind::DoubleDash if depth == 0 => {
                    if found.is_none() {
                        found.replace(token.position);
                    } else {
                        let position = token.position;
                        self.errors.add(
                            position,
                            &SyntaxError::MultipleDoubleDash {
                                scope: scope_name(path),
                            },
                        );
                    }
                }
                _ => {}
            }

            n += 1;
        }

        found
    }

    // Skip forward until a flag of this scope, or the end of the scope.
    fn recover(&mut self, context: &Context) {
        loop {
            let token = self.stream.peek().clone();

            match token.kind {
                TokenKind::End | TokenKind::RightBracket => break,
                TokenKind::LeftBracket => self.skip_subscope(),
                TokenKind::Identifier if context.contains_flag(&token.text) => break,
                _ => {
                    self.stream.consume();
                }
            }
        }
    }

    // Consume a bracketed sub-scope entirely, starting at its '['.
    fn skip_subscope(&mut self) {
        let mut depth: usize = 0;

        loop {
            let token = self.stream.consume();

            match token.kind {
                TokenKind::End => break,
                TokenKind::LeftBracket => depth += 1,
                TokenKind::RightBracket => {
                    depth = depth.saturating_sub(1);

                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    // Whether `token` can be taken as the value of a flag.
    fn is_value(&self, token: &Token, context: &Context) -> bool {
        match token.kind {
            TokenKind::StringLiteral => true,
            TokenKind::Identifier => !context.contains_flag(&token.text),
            _ => false,
        }
    }

    // The value following an explicit '='.
    fn explicit_value(&mut self, flag: &Token) -> Option<Located> {
        let equals = self.stream.consume();

        if self.stream.peek().is_value() {
            Some(Located::from(self.stream.consume()))
        } else {
            self.errors.add(
                equals.end(),
                &SyntaxError::MissingValue {
                    flag: flag.text.clone(),
                },
            );
            None
        }
    }

    fn single_value(
        &mut self,
        flag: Token,
        implicit: Option<&'static str>,
        context: &Context,
    ) -> Option<Node> {
        let next = self.stream.peek().clone();

        let value = if next.kind == TokenKind::Equals {
            self.explicit_value(&flag)?
        } else if self.is_value(&next, context) {
            Located::from(self.stream.consume())
        } else {
            match implicit {
                Some(implicit) => Located::new(implicit, flag.end()),
                None => {
                    self.errors.add(
                        flag.end(),
                        &SyntaxError::MissingValue {
                            flag: flag.text.clone(),
                        },
                    );
                    return None;
                }
            }
        };

        Some(Node::Option {
            flag: Located::from(flag),
            value,
        })
    }

    fn multi_value(&mut self, flag: Token, context: &Context, dash: Dash) -> Option<Node> {
        if self.stream.peek().kind == TokenKind::Equals {
            let value = self.explicit_value(&flag)?;
            return Some(Node::MultiOption {
                flag: Located::from(flag),
                values: vec![value],
            });
        }

        let mut values = Vec::default();

        loop {
            let token = self.stream.consume();

            if token.kind == TokenKind::End {
                break;
            }

            // A forced token belongs to the scope's positionals, not to this flag.
            if !self.is_value(&token, context) || dash.forces(&token) {
                self.stream.rewind(1);
                break;
            }

            values.push(Located::from(token));
        }

        if values.is_empty() {
            self.errors.add(
                flag.end(),
                &SyntaxError::MissingValue {
                    flag: flag.text.clone(),
                },
            );
            return None;
        }

        Some(Node::MultiOption {
            flag: Located::from(flag),
            values,
        })
    }

    fn group(&mut self, flag: Token, scope: &Context, path: &FlagPath) -> Option<Node> {
        if self.stream.peek().kind != TokenKind::LeftBracket {
            self.errors.add(
                flag.end(),
                &SyntaxError::MissingLeftBracket {
                    flag: flag.text.clone(),
                },
            );
            return None;
        }

        let open = self.stream.consume();
        let depth = self.stream.depth();
        let children = self.scope(scope, path);

        let end = if self.stream.peek().kind == TokenKind::RightBracket {
            let close = self.stream.consume();
            debug_assert_eq!(self.stream.depth() + 1, depth);
            close.position + 1
        } else {
            self.errors.add(
                open.position,
                &SyntaxError::MissingRightBracket {
                    flag: flag.text.clone(),
                },
            );
            self.stream.end_position() + 1
        };

        // Adopts every syntax error recorded within the brackets.
        self.errors
            .insert_group(ErrorGroup::new(path.to_string(), open.position, end));

        Some(Node::Group {
            flag: Located::from(flag),
            children,
            span: (open.position, end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::entity::test::Recorder;
    use crate::context::{Declaration, Documentation, ResolvedConfig, ScopeConfig};
    use crate::error::ErrorEntry;
    use crate::model::{Flag, Nargs};
    use crate::scanner::scan;
    use rstest::rstest;

    fn option(flag: &str) -> Declaration<'static> {
        Declaration::Option {
            flag: Flag::new(flag),
            documentation: Documentation::default(),
            capture: Box::new(Recorder::default()),
        }
    }

    fn switch(flag: &str) -> Declaration<'static> {
        Declaration::Option {
            flag: Flag::new(flag),
            documentation: Documentation::default(),
            capture: Box::new(Recorder {
                implicit: Some("true"),
                ..Recorder::default()
            }),
        }
    }

    fn multi(flag: &str) -> Declaration<'static> {
        Declaration::Option {
            flag: Flag::new(flag),
            documentation: Documentation::default(),
            capture: Box::new(Recorder {
                nargs: Some(Nargs::AtLeastOne),
                ..Recorder::default()
            }),
        }
    }

    fn group_declaration(flag: &str, scope: Context<'static>) -> Declaration<'static> {
        Declaration::Group {
            flag: Flag::new(flag).alias("-G"),
            documentation: Documentation::default(),
            scope,
        }
    }

    fn context(policy: PositionalPolicy) -> Context<'static> {
        let mut inner = Context::default();
        inner.declare(option("-x"));
        inner.declare(multi("-m"));
        let mut root = Context::new(ScopeConfig::default().positional_policy(policy));
        root.declare(option("-x"));
        root.declare(option("-y"));
        root.declare(switch("--verbose"));
        root.declare(multi("--many"));
        root.declare(group_declaration("--g", inner));
        root.resolve_config(&ResolvedConfig::default());
        root
    }

    fn run(input: &str) -> (Statement, ErrorGroup) {
        run_with(input, PositionalPolicy::Interleaved)
    }

    fn run_with(input: &str, policy: PositionalPolicy) -> (Statement, ErrorGroup) {
        let mut errors = ErrorGroup::root("Syntax");
        let tokens = scan(input, &mut errors);
        let statement = parse(tokens, &context(policy), &mut errors);
        (statement, errors)
    }

    fn option_node(flag: (&str, usize), value: (&str, usize)) -> Node {
        Node::Option {
            flag: Located::new(flag.0, flag.1),
            value: Located::new(value.0, value.1),
        }
    }

    fn positional(value: &str, position: usize) -> Node {
        Node::Positional {
            value: Located::new(value, position),
        }
    }

    fn kinds(errors: &ErrorGroup) -> Vec<ErrorKind> {
        errors.messages().iter().map(|m| m.kind()).collect()
    }

    #[test]
    fn empty() {
        let (statement, errors) = run("");
        assert_eq!(statement.nodes, vec![]);
        assert_eq!(statement.end, 0);
        assert!(!errors.has_errors());
    }

    #[rstest]
    #[case("-x 1", vec![option_node(("-x", 0), ("1", 3))])]
    #[case("-x=1", vec![option_node(("-x", 0), ("1", 3))])]
    #[case("-x = 1", vec![option_node(("-x", 0), ("1", 5))])]
    #[case("-x -5", vec![option_node(("-x", 0), ("-5", 3))])]
    #[case("-x \"-y\"", vec![option_node(("-x", 0), ("-y", 3))])]
    #[case("-x=-y", vec![option_node(("-x", 0), ("-y", 3))])]
    #[case("-x 1 -x 2", vec![option_node(("-x", 0), ("1", 3)), option_node(("-x", 5), ("2", 8))])]
    #[case("a -y b c", vec![positional("a", 0), option_node(("-y", 2), ("b", 5)), positional("c", 7)])]
    #[case("\"-x\"", vec![positional("-x", 0)])]
    fn single_value(#[case] input: &str, #[case] expected: Vec<Node>) {
        let (statement, errors) = run(input);
        assert_eq!(statement.nodes, expected);
        assert!(!errors.has_errors(), "{errors}");
    }

    #[rstest]
    #[case("--verbose", vec![option_node(("--verbose", 0), ("true", 9))])]
    #[case("--verbose -x 1", vec![option_node(("--verbose", 0), ("true", 9)), option_node(("-x", 10), ("1", 13))])]
    #[case("--verbose false", vec![option_node(("--verbose", 0), ("false", 10))])]
    #[case("--g [ ] --verbose", vec![
        Node::Group { flag: Located::new("--g", 0), children: vec![], span: (4, 7) },
        option_node(("--verbose", 8), ("true", 17)),
    ])]
    fn implicit_value(#[case] input: &str, #[case] expected: Vec<Node>) {
        let (statement, errors) = run(input);
        assert_eq!(statement.nodes, expected);
        assert!(!errors.has_errors(), "{errors}");
    }

    #[rstest]
    #[case("-x", 2)]
    #[case("-x -y 1", 2)]
    #[case("-x=", 3)]
    #[case("-x = ", 4)]
    #[case("-x [", 2)]
    #[case("--many", 6)]
    #[case("--many -x 1", 6)]
    #[case("--many=", 7)]
    fn missing_value(#[case] input: &str, #[case] position: usize) {
        let (_, errors) = run(input);
        let messages = errors.of_kind(ErrorKind::MissingValue);
        assert_eq!(messages.len(), 1, "{errors}");
        assert_eq!(messages[0].position(), position);
    }

    #[test]
    fn missing_value_message() {
        let (statement, errors) = run("-x");
        assert_eq!(statement.nodes, vec![]);
        assert_eq!(errors.count(), 1);
        assert_eq!(errors.messages()[0].text(), "Flag '-x' is missing a value.");
    }

    #[rstest]
    #[case("--many a b c", vec!["a", "b", "c"], vec![])]
    #[case("--many a b -x 1", vec!["a", "b"], vec![option_node(("-x", 11), ("1", 14))])]
    #[case("--many=a b", vec!["a"], vec![positional("b", 9)])]
    #[case("--many a \"-x\"", vec!["a", "-x"], vec![])]
    #[case("--many a -- b", vec!["a"], vec![positional("b", 12)])]
    fn multi_value(#[case] input: &str, #[case] values: Vec<&str>, #[case] rest: Vec<Node>) {
        let (statement, errors) = run(input);
        assert!(!errors.has_errors(), "{errors}");
        assert_matches!(&statement.nodes[0], Node::MultiOption { flag, values: actual } => {
            assert_eq!(flag.text, "--many");
            assert_eq!(actual.iter().map(|v| v.text.as_str()).collect::<Vec<&str>>(), values);
        });
        assert_eq!(statement.nodes[1..].to_vec(), rest);
    }

    #[test]
    fn group() {
        // Setup
        let input = "-x 10 --g [ -x 20 ]";

        // Execute
        let (statement, errors) = run(input);

        // Verify
        assert!(!errors.has_errors(), "{errors}");
        assert_eq!(
            statement.nodes,
            vec![
                option_node(("-x", 0), ("10", 3)),
                Node::Group {
                    flag: Located::new("--g", 6),
                    children: vec![option_node(("-x", 12), ("20", 15))],
                    span: (10, 19),
                },
            ]
        );
    }

    #[test]
    fn group_alias() {
        let (statement, errors) = run("-G [-m 1 2]");
        assert!(!errors.has_errors(), "{errors}");
        assert_matches!(&statement.nodes[0], Node::Group { flag, children, .. } => {
            assert_eq!(flag.text, "-G");
            assert_eq!(children.len(), 1);
        });
    }

    #[test]
    fn group_scopes_flags() {
        // '-y' is only declared at the root.
        let (_, errors) = run("--g [ -y 1 ]");
        assert_eq!(kinds(&errors), vec![ErrorKind::UnknownFlag]);
        assert_matches!(&errors.entries()[0], ErrorEntry::Group(group) => {
            assert_eq!(group.name(), "--g");
            assert_eq!(group.messages()[0].text(), "Unknown flag '-y' in scope '--g'.");
        });
    }

    #[test]
    fn missing_left_bracket() {
        let (statement, errors) = run("--g -x 1");
        assert_eq!(kinds(&errors), vec![ErrorKind::MissingLeftBracket]);
        assert_eq!(errors.messages()[0].position(), 3);
        assert_eq!(statement.nodes, vec![option_node(("-x", 4), ("1", 7))]);
    }

    #[test]
    fn missing_right_bracket() {
        // Setup
        let input = "-x 1 --g [ -x 2";

        // Execute
        let (statement, errors) = run(input);

        // Verify
        assert_eq!(kinds(&errors), vec![ErrorKind::MissingRightBracket]);
        assert_matches!(&errors.entries()[0], ErrorEntry::Group(group) => {
            assert_eq!(group.start(), 9);
            assert_eq!(group.end(), 16);
            assert_eq!(group.messages()[0].position(), 9);
        });
        assert_matches!(&statement.nodes[1], Node::Group { children, span, .. } => {
            assert_eq!(children, &vec![option_node(("-x", 11), ("2", 14))]);
            assert_eq!(span, &(9, 16));
        });
    }

    #[rstest]
    #[case("]", vec![0])]
    #[case("-x 1 ] -y 2", vec![5])]
    #[case("] ]", vec![0, 2])]
    #[case("--g [ ] ]", vec![8])]
    fn unmatched_right_bracket(#[case] input: &str, #[case] positions: Vec<usize>) {
        let (_, errors) = run(input);
        let messages = errors.of_kind(ErrorKind::UnmatchedRightBracket);
        assert_eq!(
            messages.iter().map(|m| m.position()).collect::<Vec<usize>>(),
            positions
        );
        assert_eq!(errors.count(), positions.len());
    }

    #[test]
    fn unmatched_right_bracket_keeps_parsing() {
        let (statement, _) = run("-x 1 ] -y 2");
        assert_eq!(
            statement.nodes,
            vec![option_node(("-x", 0), ("1", 3)), option_node(("-y", 7), ("2", 10))]
        );
    }

    #[rstest]
    #[case("--unknown a b -x 1", vec![option_node(("-x", 14), ("1", 17))])]
    #[case("--unknown [ -x 1 ] -y 2", vec![option_node(("-y", 19), ("2", 22))])]
    #[case("-z", vec![])]
    #[case("-x 1 -z p", vec![option_node(("-x", 0), ("1", 3))])]
    fn unknown_flag_recovers(#[case] input: &str, #[case] expected: Vec<Node>) {
        let (statement, errors) = run(input);
        assert_eq!(kinds(&errors), vec![ErrorKind::UnknownFlag]);
        assert_eq!(statement.nodes, expected);
    }

    #[test]
    fn unknown_flag_within_group() {
        // Recovery stops at the group's ']' and parsing resumes at the root.
        let (statement, errors) = run("--g [ --nope 1 ] -y 2");
        assert_eq!(kinds(&errors), vec![ErrorKind::UnknownFlag]);
        assert_matches!(&statement.nodes[0], Node::Group { children, span, .. } => {
            assert!(children.is_empty());
            assert_eq!(span, &(4, 16));
        });
        assert_eq!(statement.nodes[1], option_node(("-y", 17), ("2", 20)));
    }

    #[rstest]
    #[case("[ a ] -x 1", ErrorKind::UnexpectedToken, 0)]
    #[case("= -x 1", ErrorKind::UnexpectedToken, 0)]
    fn unexpected_token(#[case] input: &str, #[case] kind: ErrorKind, #[case] position: usize) {
        let (statement, errors) = run(input);
        assert_eq!(kinds(&errors), vec![kind]);
        assert_eq!(errors.messages()[0].position(), position);
        assert_eq!(statement.nodes.len(), 1);
    }

    #[rstest]
    #[case(PositionalPolicy::Interleaved, "-x 10 -- -x 20", vec![option_node(("-x", 0), ("10", 3)), positional("-x", 9), positional("20", 12)])]
    #[case(PositionalPolicy::AfterFlags, "-x 10 -- -x 20", vec![option_node(("-x", 0), ("10", 3)), positional("-x", 9), positional("20", 12)])]
    #[case(PositionalPolicy::BeforeFlags, "-x 10 -- -x 20", vec![positional("-x", 0), positional("10", 3), option_node(("-x", 9), ("20", 12))])]
    #[case(PositionalPolicy::Interleaved, "--g [ -- -x ] -x 1", vec![
        Node::Group { flag: Located::new("--g", 0), children: vec![positional("-x", 9)], span: (4, 13) },
        option_node(("-x", 14), ("1", 17)),
    ])]
    fn double_dash(
        #[case] policy: PositionalPolicy,
        #[case] input: &str,
        #[case] expected: Vec<Node>,
    ) {
        let (statement, errors) = run_with(input, policy);
        assert!(!errors.has_errors(), "{errors}");
        assert_eq!(statement.nodes, expected);
    }

    #[test]
    fn double_dash_ends_value() {
        let (statement, errors) = run("-x -- -y");
        assert_eq!(kinds(&errors), vec![ErrorKind::MissingValue]);
        assert_eq!(errors.messages()[0].position(), 2);
        assert_eq!(statement.nodes, vec![positional("-y", 6)]);
    }

    #[rstest]
    #[case("-- a -- b", vec![5])]
    #[case("-- -- --", vec![3, 6])]
    #[case("-- --g [ -- ] --", vec![14])]
    fn multiple_double_dash(#[case] input: &str, #[case] positions: Vec<usize>) {
        let (_, errors) = run(input);
        let messages = errors.of_kind(ErrorKind::MultipleDoubleDash);
        assert_eq!(
            messages.iter().map(|m| m.position()).collect::<Vec<usize>>(),
            positions
        );
    }

    #[test]
    fn errors_in_document_order() {
        let (_, errors) = run("-z --g [ -q ] -x");
        let positions: Vec<usize> = errors.messages().iter().map(|m| m.position()).collect();
        assert_eq!(positions, vec![0, 9, 16]);
    }
}
