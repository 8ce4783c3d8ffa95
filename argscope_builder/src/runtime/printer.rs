use crate::error::{ErrorEntry, ErrorGroup};
use crate::runtime::{Diagnostics, UserInterface};

/// The input line, with a caret under the offending position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    offset: usize,
    input: String,
}

impl ErrorContext {
    /// `offset` is the byte offset into `input`.
    pub(crate) fn new(offset: usize, input: impl Into<String>) -> Self {
        Self {
            offset,
            input: input.into(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.input.chars().count();
        let column = match self.input.get(..self.offset) {
            Some(prefix) => prefix.chars().count(),
            None => length,
        };

        write!(
            f,
            "{}\n{:width$}^",
            self.input,
            "",
            width = std::cmp::min(column, length)
        )
    }
}

/// Print every error of the `diagnostics`, one section per phase.
pub(crate) fn print_diagnostics(diagnostics: &Diagnostics, user_interface: &dyn UserInterface) {
    for group in diagnostics.groups() {
        user_interface.print_error(format!("{}:", group.name()));
        print_entries(group, diagnostics.input(), 2, user_interface);
    }
}

fn print_entries(
    group: &ErrorGroup,
    input: &str,
    indent: usize,
    user_interface: &dyn UserInterface,
) {
    for entry in group.entries() {
        match entry {
            ErrorEntry::Message(message) => {
                user_interface.print_error(format!("{:indent$}{}", "", message.text()));
                user_interface.print_error_context(ErrorContext::new(message.position(), input));
            }
            ErrorEntry::Group(inner) => {
                user_interface.print_error(format!("{:indent$}{}:", "", inner.name()));
                print_entries(inner, input, indent + 2, user_interface);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxError;
    use crate::runtime::util::InMemoryInterface;
    use crate::scanner::scan;
    use rstest::rstest;

    #[rstest]
    #[case(0, "", "\n^")]
    #[case(3, "", "\n^")]
    #[case(0, "abc", "abc\n^")]
    #[case(1, "abc", "abc\n ^")]
    #[case(3, "abc", "abc\n   ^")]
    #[case(7, "abc", "abc\n   ^")]
    #[case(4, "abc 123", "abc 123\n    ^")]
    fn error_context(#[case] offset: usize, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(ErrorContext::new(offset, input).to_string(), expected);
    }

    #[test]
    fn error_context_multibyte() {
        let input = "ñandú [x";
        assert_eq!(
            ErrorContext::new("ñandú ".len(), input).to_string(),
            "ñandú [x\n      ^"
        );
    }

    #[test]
    fn print_sections() {
        // Setup
        let input = "-x \"abc";
        let mut syntax = ErrorGroup::root("Syntax");
        scan(input, &mut syntax);
        let diagnostics = Diagnostics::from_parts(
            input,
            syntax,
            ErrorGroup::root("Analysis"),
            ErrorGroup::root("Constraint"),
        );
        let interface = InMemoryInterface::default();

        // Execute
        print_diagnostics(&diagnostics, &interface);

        // Verify
        let output = interface.consume();
        assert_eq!(output.errors.len(), 2);
        assert_eq!(output.errors[0], "Syntax:");
        assert!(output.errors[1].starts_with("  "));
        assert_eq!(output.error_contexts, vec![ErrorContext::new(3, input)]);
    }

    #[test]
    fn print_nested() {
        // Setup
        let input = "--g [ ] ]";
        let mut syntax = ErrorGroup::root("Syntax");
        let mut inner = ErrorGroup::new("--g", 4, 7);
        inner.add(6, &SyntaxError::UnmatchedRightBracket);
        syntax.insert_group(inner);
        syntax.add(8, &SyntaxError::UnmatchedRightBracket);
        let diagnostics = Diagnostics::from_parts(
            input,
            syntax,
            ErrorGroup::root("Analysis"),
            ErrorGroup::root("Constraint"),
        );
        let interface = InMemoryInterface::default();

        // Execute
        print_diagnostics(&diagnostics, &interface);

        // Verify
        let output = interface.consume();
        assert_eq!(
            output.errors,
            vec![
                "Syntax:",
                "  --g:",
                "    Unmatched ']'.",
                "  Unmatched ']'.",
            ]
        );
        assert_eq!(
            output.error_contexts,
            vec![ErrorContext::new(6, input), ErrorContext::new(8, input)]
        );
    }
}
