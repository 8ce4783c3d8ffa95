#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TokenKind {
    LeftBracket,
    RightBracket,
    Identifier,
    StringLiteral,
    Equals,
    DoubleDash,
    End,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftBracket => write!(f, "'['"),
            TokenKind::RightBracket => write!(f, "']'"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::DoubleDash => write!(f, "'--'"),
            TokenKind::End => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
    // Exclusive byte offset of the token's source text (quotes and escapes included).
    end: usize,
}

impl Token {
    /// A token whose source text is its `text`, except that string literals are taken to be quoted without escapes.
    pub(crate) fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        let text = text.into();
        let end = match kind {
            TokenKind::StringLiteral => position + text.len() + 2,
            TokenKind::End => position,
            _ => position + text.len(),
        };
        Self::spanning(kind, text, position, end)
    }

    pub(crate) fn spanning(
        kind: TokenKind,
        text: impl Into<String>,
        position: usize,
        end: usize,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            end,
        }
    }

    /// Whether this token may serve as a value (or positional).
    pub(crate) fn is_value(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::StringLiteral)
    }

    /// The position just past this token's text, as it appeared in the input.
    pub(crate) fn end(&self) -> usize {
        self.end
    }
}
