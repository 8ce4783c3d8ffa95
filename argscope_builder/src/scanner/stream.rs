use std::collections::BTreeSet;

use crate::scanner::model::*;

// What consuming a token did to the bracket bookkeeping, so it can be undone on rewind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketEffect {
    Untouched,
    Opened,
    Closed(usize),
    Unmatched,
}

/// An ordered, randomly rewindable token sequence with bracket accounting layered on top.
#[derive(Debug)]
pub(crate) struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
    open: Vec<usize>,
    journal: Vec<BracketEffect>,
    unmatched: BTreeSet<usize>,
}

impl TokenStream {
    pub(crate) fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::End, .. })) {
            let end = tokens.last().map(Token::end).unwrap_or(0);
            tokens.push(Token::new(TokenKind::End, "", end));
        }

        Self {
            tokens,
            cursor: 0,
            open: Vec::default(),
            journal: Vec::default(),
            unmatched: BTreeSet::default(),
        }
    }

    /// The next token, without consuming it.
    pub(crate) fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// The token `n` places ahead of the cursor, without consuming anything.
    /// Looking past the end yields the `End` token.
    pub(crate) fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[std::cmp::min(self.cursor + n, last)]
    }

    /// Consume the next token.
    /// The `End` token is never consumed: it is returned repeatedly.
    pub(crate) fn consume(&mut self) -> Token {
        let token = self.peek().clone();

        if token.kind == TokenKind::End {
            return token;
        }

        let effect = match token.kind {
            TokenKind::LeftBracket => {
                self.open.push(token.position);
                BracketEffect::Opened
            }
            TokenKind::RightBracket => match self.open.pop() {
                Some(opened) => BracketEffect::Closed(opened),
                None => {
                    self.unmatched.insert(token.position);
                    BracketEffect::Unmatched
                }
            },
            _ => BracketEffect::Untouched,
        };

        self.journal.push(effect);
        self.cursor += 1;
        token
    }

    /// Step back by `n` consumed tokens (bounded at the start of the stream), undoing their bracket accounting.
    pub(crate) fn rewind(&mut self, n: usize) {
        for _ in 0..n {
            match self.journal.pop() {
                Some(effect) => {
                    self.cursor -= 1;

                    match effect {
                        BracketEffect::Untouched => {}
                        BracketEffect::Opened => {
                            self.open.pop();
                        }
                        BracketEffect::Closed(opened) => self.open.push(opened),
                        BracketEffect::Unmatched => {
                            self.unmatched.remove(&self.tokens[self.cursor].position);
                        }
                    }
                }
                None => break,
            }
        }
    }

    /// The number of currently open (unclosed) brackets.
    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    /// The positions of every `]` consumed without a matching `[`.
    pub(crate) fn unmatched(&self) -> impl Iterator<Item = usize> + '_ {
        self.unmatched.iter().copied()
    }

    /// The position of the `End` token (the input length).
    pub(crate) fn end_position(&self) -> usize {
        self.tokens[self.tokens.len() - 1].position
    }
}
