use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

use crate::constant::DOUBLE_DASH;
use crate::error::{Diagnostic, ErrorGroup, ErrorKind};
use crate::scanner::model::*;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LexError {
    #[error("Unterminated string literal (missing closing {quote}).")]
    UnterminatedString { quote: char },

    #[error("Unknown escape sequence '\\{escape}'.")]
    UnknownEscape { escape: char },
}

impl Diagnostic for LexError {
    fn kind(&self) -> ErrorKind {
        match self {
            LexError::UnterminatedString { .. } => ErrorKind::UnterminatedString,
            LexError::UnknownEscape { .. } => ErrorKind::UnknownEscape,
        }
    }
}

/// Scan the input into a flat token stream, always terminated by an `End` token at the input length.
/// Lexical errors are recorded into `errors`; scanning itself never fails.
pub(crate) fn scan(input: &str, errors: &mut ErrorGroup) -> Vec<Token> {
    let mut tokens = Vec::default();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '[' => {
                chars.next();
                tokens.push(Token::new(TokenKind::LeftBracket, "[", position));
            }
            ']' => {
                chars.next();
                tokens.push(Token::new(TokenKind::RightBracket, "]", position));
            }
            '=' => {
                chars.next();
                tokens.push(Token::new(TokenKind::Equals, "=", position));
            }
            '"' | '\'' => {
                chars.next();
                tokens.push(scan_string(position, c, input.len(), &mut chars, errors));
            }
            _ => {
                let end = scan_word(input.len(), &mut chars);
                let text = &input[position..end];
                let kind = if text == DOUBLE_DASH {
                    TokenKind::DoubleDash
                } else {
                    TokenKind::Identifier
                };
                tokens.push(Token::new(kind, text, position));
            }
        }
    }

    tokens.push(Token::new(TokenKind::End, "", input.len()));

    #[cfg(feature = "tracing_debug")]
    {
        debug!("Scanned {} tokens from {} bytes.", tokens.len(), input.len());
    }

    tokens
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '[' || c == ']' || c == '='
}

// Returns the (exclusive) byte offset at which the word ends.
fn scan_word(input_length: usize, chars: &mut Peekable<CharIndices<'_>>) -> usize {
    while let Some(&(position, c)) = chars.peek() {
        if is_separator(c) {
            return position;
        }

        chars.next();
    }

    input_length
}

fn scan_string(
    quote_position: usize,
    quote: char,
    input_length: usize,
    chars: &mut Peekable<CharIndices<'_>>,
    errors: &mut ErrorGroup,
) -> Token {
    let mut text = String::default();
    let mut end = input_length;

    loop {
        match chars.next() {
            None => {
                errors.add(quote_position, &LexError::UnterminatedString { quote });
                break;
            }
            Some((close, c)) if c == quote => {
                end = close + c.len_utf8();
                break;
            }
            Some((escape_position, '\\')) => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 'r')) => text.push('\r'),
                Some((_, 't')) => text.push('\t'),
                Some((_, '"')) => text.push('"'),
                Some((_, '\'')) => text.push('\''),
                Some((_, '\\')) => text.push('\\'),
                Some((_, escape)) => {
                    errors.add(escape_position, &LexError::UnknownEscape { escape });
                    text.push('\\');
                    text.push(escape);
                }
                None => {
                    errors.add(quote_position, &LexError::UnterminatedString { quote });
                    break;
                }
            },
            Some((_, c)) => text.push(c),
        }
    }

    Token::spanning(TokenKind::StringLiteral, text, quote_position, end)
}
