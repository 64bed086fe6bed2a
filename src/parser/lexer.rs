//! Lexer for build scripts
//!
//! Tokenizes input into a stream of tokens that the parser consumes.
//! It handles:
//! - Command names and unquoted arguments
//! - Quoted arguments (escape sequences are kept verbatim for the
//!   expansion stage to decode)
//! - Parentheses, which double as argument-list delimiters and as
//!   grouping tokens inside conditions
//! - Comments (# to end of line)

use crate::parser::types::{ParseError, MAX_INPUT_SIZE, MAX_TOKENS};

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted word: a command name or a bare argument.
    Word,
    /// Quoted argument, without the surrounding quotes.
    Quoted,
    LParen,
    RParen,
}

/// A single lexed token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line where the token starts.
    pub line: u32,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Self { kind, text: text.into(), line }
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')' && c != '#' && c != '"'
}

/// Tokenize a whole script.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    if input.len() > MAX_INPUT_SIZE {
        return Err(ParseError::InputTooLarge);
    }

    let chars: Vec<char> = input.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut line: u32 = 1;
    let mut i = 0;

    while i < chars.len() {
        if tokens.len() > MAX_TOKENS {
            return Err(ParseError::TooManyTokens);
        }

        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '(' {
            tokens.push(Token::new(TokenKind::LParen, "(", line));
            i += 1;
            continue;
        }
        if c == ')' {
            tokens.push(Token::new(TokenKind::RParen, ")", line));
            i += 1;
            continue;
        }
        if c == '"' {
            let start_line = line;
            let mut text = String::new();
            i += 1;
            loop {
                if i >= chars.len() {
                    return Err(ParseError::UnterminatedString { line: start_line });
                }
                let ch = chars[i];
                if ch == '"' {
                    i += 1;
                    break;
                }
                // Escapes stay verbatim; they only suppress the closing quote here.
                if ch == '\\' && i + 1 < chars.len() {
                    text.push(ch);
                    if chars[i + 1] == '\n' {
                        line += 1;
                    }
                    text.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                if ch == '\n' {
                    line += 1;
                }
                text.push(ch);
                i += 1;
            }
            tokens.push(Token::new(TokenKind::Quoted, text, start_line));
            continue;
        }

        // Unquoted word
        let start_line = line;
        let mut text = String::new();
        while i < chars.len() {
            let ch = chars[i];
            if ch == '\\' && i + 1 < chars.len() {
                text.push(ch);
                text.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if !is_word_char(ch) {
                break;
            }
            text.push(ch);
            i += 1;
        }
        tokens.push(Token::new(TokenKind::Word, text, start_line));
    }

    Ok(tokens)
}
