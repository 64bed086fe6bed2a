//! Parser for build scripts
//!
//! Consumes the token stream and produces a flat list of invocations.
//! Parentheses inside an argument list are kept as bare `(` / `)`
//! arguments; the invocation ends on the parenthesis balancing the one
//! that opened the list.

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::ast::types::{Invocation, RawArgument, SourceLocation};
use crate::parser::lexer::{tokenize, Token, TokenKind};
use crate::parser::types::ParseError;

lazy_static! {
    static ref COMMAND_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Parse a script into invocations. `file` names the script in source
/// locations and diagnostics.
pub fn parse(input: &str, file: &str) -> Result<Vec<Invocation>, ParseError> {
    let tokens = tokenize(input)?;
    let mut invocations = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.kind != TokenKind::Word {
            return Err(ParseError::UnexpectedToken {
                line: tok.line,
                token: tok.text.clone(),
            });
        }
        if !COMMAND_NAME.is_match(&tok.text) {
            return Err(ParseError::InvalidCommandName {
                line: tok.line,
                name: tok.text.clone(),
            });
        }

        let name = tok.text.clone();
        let location = SourceLocation::new(file, tok.line);
        i += 1;

        match tokens.get(i) {
            Some(t) if t.kind == TokenKind::LParen => i += 1,
            _ => {
                return Err(ParseError::MissingOpenParen {
                    line: tok.line,
                    name,
                })
            }
        }

        let (args, next) = collect_arguments(&tokens, i, &name, tok.line)?;
        i = next;
        invocations.push(Invocation::new(name, args, location));
    }

    Ok(invocations)
}

/// Collect arguments up to the parenthesis balancing the opening one.
/// Returns the arguments and the index just past the closing parenthesis.
fn collect_arguments(
    tokens: &[Token],
    mut i: usize,
    name: &str,
    open_line: u32,
) -> Result<(Vec<RawArgument>, usize), ParseError> {
    let mut args = Vec::new();
    let mut depth = 1u32;

    while i < tokens.len() {
        let tok = &tokens[i];
        match tok.kind {
            TokenKind::LParen => {
                depth += 1;
                args.push(RawArgument::new("(", false, tok.line));
            }
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok((args, i + 1));
                }
                args.push(RawArgument::new(")", false, tok.line));
            }
            TokenKind::Word => args.push(RawArgument::new(tok.text.clone(), false, tok.line)),
            TokenKind::Quoted => args.push(RawArgument::new(tok.text.clone(), true, tok.line)),
        }
        i += 1;
    }

    Err(ParseError::UnbalancedParen {
        line: open_line,
        name: name.to_string(),
    })
}
