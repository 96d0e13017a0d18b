//! Shared error types for the compilation pipeline.
//!
//! Every detected problem is fatal to the current compilation run: the
//! lexical tier reports input outside the language's alphabet, the syntax
//! tier reports a token that fits no production at the current non-terminal.
//! Neither tier is recovered from, and there is no warning tier. Positions
//! are reported 1-based.

use snafu::Snafu;

use crate::tokenizer::TokenKind;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum CompileError {
  /// A character outside the lexical alphabet. Raised below the parser,
  /// so it never carries expected-token information.
  #[snafu(display("line {line}, column {column}: unexpected character '{found}'"))]
  UnexpectedCharacter {
    found: char,
    line: usize,
    column: usize,
  },

  /// A numeric literal that does not fit in a 32-bit signed integer.
  #[snafu(display("line {line}, column {column}: number '{text}' is out of range"))]
  InvalidNumber {
    text: String,
    line: usize,
    column: usize,
  },

  /// The current token cannot continue any production. `expected` is
  /// `None` when more than one token kind would have been acceptable.
  #[snafu(display(
    "syntax error at line {}, column {}: expected {}, found {}",
    line,
    column,
    describe_expected(expected),
    found
  ))]
  Syntax {
    line: usize,
    column: usize,
    expected: Option<TokenKind>,
    found: TokenKind,
  },
}

fn describe_expected(expected: &Option<TokenKind>) -> String {
  match expected {
    Some(kind) => kind.to_string(),
    None => "a valid token".to_string(),
  }
}
