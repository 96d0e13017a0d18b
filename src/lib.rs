//! Crate root: wires together the compilation pipeline.
//!
//! The stages are intentionally small and composable so they can be evolved
//! independently:
//! - `tokenizer` performs lexical analysis and hands out one token at a time.
//! - `parser` owns all syntactic knowledge and returns a typed syntax tree.
//! - `codegen` lowers the tree into LLVM-flavoured textual IR.
//! - `error` centralises the fatal error tiers shared by the other stages.
//!
//! The tree is the sole contract between parsing and generation: the two
//! stages share no mutable state, so each can be tested on its own by
//! building or inspecting trees directly.

pub mod codegen;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use error::{CompileError, CompileResult};

/// Compile a source program into textual IR.
pub fn compile(source: &str) -> CompileResult<String> {
  let tokenizer = tokenizer::Tokenizer::new(source);
  let program = parser::parse(tokenizer)?;
  Ok(codegen::generate(&program))
}
