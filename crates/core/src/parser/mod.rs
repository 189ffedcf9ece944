//! Content-stream parsing.
//!
//! - `lexer` - tokenizer
//! - `content` - operand/operator parser and instruction-tree builder

pub mod content;
pub mod lexer;

pub use content::{ContentParser, Instruction, TreeBuilder, build_operation, parse_content};
pub use lexer::{ContentLexer, Token};
