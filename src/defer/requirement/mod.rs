// SPDX-License-Identifier: MIT

//! Requirement expressions
//!
//! This module provides parsing and evaluation of requirement strings.
//! Requirements combine named strategies with AND/OR:
//! - `eager`
//! - `media(min-width: 600px)`
//! - `visible && idle`
//! - `(event(a) || event(b)) && visible`

mod ast;
mod evaluator;
mod parser;
mod tokenizer;

pub use ast::{Condition, Operator, Paren, Requirement, Token};
pub use evaluator::{await_requirements, evaluate};
pub use parser::parse;
pub use tokenizer::tokenize;
