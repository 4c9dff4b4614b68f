// SPDX-License-Identifier: MIT

//! Requirement tokenizer
//!
//! A single regular scan recognizes, in order of priority:
//! - a lone `(` or `)`
//! - an operator: `&&`, `||` or the legacy `|` (read as `&&`)
//! - a condition segment, optionally carrying one `name(argument)` pair
//!
//! Characters no alternative matches (a lone `&`) are skipped.

use super::ast::{Condition, Operator, Paren, Token};
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*([()])\s*|\s*(\|\||&&|\|)\s*|\s*((?:[^()&|]+\([^()]+\))|[^()&|]+)\s*")
        .expect("token pattern is a valid regex")
});

/// Old spelling of `eager`
const LEGACY_EAGER: &str = "immediate";

/// Split a requirement string into tokens
pub fn tokenize(expression: &str) -> Vec<Token> {
    TOKEN_PATTERN
        .captures_iter(expression)
        .filter_map(|caps| {
            if let Some(paren) = caps.get(1) {
                let paren = if paren.as_str() == "(" {
                    Paren::Open
                } else {
                    Paren::Close
                };
                Some(Token::Paren(paren))
            } else if let Some(operator) = caps.get(2) {
                let operator = match operator.as_str() {
                    "||" => Operator::Or,
                    _ => Operator::And,
                };
                Some(Token::Operator(operator))
            } else {
                caps.get(3)
                    .map(|segment| Token::Condition(parse_segment(segment.as_str())))
            }
        })
        .collect()
}

fn parse_segment(segment: &str) -> Condition {
    let mut condition = match segment.find('(') {
        Some(open) => {
            let rest = &segment[open + 1..];
            let argument = match rest.find(')') {
                Some(close) => &rest[..close],
                None => rest,
            };
            Condition::with_argument(segment[..open].trim(), argument)
        }
        None => Condition::new(segment.trim()),
    };

    if condition.name == LEGACY_EAGER {
        condition.name = "eager".to_string();
    }

    condition
}
