// SPDX-License-Identifier: MIT

//! Recursive-descent requirement parser
//!
//! Parses expressions like:
//! - `eager`
//! - `visible && idle`
//! - `(event(a) || event(b)) && visible`
//!
//! AND and OR bind identically and fold left to right: `a && b || c` is
//! `(a && b) || c`. An operand joining a node with the same operator is
//! appended to it instead of nesting.

use super::ast::{Paren, Requirement, Token};
use super::tokenizer::tokenize;
use crate::kit::error::ParseError;
use std::iter::Peekable;
use std::vec::IntoIter;

/// Parse a requirement string into a tree whose root is always an expression
pub fn parse(expression: &str) -> Result<Requirement, ParseError> {
    // whitespace alone would scan as a condition with an empty name
    if expression.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let tokens = tokenize(expression);
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    log::debug!("Tokenized requirement '{}': {:?}", expression, tokens);

    let mut parser = Parser::new(tokens);
    let ast = parser.parse_expression()?;

    let trailing = parser.remaining();
    if trailing > 0 {
        log::debug!(
            "Ignoring {} trailing token(s) in requirement '{}'",
            trailing,
            expression
        );
    }

    // A lone condition is treated as an AND with one operand
    Ok(match ast {
        condition @ Requirement::Condition(_) => Requirement::and(vec![condition]),
        expression => expression,
    })
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    position: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            position: 0,
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.next();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn remaining(&mut self) -> usize {
        self.tokens.by_ref().count()
    }

    fn parse_expression(&mut self) -> Result<Requirement, ParseError> {
        let mut ast = self.parse_term()?;

        while let Some(&Token::Operator(operator)) = self.peek() {
            self.advance();
            let right = self.parse_term()?;

            ast = match ast {
                Requirement::Expression {
                    operator: current,
                    mut operands,
                } if current == operator => {
                    operands.push(right);
                    Requirement::Expression { operator, operands }
                }
                left => Requirement::Expression {
                    operator,
                    operands: vec![left, right],
                },
            };
        }

        Ok(ast)
    }

    fn parse_term(&mut self) -> Result<Requirement, ParseError> {
        let position = self.position;
        match self.advance() {
            Some(Token::Paren(Paren::Open)) => {
                let ast = self.parse_expression()?;
                // A missing close paren is tolerated
                if let Some(Token::Paren(Paren::Close)) = self.peek() {
                    self.advance();
                }
                Ok(ast)
            }
            Some(Token::Condition(condition)) => Ok(Requirement::Condition(condition)),
            Some(token) => Err(ParseError::UnexpectedToken {
                token: token.to_string(),
                position,
            }),
            None => Err(ParseError::UnexpectedEnd { position }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defer::requirement::ast::Condition;

    fn c(name: &str) -> Requirement {
        Requirement::condition(name)
    }

    #[test]
    fn test_single_condition_is_normalized_to_and() {
        assert_eq!(parse("visible").unwrap(), Requirement::and(vec![c("visible")]));
    }

    #[test]
    fn test_same_operator_is_flattened() {
        assert_eq!(
            parse("a && b && c").unwrap(),
            Requirement::and(vec![c("a"), c("b"), c("c")])
        );
        assert_eq!(
            parse("a || b || c").unwrap(),
            Requirement::or(vec![c("a"), c("b"), c("c")])
        );
    }

    #[test]
    fn test_mixed_operators_fold_left() {
        assert_eq!(
            parse("a && b || c").unwrap(),
            Requirement::or(vec![Requirement::and(vec![c("a"), c("b")]), c("c")])
        );
        // No precedence: OR then AND still folds left
        assert_eq!(
            parse("a || b && c").unwrap(),
            Requirement::and(vec![Requirement::or(vec![c("a"), c("b")]), c("c")])
        );
    }

    #[test]
    fn test_parentheses_group() {
        assert_eq!(
            parse("(a || b) && c").unwrap(),
            Requirement::and(vec![Requirement::or(vec![c("a"), c("b")]), c("c")])
        );
        assert_eq!(
            parse("a && (b || c)").unwrap(),
            Requirement::and(vec![c("a"), Requirement::or(vec![c("b"), c("c")])])
        );
    }

    #[test]
    fn test_group_is_extended_by_matching_operator() {
        assert_eq!(
            parse("(a && b) && c").unwrap(),
            Requirement::and(vec![c("a"), c("b"), c("c")])
        );
        assert_eq!(
            parse("a && (b && c)").unwrap(),
            Requirement::and(vec![c("a"), Requirement::and(vec![c("b"), c("c")])])
        );
    }

    #[test]
    fn test_parenthesized_single_condition() {
        assert_eq!(parse("(visible)").unwrap(), Requirement::and(vec![c("visible")]));
    }

    #[test]
    fn test_arguments_survive_parsing() {
        let ast = parse("(event(a) || event(b)) && visible(-50px 0px)").unwrap();
        assert_eq!(
            ast,
            Requirement::and(vec![
                Requirement::or(vec![
                    Requirement::Condition(Condition::with_argument("event", "a")),
                    Requirement::Condition(Condition::with_argument("event", "b")),
                ]),
                Requirement::Condition(Condition::with_argument("visible", "-50px 0px")),
            ])
        );
    }

    #[test]
    fn test_legacy_pipe() {
        assert_eq!(
            parse("visible | idle").unwrap(),
            Requirement::and(vec![c("visible"), c("idle")])
        );
    }

    #[test]
    fn test_missing_close_paren_is_tolerated() {
        assert_eq!(
            parse("(a || b").unwrap(),
            Requirement::or(vec![c("a"), c("b")])
        );
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        assert_eq!(parse("a) && b").unwrap(), Requirement::and(vec![c("a")]));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(ParseError::Empty));
    }

    #[test]
    fn test_whitespace_only_input() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("\t\n"), Err(ParseError::Empty));
    }

    #[test]
    fn test_trailing_operator() {
        assert_eq!(
            parse("visible &&"),
            Err(ParseError::UnexpectedEnd { position: 2 })
        );
    }

    #[test]
    fn test_leading_operator() {
        assert_eq!(
            parse("|| visible"),
            Err(ParseError::UnexpectedToken {
                token: "||".to_string(),
                position: 0
            })
        );
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(
            parse("()"),
            Err(ParseError::UnexpectedToken {
                token: ")".to_string(),
                position: 1
            })
        );
    }
}
