// SPDX-License-Identifier: MIT

//! Tokens and syntax tree for requirement expressions

use serde::Serialize;
use std::fmt;

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// && (and the legacy single |)
    And,
    /// ||
    Or,
}

/// Grouping parentheses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Paren {
    Open,
    Close,
}

/// A reference to a named strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub name: String,
    pub argument: Option<String>,
}

impl Condition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: None,
        }
    }

    pub fn with_argument(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: Some(argument.into()),
        }
    }
}

/// A lexical token of a requirement string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Token {
    Paren(Paren),
    Operator(Operator),
    Condition(Condition),
}

/// A parsed requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    /// Leaf: wait for one strategy
    Condition(Condition),
    /// Combine operands with AND (all) or OR (first)
    Expression {
        operator: Operator,
        operands: Vec<Requirement>,
    },
}

impl Requirement {
    pub fn condition(name: impl Into<String>) -> Self {
        Requirement::Condition(Condition::new(name))
    }

    pub fn and(operands: Vec<Requirement>) -> Self {
        Requirement::Expression {
            operator: Operator::And,
            operands,
        }
    }

    pub fn or(operands: Vec<Requirement>) -> Self {
        Requirement::Expression {
            operator: Operator::Or,
            operands,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Condition(_) => write!(f, "{}", self),
            Requirement::Expression { .. } => write!(f, "({})", self),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "&&"),
            Operator::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{}({})", self.name, argument),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Paren(Paren::Open) => write!(f, "("),
            Token::Paren(Paren::Close) => write!(f, ")"),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Condition(condition) => write!(f, "{}", condition),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Condition(condition) => write!(f, "{}", condition),
            Requirement::Expression { operator, operands } => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", operator)?;
                    }
                    operand.fmt_nested(f)?;
                }
                Ok(())
            }
        }
    }
}
