// SPDX-License-Identifier: MIT

//! Typed error handling for defer-rs
//!
//! One top-level error for the crate plus focused error types for the
//! requirement parser, the evaluator, strategies and module loading.

use thiserror::Error;

/// Top-level error type for defer-rs
#[derive(Debug, Error)]
pub enum DeferError {
    /// Requirement string could not be parsed
    #[error("Invalid requirement: {0}")]
    Parse(#[from] ParseError),

    /// Requirement evaluation failed
    #[error("Requirement error: {0}")]
    Requirement(#[from] RequirementError),

    /// Module registration or download errors
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    /// Configuration errors (invalid options, bad scenario files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while parsing a requirement string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The requirement string produced no tokens
    #[error("requirement is empty")]
    Empty,

    /// A condition or group was expected but the input ended
    #[error("expected a condition at token {position}, found end of input")]
    UnexpectedEnd { position: usize },

    /// A condition or group was expected but another token was found
    #[error("expected a condition at token {position}, found '{token}'")]
    UnexpectedToken { token: String, position: usize },
}

/// Errors raised while awaiting a requirement tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    /// A strategy rejected
    #[error("strategy '{strategy}' failed: {message}")]
    Rejected { strategy: String, message: String },

    /// Every operand of an OR group failed
    #[error("none of {count} alternatives was satisfied")]
    NoneSatisfied { count: usize },
}

/// Errors a strategy may report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// The event channel was closed before the awaited event arrived
    #[error("event channel closed while waiting for '{0}'")]
    ChannelClosed(String),

    /// The platform could not serve the request
    #[error("platform error: {0}")]
    Platform(String),
}

/// Module registry errors
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Fetching a module failed
    #[error("failed to fetch module '{name}' from {url}: {message}")]
    Fetch {
        name: String,
        url: String,
        message: String,
    },

    /// The module has nothing that can be bound to a component
    #[error("module '{0}' has no usable export")]
    NoExport(String),

    /// A URL could not be resolved against the page base
    #[error("invalid module url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl DeferError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl ModuleError {
    /// Create a fetch error
    pub fn fetch(name: impl Into<String>, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            name: name.into(),
            url: url.into(),
            message: message.into(),
        }
    }
}
