// SPDX-License-Identifier: MIT

use crate::kit::error::StrategyError;
use crate::kit::host::ElementRef;
use async_trait::async_trait;

/// The component a strategy is waiting on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHandle {
    pub element: ElementRef,
    /// Stable identifier, unique for the page lifetime
    pub id: String,
}

impl ComponentHandle {
    pub fn new(element: ElementRef, id: impl Into<String>) -> Self {
        Self {
            element,
            id: id.into(),
        }
    }
}

/// Everything a strategy invocation gets to see
#[derive(Debug, Clone)]
pub struct StrategyContext<'a> {
    pub component: &'a ComponentHandle,
    /// Free-text argument from `name(argument)`, verbatim
    pub argument: Option<&'a str>,
}

/// Trait for named asynchronous conditions gating activation.
///
/// `wait` resolves once the condition holds. Built-in strategies never
/// fail; a strategy that never resolves stalls the requirement forever.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Returns the name used in requirement strings
    fn name(&self) -> &str;

    /// Wait until the condition is satisfied for the given component
    async fn wait(&self, ctx: &StrategyContext<'_>) -> Result<(), StrategyError>;
}
