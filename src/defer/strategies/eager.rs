// SPDX-License-Identifier: MIT

use crate::kit::error::StrategyError;
use crate::kit::strategy::{Strategy, StrategyContext};
use async_trait::async_trait;

/// Satisfied as soon as it is asked
pub struct EagerStrategy;

#[async_trait]
impl Strategy for EagerStrategy {
    fn name(&self) -> &str {
        "eager"
    }

    async fn wait(&self, _ctx: &StrategyContext<'_>) -> Result<(), StrategyError> {
        Ok(())
    }
}
