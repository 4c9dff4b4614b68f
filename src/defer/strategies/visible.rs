// SPDX-License-Identifier: MIT

use crate::kit::error::StrategyError;
use crate::kit::platform::Platform;
use crate::kit::strategy::{Strategy, StrategyContext};
use async_trait::async_trait;
use std::sync::Arc;

const DEFAULT_ROOT_MARGIN: &str = "0px 0px 0px 0px";

/// Wait until the component scrolls into view (one-shot).
/// The argument, if any, is the root margin.
pub struct VisibleStrategy {
    platform: Arc<dyn Platform>,
}

impl VisibleStrategy {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Strategy for VisibleStrategy {
    fn name(&self) -> &str {
        "visible"
    }

    async fn wait(&self, ctx: &StrategyContext<'_>) -> Result<(), StrategyError> {
        let root_margin = ctx
            .argument
            .filter(|margin| !margin.is_empty())
            .unwrap_or(DEFAULT_ROOT_MARGIN);
        self.platform
            .intersection(ctx.component.element, root_margin)
            .await;
        Ok(())
    }
}
