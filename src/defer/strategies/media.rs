// SPDX-License-Identifier: MIT

use crate::kit::error::StrategyError;
use crate::kit::platform::Platform;
use crate::kit::strategy::{Strategy, StrategyContext};
use async_trait::async_trait;
use std::sync::Arc;

/// Wait for a media query to match.
///
/// Resolves immediately when the query already matches, otherwise on the
/// next change notification. It never "undoes" itself.
pub struct MediaStrategy {
    platform: Arc<dyn Platform>,
}

impl MediaStrategy {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Strategy for MediaStrategy {
    fn name(&self) -> &str {
        "media"
    }

    async fn wait(&self, ctx: &StrategyContext<'_>) -> Result<(), StrategyError> {
        let Some(argument) = ctx.argument.filter(|a| !a.is_empty()) else {
            log::warn!(
                "media strategy requires a media query (component {}); treating as 'eager'",
                ctx.component.id
            );
            return Ok(());
        };

        let query = format!("({})", argument);
        if !self.platform.media_matches(&query) {
            self.platform.media_change(&query).await;
        }
        Ok(())
    }
}
