// SPDX-License-Identifier: MIT

use crate::kit::error::StrategyError;
use crate::kit::platform::Platform;
use crate::kit::strategy::{Strategy, StrategyContext};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Used when the platform has no idle callback
pub const IDLE_FALLBACK: Duration = Duration::from_millis(200);

/// Wait for the page to go idle
pub struct IdleStrategy {
    platform: Arc<dyn Platform>,
}

impl IdleStrategy {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Strategy for IdleStrategy {
    fn name(&self) -> &str {
        "idle"
    }

    async fn wait(&self, _ctx: &StrategyContext<'_>) -> Result<(), StrategyError> {
        if self.platform.supports_idle_callback() {
            self.platform.idle().await;
        } else {
            tokio::time::sleep(IDLE_FALLBACK).await;
        }
        Ok(())
    }
}
