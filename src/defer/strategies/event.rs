// SPDX-License-Identifier: MIT

//! Wait for a page event
//!
//! - `event(name)` waits for the next event called `name`
//! - `event` waits for the load event carrying the component's id

use crate::defer::events::EventBus;
use crate::kit::error::StrategyError;
use crate::kit::strategy::{Strategy, StrategyContext};
use async_trait::async_trait;

pub struct EventStrategy {
    bus: EventBus,
}

impl EventStrategy {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Strategy for EventStrategy {
    fn name(&self) -> &str {
        "event"
    }

    async fn wait(&self, ctx: &StrategyContext<'_>) -> Result<(), StrategyError> {
        match ctx.argument.filter(|name| !name.is_empty()) {
            Some(name) => {
                self.bus.wait_for(name, |e| e.name == name).await?;
            }
            None => {
                let id = ctx.component.id.as_str();
                self.bus
                    .wait_for(&format!("load of {}", id), |e| e.is_load_for(id))
                    .await?;
            }
        }
        Ok(())
    }
}
