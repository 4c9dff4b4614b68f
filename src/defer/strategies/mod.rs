// SPDX-License-Identifier: MIT

//! Built-in strategies
//!
//! - `eager` - satisfied immediately (`immediate` is an alias)
//! - `event` - a named page event, or the component's load event
//! - `idle` - the next idle period, or a 200ms timer
//! - `media` - a media query match
//! - `visible` - the component intersecting the viewport

pub mod eager;
pub mod event;
pub mod idle;
pub mod media;
pub mod visible;

pub use eager::EagerStrategy;
pub use event::EventStrategy;
pub use idle::{IdleStrategy, IDLE_FALLBACK};
pub use media::MediaStrategy;
pub use visible::VisibleStrategy;

use crate::defer::events::EventBus;
use crate::kit::platform::Platform;
use crate::kit::strategy::Strategy;
use std::sync::Arc;

/// Create the five built-in strategies
pub fn create_strategies(bus: &EventBus, platform: Arc<dyn Platform>) -> Vec<Arc<dyn Strategy>> {
    vec![
        Arc::new(EagerStrategy),
        Arc::new(EventStrategy::new(bus.clone())),
        Arc::new(IdleStrategy::new(platform.clone())),
        Arc::new(MediaStrategy::new(platform.clone())),
        Arc::new(VisibleStrategy::new(platform)),
    ]
}
